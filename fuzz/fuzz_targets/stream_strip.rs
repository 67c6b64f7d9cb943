#![no_main]

use libfuzzer_sys::fuzz_target;
use berstream::StreamReader;

// The same chunking equivalence with outer container stripping active.
fuzz_target!(|data: &[u8]| {
    let mut reader = StreamReader::strip_outer();
    let reference = match reader.write(data.to_vec()) {
        Ok(()) => reader.events().collect::<Vec<_>>(),
        Err(_) => return,
    };

    let step = data.last().map_or(1, |&last| usize::from(last).max(1));
    let mut reader = StreamReader::strip_outer();
    let mut events = Vec::new();
    for chunk in data.chunks(step) {
        reader.write(chunk.to_vec()).expect(
            "chunked write failed where whole write succeeded"
        );
        events.extend(reader.events());
    }
    assert_eq!(events, reference);
});
