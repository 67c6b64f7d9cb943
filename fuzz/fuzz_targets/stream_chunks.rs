#![no_main]

use libfuzzer_sys::fuzz_target;
use berstream::StreamReader;

// Feeding a stream in chunks must produce exactly the output of feeding
// it in one piece, for any input and any chunking.
fuzz_target!(|data: &[u8]| {
    let mut reader = StreamReader::new();
    let reference = match reader.write(data.to_vec()) {
        Ok(()) => reader.events().collect::<Vec<_>>(),
        Err(_) => return,
    };

    let step = data.first().map_or(1, |&first| usize::from(first).max(1));
    let mut reader = StreamReader::new();
    let mut events = Vec::new();
    for chunk in data.chunks(step) {
        reader.write(chunk.to_vec()).expect(
            "chunked write failed where whole write succeeded"
        );
        events.extend(reader.events());
    }
    assert_eq!(events, reference);
});
