//! Incremental decoding of data in Basic Encoding Rules.
//!
//! This crate reads BER or DER encoded data – the wire format underneath
//! X.509 certificates and many other cryptographic structures – from a
//! stream of chunks of arbitrary size and arbitrary alignment, and
//! reassembles complete top level elements without ever requiring the
//! whole input in memory at once.
//!
//! The centre piece is [`StreamReader`], a state machine that keeps all
//! nesting state in an explicit context stack so parsing can suspend and
//! resume at any byte boundary. It understands definite lengths of up to
//! six length octets, indefinite lengths closed by end-of-contents
//! markers, high tag numbers of any width, and primitive string values
//! fragmented via constructed encoding.
//!
//! The reader stops short of interpreting content: a reassembled
//! [`Element`] hands you the complete raw encoding to feed to whatever
//! BER or DER value decoder your application uses.
//!
//! ```
//! use berstream::{Event, StreamReader};
//!
//! let mut reader = StreamReader::new();
//!
//! // A SEQUENCE of two INTEGERs, submitted in two badly aligned chunks.
//! reader.write(&b"\x30\x06\x02\x01"[..]).unwrap();
//! reader.write(&b"\x2a\x02\x01\x07"[..]).unwrap();
//!
//! match reader.next_event() {
//!     Some(Event::Element(element)) => {
//!         assert_eq!(
//!             element.as_slice(),
//!             b"\x30\x06\x02\x01\x2a\x02\x01\x07"
//!         );
//!     }
//!     _ => panic!("expected an element")
//! }
//! assert!(reader.next_event().is_none());
//! ```

pub use self::error::FormatError;
pub use self::event::{ContainerInfo, Element, Event};
pub use self::int::{Accumulator, Unsigned};
pub use self::reader::{Events, StreamReader};
pub use self::tag::{Class, Tag};

pub mod error;
pub mod event;
pub mod int;
pub mod reader;
pub mod tag;

mod context;
mod cursor;
