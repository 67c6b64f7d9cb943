//! The streaming reader.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::collections::VecDeque;
use bytes::Bytes;
use crate::context::{Context, ContextStack, Step};
use crate::cursor::Cursor;
use crate::error::FormatError;
use crate::event::{ContainerInfo, Element, Event};
use crate::int::Unsigned;
use crate::tag::{Class, Tag};


//------------ StreamReader --------------------------------------------------

/// An incremental reader for BER encoded data.
///
/// The reader accepts the encoded stream as a sequence of chunks handed
/// to [`write`][Self::write]. Chunk boundaries are arbitrary: they carry
/// no relationship to the boundaries of the encoded values, and the
/// reader will happily resume anywhere, even in the middle of an
/// identifier octet sequence or a length field. All state lives in the
/// reader itself rather than on the call stack, so a value of any size
/// can be assembled across any number of chunks.
///
/// Each call to `write` processes the complete chunk synchronously.
/// Whatever output it produced – reassembled elements and, depending on
/// configuration, container boundary notifications – is queued and can
/// be collected afterwards through [`next_event`][Self::next_event] or
/// the draining iterator returned by [`events`][Self::events]. Events
/// appear strictly in the order their underlying bytes completed and
/// are delivered exactly once. The queue only ever holds what the
/// chunks written so far have produced; collecting it between writes
/// keeps memory bounded.
///
/// By default the reader emits one event per top level element. A reader
/// created with [`strip_outer`][Self::strip_outer] instead treats each
/// top level element as a container and emits its immediate children one
/// by one as they complete, bracketed by container begin and end
/// notifications. This allows processing the members of a large outer
/// sequence without waiting for – or buffering – the whole thing.
///
/// The reader does not interpret content. An emitted [`Element`] carries
/// the complete raw encoding to be handed to a BER or DER value decoder
/// of the host's choosing.
pub struct StreamReader {
    /// The stack of parse contexts along the current nesting path.
    stack: ContextStack,

    /// Output produced but not yet collected by the caller.
    events: VecDeque<Event>,

    /// The stream offset of the next input octet.
    pos: u64,

    /// Emit the children of each top level element individually.
    strip_outer: bool,

    /// Interpretation has stopped; input is forwarded verbatim.
    passthrough: bool,

    /// The error that permanently stopped the reader, if any.
    poisoned: Option<FormatError>,
}

impl StreamReader {
    /// Creates a new reader emitting top level elements.
    pub fn new() -> Self {
        StreamReader {
            stack: ContextStack::new(),
            events: VecDeque::new(),
            pos: 0,
            strip_outer: false,
            passthrough: false,
            poisoned: None,
        }
    }

    /// Creates a new reader that strips the outermost container.
    ///
    /// The reader will treat each top level element as a container,
    /// emitting [`Event::ContainerBegin`] once the container's header has
    /// been parsed, each immediate child as its own element when it
    /// completes, and [`Event::ContainerEnd`] once the container is done.
    pub fn strip_outer() -> Self {
        StreamReader {
            strip_outer: true,
            .. Self::new()
        }
    }

    /// Returns the stream offset of the next input octet.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Returns whether passthrough mode has been engaged.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// Stops all interpretation for the rest of the reader's life.
    ///
    /// Every chunk written after this call is forwarded verbatim as
    /// [`Event::Passthrough`]. The switch is idempotent and cannot be
    /// reverted. If an element is only partially parsed when the switch
    /// is thrown, its state is discarded: nothing is emitted for it and
    /// its already-consumed bytes are not replayed.
    pub fn enable_passthrough(&mut self) {
        if !self.passthrough {
            self.passthrough = true;
            self.stack.clear();
        }
    }

    /// Submits the next chunk of the encoded stream.
    ///
    /// Parses as far as the combined input allows and queues all output
    /// produced along the way. Returns an error if the chunk contains a
    /// length field announcing more than six length octets. Such an
    /// error is fatal: the reader refuses all further input, returning
    /// the same error again.
    pub fn write(
        &mut self, chunk: impl Into<Bytes>
    ) -> Result<(), FormatError> {
        let chunk = chunk.into();
        if let Some(err) = self.poisoned {
            return Err(err)
        }
        let mut cursor = Cursor::new(chunk);
        if self.passthrough {
            let rest = cursor.drain_remaining();
            self.pos += rest.len() as u64;
            if !rest.is_empty() {
                self.events.push_back(Event::Passthrough(rest));
            }
            return Ok(())
        }
        self.parse(&mut cursor).map_err(|err| {
            self.poisoned = Some(err);
            err
        })
    }

    /// Returns the next queued event, if any.
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Returns a draining iterator over the queued events.
    pub fn events(&mut self) -> Events {
        Events { queue: &mut self.events }
    }
}

/// # The State Machine
///
impl StreamReader {
    /// Drives the state machine over one chunk.
    ///
    /// Transitions fall through within this one pass whenever the bytes
    /// they need are already available; the method only returns once the
    /// cursor is exhausted or the active context has to wait for input.
    fn parse(&mut self, cursor: &mut Cursor) -> Result<(), FormatError> {
        loop {
            let step = match self.stack.top() {
                Some(context) => context.step,
                None => {
                    // Between top level elements. Seed a fresh depth 0
                    // context once the next element's bytes arrive.
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    self.stack.push(Context::new(self.pos));
                    Step::Begin
                }
            };
            match step {
                Step::Begin => {
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    let byte = self.take_byte(cursor);
                    let context = self.top_mut();
                    context.class = Class::from_identifier(byte);
                    context.constructed = byte & 0x20 != 0;
                    if byte & 0x1f == 0x1f {
                        context.step = Step::LongTag;
                    }
                    else {
                        context.number = Unsigned::from_u64(
                            u64::from(byte & 0x1f)
                        );
                        context.step = Step::Length;
                    }
                }
                Step::LongTag => {
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    let byte = self.take_byte(cursor);
                    let context = self.top_mut();
                    context.accum.mul_add(128, byte & 0x7f);
                    if byte & 0x80 == 0 {
                        context.number = context.accum.resolve();
                        context.step = Step::Length;
                    }
                }
                Step::Length => {
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    let byte = self.take_byte(cursor);
                    if byte & 0x80 == 0 {
                        let context = self.top_mut();
                        context.length = Some(byte.into());
                        if context.is_end_of_contents() {
                            context.eoc = true;
                            self.finalize_top();
                        }
                        else {
                            self.enter_content();
                        }
                    }
                    else if byte == 0x80 {
                        let context = self.top_mut();
                        context.length = None;
                        context.step = Step::Content;
                    }
                    else {
                        let count = byte & 0x7f;
                        if count > 6 {
                            return Err(
                                FormatError::excessive_length(self.pos)
                            )
                        }
                        let context = self.top_mut();
                        context.pending_length_octets = count;
                        context.accum.clear();
                        context.step = Step::LongLength;
                    }
                }
                Step::LongLength => {
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    let byte = self.take_byte(cursor);
                    let context = self.top_mut();
                    context.accum.mul_add(256, byte);
                    context.pending_length_octets -= 1;
                    if context.pending_length_octets == 0 {
                        // Six length octets at most, so the value fits.
                        context.length = match
                            context.accum.resolve().to_u64()
                        {
                            Some(length) => Some(length),
                            None => unreachable!(),
                        };
                        self.enter_content();
                    }
                }
                Step::Content => self.decide_content(),
                Step::FixedContent => {
                    let context = self.top_mut();
                    let need = match context.length {
                        Some(length) => length - context.written,
                        // An indefinite length value with opaque content
                        // has no end; it consumes the rest of the stream.
                        None => u64::MAX,
                    };
                    if need == 0 {
                        self.finalize_top();
                        continue
                    }
                    if cursor.is_empty() {
                        return Ok(())
                    }
                    let take = need.min(cursor.remaining() as u64) as usize;
                    self.take_content(cursor, take);
                }
                Step::Nested => {
                    let complete = self.stack.top().map_or(
                        false, |context| context.remaining == Some(0)
                    );
                    if complete {
                        self.finalize_top();
                    }
                    else {
                        // Begin the next child element.
                        self.stack.push(Context::new(self.pos));
                    }
                }
            }
        }
    }

    /// Routes a context with a definite length into its content.
    fn enter_content(&mut self) {
        let strip_root = self.strip_outer && self.stack.len() == 1;
        let context = self.top_mut();
        if strip_root {
            // The content decision has to run so that the container's
            // children materialize as contexts of their own.
            context.step = Step::Content;
        }
        else {
            context.remaining = context.length;
            context.step = Step::FixedContent;
        }
    }

    /// Decides how the content of the active context is to be read.
    ///
    /// Reached for indefinite length values at any depth and for all
    /// depth 0 values when outer container stripping is active.
    fn decide_content(&mut self) {
        let strip_root = self.strip_outer && self.stack.len() == 1;
        let context = self.top_mut();
        context.remaining = context.length;
        // Primitive universal OCTET STRING and BIT STRING values with
        // indefinite length are fragmented into nested string values.
        let nested = context.constructed || (
            context.length.is_none()
            && context.class == Class::Universal
            && (context.number == 3 || context.number == 4)
        );
        let announce = strip_root && !context.announced;
        if announce {
            context.announced = true;
        }
        let info = ContainerInfo {
            indefinite: context.length.is_none(),
            size: context.length.unwrap_or(0),
        };
        context.step = if nested {
            Step::Nested
        }
        else {
            Step::FixedContent
        };
        if announce {
            self.events.push_back(Event::ContainerBegin(info));
        }
    }

    /// Finalizes the active context.
    ///
    /// Pops the context, emits whatever its completion warrants, hands
    /// its raw encoding up to its parent, and lets an end-of-contents
    /// marker close the enclosing indefinite length value.
    fn finalize_top(&mut self) {
        let context = match self.stack.pop() {
            Some(context) => context,
            None => return,
        };
        let depth = self.stack.len();
        let emit_depth = if self.strip_outer { 1 } else { 0 };

        if !context.eoc && depth == emit_depth {
            let offset = match self.stack.top() {
                Some(container) => {
                    // The stripped container's raw buffer holds exactly
                    // its header octets; children are not appended to it.
                    context.start - container.start
                        - container.raw.len() as u64
                }
                None => context.start,
            };
            let element = Element::new(
                Tag::new(context.class, context.number),
                context.constructed, offset, context.raw.freeze(),
            );
            self.events.push_back(Event::Element(element));
            return
        }

        if self.strip_outer && depth == 0 && context.announced {
            self.events.push_back(Event::ContainerEnd(ContainerInfo {
                indefinite: context.length.is_none(),
                size: context.consumed,
            }));
        }

        // A stripped container never sees its children's raw encoding;
        // everyone else assembles their parent's.
        let parent_is_stripped = self.strip_outer && self.stack.len() == 1;
        if !parent_is_stripped {
            if let Some(parent) = self.stack.top_mut() {
                parent.raw.extend_from_slice(&context.raw);
            }
        }

        if context.eoc {
            // An end-of-contents marker closes its nearest enclosing
            // indefinite length value and never a definite length one.
            // Inside a definite length value it is ordinary content.
            let close_parent = self.stack.top().map_or(
                false,
                |parent| {
                    parent.step == Step::Nested && parent.length.is_none()
                }
            );
            if close_parent {
                self.finalize_top();
            }
        }
    }

    /// Reads one header octet, charging it to the stack and raw buffer.
    fn take_byte(&mut self, cursor: &mut Cursor) -> u8 {
        let byte = cursor.read_u8();
        self.pos += 1;
        self.stack.consume(1);
        self.top_mut().raw.extend_from_slice(&[byte]);
        byte
    }

    /// Copies `len` content octets into the active context.
    fn take_content(&mut self, cursor: &mut Cursor, len: usize) {
        let slice = cursor.read_slice(len);
        self.pos += len as u64;
        self.stack.consume(len as u64);
        let context = match self.stack.top_mut() {
            Some(context) => context,
            None => unreachable!(),
        };
        context.raw.extend_from_slice(slice);
        context.written += len as u64;
    }

    /// Returns the active context.
    ///
    /// May only be called while the stack is non-empty.
    fn top_mut(&mut self) -> &mut Context {
        match self.stack.top_mut() {
            Some(context) => context,
            None => unreachable!(),
        }
    }
}


//--- Default

impl Default for StreamReader {
    fn default() -> Self {
        Self::new()
    }
}


//------------ Events --------------------------------------------------------

/// A draining iterator over a reader's queued events.
///
/// Returned by [`StreamReader::events`]. Every event yielded is removed
/// from the queue; dropping the iterator leaves the rest in place.
pub struct Events<'a> {
    queue: &'a mut VecDeque<Event>,
}

impl<'a> Iterator for Events<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn elements(reader: &mut StreamReader) -> Vec<Element> {
        reader.events().filter_map(|event| {
            match event {
                Event::Element(element) => Some(element),
                _ => None
            }
        }).collect()
    }

    #[test]
    fn resumes_in_the_middle_of_a_header() {
        let mut reader = StreamReader::new();
        reader.write(&b"\x30"[..]).unwrap();
        assert!(reader.next_event().is_none());
        reader.write(&b"\x06\x02\x01\x2a\x02\x01\x07"[..]).unwrap();
        let elements = elements(&mut reader);
        assert_eq!(elements.len(), 1);
        assert_eq!(
            elements[0].as_slice(),
            b"\x30\x06\x02\x01\x2a\x02\x01\x07"
        );
        assert_eq!(*elements[0].tag(), Tag::SEQUENCE);
        assert!(elements[0].is_constructed());
    }

    #[test]
    fn zero_length_element_completes_without_more_input() {
        let mut reader = StreamReader::new();
        reader.write(&b"\x05\x00"[..]).unwrap();
        let elements = elements(&mut reader);
        assert_eq!(elements.len(), 1);
        assert_eq!(*elements[0].tag(), Tag::NULL);
        assert_eq!(elements[0].as_slice(), b"\x05\x00");
    }

    #[test]
    fn indefinite_value_includes_its_end_marker() {
        let mut reader = StreamReader::new();
        reader.write(&b"\x24\x80\x04\x01\xaa\x00\x00"[..]).unwrap();
        let elements = elements(&mut reader);
        assert_eq!(elements.len(), 1);
        assert_eq!(*elements[0].tag(), Tag::OCTET_STRING);
        assert!(elements[0].is_constructed());
        assert_eq!(elements[0].as_slice(), b"\x24\x80\x04\x01\xaa\x00\x00");
    }

    #[test]
    fn stray_end_of_contents_is_swallowed() {
        let mut reader = StreamReader::new();
        reader.write(&b"\x00\x00\x02\x01\x05"[..]).unwrap();
        let elements = elements(&mut reader);
        assert_eq!(elements.len(), 1);
        assert_eq!(*elements[0].tag(), Tag::INTEGER);
        assert_eq!(elements[0].offset(), 2);
    }

    #[test]
    fn excessive_length_poisons_the_reader() {
        let mut reader = StreamReader::new();
        let err = reader.write(&b"\x02\x87"[..]).unwrap_err();
        assert_eq!(err.pos(), 2);
        assert!(reader.next_event().is_none());
        assert_eq!(reader.write(&b"\x02\x01\x05"[..]).unwrap_err(), err);
        assert!(reader.next_event().is_none());
    }

    #[test]
    fn passthrough_discards_partial_state() {
        let mut reader = StreamReader::new();
        reader.write(&b"\x30\x06\x02"[..]).unwrap();
        reader.enable_passthrough();
        reader.enable_passthrough();
        assert!(reader.is_passthrough());
        reader.write(&b"\x01\x2a"[..]).unwrap();
        reader.write(&b"\x02\x01\x07"[..]).unwrap();
        let events: Vec<_> = reader.events().collect();
        assert_eq!(
            events,
            vec![
                Event::Passthrough(Bytes::from_static(b"\x01\x2a")),
                Event::Passthrough(Bytes::from_static(b"\x02\x01\x07")),
            ]
        );
    }

    #[test]
    fn stripping_a_primitive_element_emits_only_boundaries() {
        let mut reader = StreamReader::strip_outer();
        reader.write(&b"\x02\x01\x2a"[..]).unwrap();
        let events: Vec<_> = reader.events().collect();
        assert_eq!(
            events,
            vec![
                Event::ContainerBegin(ContainerInfo {
                    indefinite: false, size: 1
                }),
                Event::ContainerEnd(ContainerInfo {
                    indefinite: false, size: 3
                }),
            ]
        );
    }
}
