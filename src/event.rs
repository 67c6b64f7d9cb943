//! The output of the stream reader.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use bytes::Bytes;
use crate::int::Unsigned;
use crate::tag::{Class, Tag};


//------------ Event ---------------------------------------------------------

/// A single unit of reader output.
///
/// Events are produced strictly in the order in which their underlying
/// bytes complete in the input stream and each event is delivered
/// exactly once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A fully reassembled element.
    ///
    /// By default this is a top level element. With outer container
    /// stripping active, it is an immediate child of the outermost
    /// container instead.
    Element(Element),

    /// The header of the stripped outer container has been parsed.
    ///
    /// Only produced with outer container stripping active.
    ContainerBegin(ContainerInfo),

    /// The stripped outer container is complete.
    ///
    /// Only produced with outer container stripping active.
    ContainerEnd(ContainerInfo),

    /// Raw input forwarded verbatim in passthrough mode.
    Passthrough(Bytes),
}


//------------ Element -------------------------------------------------------

/// A fully reassembled BER encoded element.
///
/// The element carries its complete raw encoding – identifier, length
/// and content octets, including the end-of-contents marker of an
/// indefinite length value. The content is deliberately left
/// uninterpreted: the raw octets can be handed to any BER or DER value
/// decoder to be turned into a typed value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    /// The tag of the element.
    tag: Tag,

    /// Whether the element uses constructed encoding.
    constructed: bool,

    /// The byte offset of the first identifier octet.
    offset: u64,

    /// The complete raw encoding.
    raw: Bytes,
}

impl Element {
    /// Creates a new element from its parts.
    pub(crate) fn new(
        tag: Tag, constructed: bool, offset: u64, raw: Bytes
    ) -> Self {
        Element { tag, constructed, offset, raw }
    }

    /// Returns the tag of the element.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns the class of the element's tag.
    pub fn class(&self) -> Class {
        self.tag.class()
    }

    /// Returns the number of the element's tag.
    pub fn number(&self) -> &Unsigned {
        self.tag.number()
    }

    /// Returns whether the element uses constructed encoding.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns the byte offset of the element's first identifier octet.
    ///
    /// With outer container stripping active, the offset is relative to
    /// the start of the enclosing container's content. Otherwise it is
    /// relative to the start of the whole stream.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns a reference to the complete raw encoding.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Returns the raw encoding as a bytes slice.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Converts the element into its raw encoding.
    pub fn into_raw(self) -> Bytes {
        self.raw
    }

    /// Returns the length of the raw encoding in octets.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns whether the raw encoding is empty.
    ///
    /// It never is for an element produced by the reader.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}


//------------ ContainerInfo -------------------------------------------------

/// Framing and size information about a stripped outer container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContainerInfo {
    /// Whether the container uses indefinite length framing.
    pub indefinite: bool,

    /// The size of the container in octets.
    ///
    /// At begin time this is the declared content length, or 0 if the
    /// length is indefinite and thus not yet known. At end time it is
    /// the total number of octets the container consumed, header and any
    /// end-of-contents marker included.
    pub size: u64,
}


//============ Tests =========================================================
