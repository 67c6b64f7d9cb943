//! The per-nesting-level parse state.
//!
//! This is a private module used by the reader only.
//!
//! A recursive decoder would keep the state of every enclosing value on
//! the call stack. Since this reader must be able to suspend at any byte
//! boundary, that state lives in an explicit [`ContextStack`] of
//! [`Context`] values instead: one per nesting level, the top being the
//! element currently being parsed and the entry below a context's parent.

use bytes::BytesMut;
use smallvec::SmallVec;
use crate::int::{Accumulator, Unsigned};
use crate::tag::Class;


//------------ Step ----------------------------------------------------------

/// Where within a single element the parse currently stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Waiting for the first identifier octet.
    Begin,

    /// Collecting the base 128 digits of a high tag number.
    LongTag,

    /// Waiting for the first length octet.
    Length,

    /// Collecting long form length octets.
    LongLength,

    /// The header is complete; decide how the content is to be read.
    Content,

    /// Copying a known number of opaque content octets.
    FixedContent,

    /// A child context is parsing this element's content.
    Nested,
}


//------------ Context -------------------------------------------------------

/// The parse state of one nesting level.
pub struct Context {
    /// The current step.
    pub step: Step,

    /// The stream offset of the element's first identifier octet.
    pub start: u64,

    /// The class of the element's tag.
    pub class: Class,

    /// Whether the element uses constructed encoding.
    pub constructed: bool,

    /// The number of the element's tag.
    pub number: Unsigned,

    /// The declared content length.
    ///
    /// This is `None` both before the length octets are complete and for
    /// indefinite length values; the step disambiguates.
    pub length: Option<u64>,

    /// The number of long form length octets still to be read.
    pub pending_length_octets: u8,

    /// The digit accumulator for high tag numbers and long form lengths.
    pub accum: Accumulator,

    /// The raw encoding collected so far, header octets included.
    ///
    /// When a child context is popped, its raw encoding is appended
    /// here, so that a finished context holds the element's complete
    /// encoding.
    pub raw: BytesMut,

    /// The number of content octets copied so far.
    pub written: u64,

    /// The remaining content budget.
    ///
    /// Armed with the declared length when the content begins and counted
    /// down for every consumed octet. `None` for indefinite length values,
    /// which have no fixed budget.
    pub remaining: Option<u64>,

    /// Octets consumed at or below this level since `start`.
    pub consumed: u64,

    /// The element turned out to be an end-of-contents marker.
    pub eoc: bool,

    /// A container begin notification has been issued for this context.
    pub announced: bool,
}

impl Context {
    /// Creates a fresh context for an element starting at `start`.
    pub fn new(start: u64) -> Self {
        Context {
            step: Step::Begin,
            start,
            class: Class::Universal,
            constructed: false,
            number: Unsigned::default(),
            length: None,
            pending_length_octets: 0,
            accum: Accumulator::new(),
            raw: BytesMut::new(),
            written: 0,
            remaining: None,
            consumed: 0,
            eoc: false,
            announced: false,
        }
    }

    /// Returns whether the header read so far is an end-of-contents marker.
    ///
    /// Valid once the first length octet has been seen: the marker is
    /// universal tag number 0 with length 0.
    pub fn is_end_of_contents(&self) -> bool {
        self.class == Class::Universal
            && self.number == 0
            && self.length == Some(0)
    }
}


//------------ ContextStack --------------------------------------------------

/// The stack of parse contexts along the current nesting path.
///
/// The bottom entry is the depth 0 context of the top level element
/// currently being assembled, the top entry the active context. Depths
/// increase monotonically from bottom to top. The stack is empty between
/// top level elements; the reader re-seeds it when the next element's
/// first byte arrives.
#[derive(Default)]
pub struct ContextStack {
    contexts: SmallVec<[Context; 4]>,
}

impl ContextStack {
    /// Creates a new, empty stack.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of contexts on the stack.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Pushes a context on top of the stack.
    pub fn push(&mut self, context: Context) {
        self.contexts.push(context)
    }

    /// Removes and returns the top context.
    pub fn pop(&mut self) -> Option<Context> {
        self.contexts.pop()
    }

    /// Returns a reference to the active context.
    pub fn top(&self) -> Option<&Context> {
        self.contexts.last()
    }

    /// Returns a mutable reference to the active context.
    pub fn top_mut(&mut self) -> Option<&mut Context> {
        self.contexts.last_mut()
    }

    /// Drops all contexts.
    pub fn clear(&mut self) {
        self.contexts.clear()
    }

    /// Charges `len` consumed octets to every context on the stack.
    ///
    /// Every level's consumption counter grows. Levels with a definite
    /// budget left have it reduced; indefinite levels have none.
    pub fn consume(&mut self, len: u64) {
        for context in self.contexts.iter_mut() {
            context.consumed += len;
            if let Some(remaining) = context.remaining.as_mut() {
                *remaining = remaining.saturating_sub(len);
            }
        }
    }
}


//============ Tests =========================================================
