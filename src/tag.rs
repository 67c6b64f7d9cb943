//! The tag of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::int::Unsigned;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// The class is encoded in the two most significant bits of the first
/// identifier octet and partitions the tag number space four ways.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The class of the types defined in X.680 itself.
    Universal,

    /// The class for types defined by application wide specifications.
    Application,

    /// The class for tags whose meaning depends on their position.
    ContextSpecific,

    /// The class for everything else.
    Private,
}

impl Class {
    /// Returns the class encoded in an identifier octet.
    pub fn from_identifier(octet: u8) -> Self {
        match octet >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a BER encoded value.
///
/// Each BER encoded value starts with a sequence of one or more octets
/// called the _identifier octets._ They encode the tag of the value as
/// well as whether the value uses primitive or constructed encoding. The
/// `Tag` type represents the tag only, i.e., the class and the number.
/// Whether a particular value was constructed is carried alongside by
/// [`Element`][crate::Element].
///
/// Tag numbers between 0 and 30 are encoded in the remaining five bits
/// of the first identifier octet. The value 31 there announces a high
/// tag number in the following octets: base 128 digits, most significant
/// first, with the top bit of every octet but the last set. There is no
/// limit on the number of digits, so the tag number is an [`Unsigned`]
/// of unbounded width.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The class of the tag.
    class: Class,

    /// The tag number.
    number: Unsigned,
}

/// # Constants for Often Used Tag Values
///
impl Tag {
    /// The tag marking the end-of-contents in an indefinite length value.
    ///
    /// This is UNIVERSAL 0.
    pub const END_OF_VALUE: Self = Tag::universal(0);

    //--- Universal Tags
    //
    // See clause 8.4 of X.690.

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Tag::universal(1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Tag::universal(2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Tag::universal(3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Tag::universal(4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Tag::universal(5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Tag::universal(6);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Tag::universal(10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Tag::universal(12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Tag::universal(16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Tag::universal(17);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Tag::universal(19);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Tag::universal(22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Tag::universal(23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Tag::universal(24);
}

impl Tag {
    /// Creates a new tag from its parts.
    pub(crate) fn new(class: Class, number: Unsigned) -> Self {
        Tag { class, number }
    }

    /// Creates a new tag in the universal class with the given number.
    pub const fn universal(number: u64) -> Self {
        Tag { class: Class::Universal, number: Unsigned::from_u64(number) }
    }

    /// Creates a new tag in the application class with the given number.
    pub const fn application(number: u64) -> Self {
        Tag { class: Class::Application, number: Unsigned::from_u64(number) }
    }

    /// Creates a new tag in the context specific class.
    pub const fn ctx(number: u64) -> Self {
        Tag {
            class: Class::ContextSpecific,
            number: Unsigned::from_u64(number)
        }
    }

    /// Creates a new tag in the private class with the given number.
    pub const fn private(number: u64) -> Self {
        Tag { class: Class::Private, number: Unsigned::from_u64(number) }
    }

    /// Returns the class of the tag.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub fn number(&self) -> &Unsigned {
        &self.number
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(&self) -> bool {
        self.class == Class::Universal
    }

    /// Returns whether the tag is of the application class.
    pub fn is_application(&self) -> bool {
        self.class == Class::Application
    }

    /// Returns whether the tag is of the context specific class.
    pub fn is_context_specific(&self) -> bool {
        self.class == Class::ContextSpecific
    }

    /// Returns whether the tag is of the private class.
    pub fn is_private(&self) -> bool {
        self.class == Class::Private
    }
}


//--- Display and Debug

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.class == Class::Universal {
            let name = match self.number.to_u64() {
                Some(0) => Some("END-OF-CONTENTS"),
                Some(1) => Some("BOOLEAN"),
                Some(2) => Some("INTEGER"),
                Some(3) => Some("BIT STRING"),
                Some(4) => Some("OCTET STRING"),
                Some(5) => Some("NULL"),
                Some(6) => Some("OBJECT IDENTIFIER"),
                Some(10) => Some("ENUMERATED"),
                Some(12) => Some("UTF8String"),
                Some(16) => Some("SEQUENCE"),
                Some(17) => Some("SET"),
                Some(19) => Some("PrintableString"),
                Some(22) => Some("IA5String"),
                Some(23) => Some("UTCTime"),
                Some(24) => Some("GeneralizedTime"),
                _ => None,
            };
            if let Some(name) = name {
                return f.write_str(name)
            }
        }
        match self.class {
            Class::Universal => write!(f, "[UNIVERSAL {}]", self.number),
            Class::Application => write!(f, "[APPLICATION {}]", self.number),
            Class::ContextSpecific => write!(f, "[{}]", self.number),
            Class::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn class_from_identifier() {
        assert_eq!(Class::from_identifier(0x02), Class::Universal);
        assert_eq!(Class::from_identifier(0x41), Class::Application);
        assert_eq!(Class::from_identifier(0xa0), Class::ContextSpecific);
        assert_eq!(Class::from_identifier(0xdf), Class::Private);
    }

    #[test]
    fn constants() {
        assert_eq!(Tag::SEQUENCE.class(), Class::Universal);
        assert_eq!(*Tag::SEQUENCE.number(), 16);
        assert!(Tag::OCTET_STRING.is_universal());
        assert!(Tag::application(3).is_application());
        assert!(Tag::ctx(0).is_context_specific());
        assert!(Tag::private(7).is_private());
    }

    #[test]
    fn display() {
        assert_eq!(Tag::BOOLEAN.to_string(), "BOOLEAN");
        assert_eq!(Tag::OCTET_STRING.to_string(), "OCTET STRING");
        assert_eq!(Tag::END_OF_VALUE.to_string(), "END-OF-CONTENTS");
        assert_eq!(Tag::universal(77).to_string(), "[UNIVERSAL 77]");
        assert_eq!(Tag::application(3).to_string(), "[APPLICATION 3]");
        assert_eq!(Tag::ctx(0).to_string(), "[0]");
        assert_eq!(Tag::private(9).to_string(), "[PRIVATE 9]");
        assert_eq!(format!("{:?}", Tag::NULL), "Tag(NULL)");
    }
}
