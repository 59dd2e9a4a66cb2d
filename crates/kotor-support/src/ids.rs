use crate::{id_try_from, id_try_into};
use std::fmt;

/// An index into the talk table (dialog.tlk).
///
/// Resource files store "no string" as `-1` (or `0xFFFF_FFFF` when read unsigned), which is
/// represented by `StringRef::NONE`.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StringRef(u32);

impl StringRef {
    /// The "no string" reference.
    pub const NONE: StringRef = StringRef(u32::MAX);

    /// Get the talk table index, or `None` if this reference is empty.
    #[inline]
    pub fn index(self) -> Option<u32> {
        if self == Self::NONE {
            None
        } else {
            Some(self.0)
        }
    }

    /// Check if this reference points nowhere.
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// The raw value as stored in resource files.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Default for StringRef {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{}", index),
            None => write!(f, "-1"),
        }
    }
}

impl From<u32> for StringRef {
    fn from(n: u32) -> Self {
        StringRef(n)
    }
}

impl From<u16> for StringRef {
    fn from(n: u16) -> Self {
        StringRef(n.into())
    }
}

impl From<Option<u32>> for StringRef {
    fn from(n: Option<u32>) -> Self {
        n.map_or(Self::NONE, StringRef)
    }
}

impl From<StringRef> for i64 {
    fn from(n: StringRef) -> Self {
        n.index().map_or(-1, i64::from)
    }
}

impl std::convert::TryFrom<i32> for StringRef {
    type Error = std::num::TryFromIntError;
    fn try_from(n: i32) -> Result<Self, Self::Error> {
        if n == -1 {
            Ok(Self::NONE)
        } else {
            n.try_into().map(Self)
        }
    }
}

impl From<StringRef> for u32 {
    fn from(n: StringRef) -> Self {
        n.0
    }
}

id_try_into!(StringRef => u16, i32);
id_try_from!(StringRef <= u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_one_is_none() {
        assert_eq!(StringRef::try_from(-1i32).unwrap(), StringRef::NONE);
        assert_eq!(StringRef::from(0xFFFF_FFFFu32).index(), None);
        assert_eq!(StringRef::from(12u32).index(), Some(12));
        assert_eq!(i64::from(StringRef::NONE), -1);
        assert_eq!(StringRef::NONE.to_string(), "-1");
        assert_eq!(u32::from(StringRef::NONE), u32::MAX);
        assert!(i32::try_from(StringRef::NONE).is_err());
        assert_eq!(u16::try_from(StringRef::from(7u32)), Ok(7));
        assert!(StringRef::try_from(u64::MAX).is_err());
    }
}
