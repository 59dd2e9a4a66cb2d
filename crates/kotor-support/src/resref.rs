use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// The longest name a resource reference can hold.
pub const RESREF_MAX_LEN: usize = 16;

/// A resource name could not be turned into a `ResRef`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidResRef {
    /// The name is longer than 16 characters.
    #[error("resource name '{0}' is longer than 16 characters")]
    TooLong(String),
    /// The name contains a character outside of printable ASCII.
    #[error("resource name '{0}' contains characters outside of printable ASCII")]
    InvalidCharacters(String),
}

/// A case-preserving resource name of at most 16 printable ASCII characters.
///
/// Resource names identify files inside archives and the override folder without their
/// extension, e.g. `p_bastilla` or `nw_it_mring001`.
///
/// ```rust
/// use kotor_support::ResRef;
/// let resref = ResRef::new("g_w_lghtsbr01").unwrap();
/// assert_eq!(resref.as_str(), "g_w_lghtsbr01");
/// assert!(ResRef::new("this_name_is_far_too_long").is_err());
/// assert_eq!(ResRef::truncated("this_name_is_far_too_long").as_str(), "this_name_is_far");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ResRef(String);

impl ResRef {
    /// Create a resource reference, rejecting names that do not fit.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidResRef> {
        let name = name.into();
        if !name.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            return Err(InvalidResRef::InvalidCharacters(name));
        }
        if name.len() > RESREF_MAX_LEN {
            return Err(InvalidResRef::TooLong(name));
        }
        Ok(Self(name))
    }

    /// Create a resource reference, cutting the name off at 16 characters and dropping any
    /// characters that cannot be stored.
    pub fn truncated(name: &str) -> Self {
        Self(
            name.chars()
                .filter(|c| c.is_ascii() && !c.is_ascii_control())
                .take(RESREF_MAX_LEN)
                .collect(),
        )
    }

    /// An empty resource reference.
    pub fn blank() -> Self {
        Self(String::new())
    }

    /// Check if this reference is empty.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResRef {
    type Err = InvalidResRef;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ResRef {
    type Error = InvalidResRef;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResRef {
    type Error = InvalidResRef;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ResRef> for String {
    fn from(resref: ResRef) -> Self {
        resref.0
    }
}
