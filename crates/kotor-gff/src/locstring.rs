use kotor_support::StringRef;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// A language that localized strings can carry text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Language {
    English = 0,
    French = 1,
    German = 2,
    Italian = 3,
    Spanish = 4,
    Polish = 5,
    Korean = 128,
    ChineseTraditional = 129,
    ChineseSimplified = 130,
    Japanese = 131,
}

/// The grammatical gender of a localized string variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum Gender {
    Male = 0,
    Female = 1,
}

/// Compute the substring ID that a language/gender pair is stored under.
#[inline]
pub fn substring_id(language: Language, gender: Gender) -> u32 {
    u32::from(language) * 2 + u32::from(gender)
}

/// A string that either references the talk table or carries its own per-language text.
///
/// Substrings are keyed by their raw substring ID (`language * 2 + gender`), so text in
/// languages this crate does not know about survives a read/write cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    /// Talk table entry used when the game has no substring for its language.
    pub stringref: StringRef,
    substrings: BTreeMap<u32, String>,
}

impl LocalizedString {
    /// Create a localized string pointing at a talk table entry, without any substrings.
    pub fn new(stringref: impl Into<StringRef>) -> Self {
        Self {
            stringref: stringref.into(),
            substrings: BTreeMap::new(),
        }
    }

    /// Get the text for a language and gender.
    pub fn get(&self, language: Language, gender: Gender) -> Option<&str> {
        self.get_by_id(substring_id(language, gender))
    }

    /// Get the text stored under a raw substring ID.
    pub fn get_by_id(&self, id: u32) -> Option<&str> {
        self.substrings.get(&id).map(String::as_str)
    }

    /// Set the text for a language and gender, replacing any previous text.
    pub fn set(&mut self, language: Language, gender: Gender, text: impl Into<String>) {
        self.set_by_id(substring_id(language, gender), text);
    }

    /// Set the text stored under a raw substring ID.
    pub fn set_by_id(&mut self, id: u32, text: impl Into<String>) {
        self.substrings.insert(id, text.into());
    }

    /// Remove the text for a language and gender.
    pub fn remove(&mut self, language: Language, gender: Gender) -> Option<String> {
        self.substrings.remove(&substring_id(language, gender))
    }

    /// The number of substrings.
    pub fn len(&self) -> usize {
        self.substrings.len()
    }

    /// Check if there are no substrings.
    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty()
    }

    /// Iterate over `(substring id, text)` pairs in ascending ID order.
    pub fn iter(&self) -> Substrings<'_> {
        Substrings(self.substrings.iter())
    }
}

/// Iterator over the substrings of a `LocalizedString`.
#[derive(Debug)]
pub struct Substrings<'a>(btree_map::Iter<'a, u32, String>);

impl<'a> Iterator for Substrings<'a> {
    type Item = (u32, &'a str);
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(id, text)| (*id, text.as_str()))
    }
}

impl<'a> IntoIterator for &'a LocalizedString {
    type Item = (u32, &'a str);
    type IntoIter = Substrings<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "strref={}", self.stringref)?;
        for (id, text) in self.iter() {
            write!(f, ", {}={:?}", id, text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_ids() {
        assert_eq!(substring_id(Language::English, Gender::Male), 0);
        assert_eq!(substring_id(Language::French, Gender::Female), 3);
        assert_eq!(substring_id(Language::Korean, Gender::Male), 256);
    }

    #[test]
    fn set_and_get() {
        let mut locstring = LocalizedString::new(12u32);
        locstring.set(Language::English, Gender::Male, "a");
        locstring.set(Language::German, Gender::Female, "b");
        locstring.set(Language::English, Gender::Male, "c");
        assert_eq!(locstring.len(), 2);
        assert_eq!(locstring.get(Language::English, Gender::Male), Some("c"));
        assert_eq!(locstring.get_by_id(5), Some("b"));
        assert_eq!(locstring.stringref.index(), Some(12));
        assert_eq!(locstring.to_string(), "strref=12, 0=\"c\", 5=\"b\"");
    }
}
