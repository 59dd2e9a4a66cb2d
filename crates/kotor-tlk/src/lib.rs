//! kotor-tlk reads and writes talk tables (`dialog.tlk`), the game's table of localized text.
//!
//! Every entry is addressed by its position, its *string reference*. Other resources refer to
//! text by string reference, so entries are only ever appended or replaced, never reordered.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kotor_tlk::Talktable;
//! use std::io::Cursor;
//!
//! let mut tlk = Talktable::new(0);
//! let id = tlk.add("Hello there.", "n_hello");
//! assert_eq!(id, 0);
//!
//! let mut bytes = vec![];
//! tlk.write_to(&mut bytes)?;
//! let tlk = Talktable::read_from(Cursor::new(bytes))?;
//! assert_eq!(tlk.get(0).map(|e| e.text.as_str()), Some("Hello there."));
//! # Ok(()) }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use kotor_support::{
    decode_str, encode_str, DecodeStringError, EncodeStringError, ReadStringError, ReadStringsExt,
    ResRef, WriteStringError, WriteStringsExt,
};
use std::io::{self, Read, Seek, SeekFrom, Write};

const SIGNATURE: &[u8; 8] = b"TLK V3.0";
const HEADER_SIZE: u32 = 20;
const ENTRY_SIZE: u32 = 40;

const FLAG_TEXT: u32 = 0x1;
const FLAG_SOUND: u32 = 0x2;
const FLAG_SOUND_LENGTH: u32 = 0x4;

/// Errors that may occur while reading, writing, or editing a talk table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file does not start with the `TLK V3.0` signature.
    #[error("not a TLK V3.0 file")]
    InvalidSignature,
    /// The string reference does not exist in this table.
    #[error("string reference {0} does not exist")]
    MissingEntry(u32),
    /// A string could not be decoded.
    #[error(transparent)]
    DecodeStringError(#[from] DecodeStringError),
    /// A string could not be encoded.
    #[error(transparent)]
    EncodeStringError(#[from] EncodeStringError),
    /// The underlying reader or writer failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl From<ReadStringError> for Error {
    fn from(err: ReadStringError) -> Self {
        match err {
            ReadStringError::DecodeStringError(err) => Error::DecodeStringError(err),
            ReadStringError::IoError(err) => Error::IoError(err),
        }
    }
}

impl From<WriteStringError> for Error {
    fn from(err: WriteStringError) -> Self {
        match err {
            WriteStringError::EncodeStringError(err) => Error::EncodeStringError(err),
            WriteStringError::IoError(err) => Error::IoError(err),
        }
    }
}

/// Result type for talk table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A talk table entry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TalktableEntry {
    /// The text of this entry.
    pub text: String,
    /// The voice-over sound played alongside the text.
    pub voiceover: ResRef,
    /// Length of the voice-over in seconds, if known.
    pub sound_length: Option<f32>,
}

impl TalktableEntry {
    /// Create an entry with text and a voice-over.
    pub fn new(text: impl Into<String>, voiceover: ResRef) -> Self {
        Self {
            text: text.into(),
            voiceover,
            sound_length: None,
        }
    }
}

/// A talk table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Talktable {
    /// Language ID of the text in this table.
    pub language_id: u32,
    entries: Vec<TalktableEntry>,
}

impl Talktable {
    /// Create an empty talk table.
    pub fn new(language_id: u32) -> Self {
        Self {
            language_id,
            entries: vec![],
        }
    }

    /// Read a talk table.
    pub fn read_from(mut input: impl Read + Seek) -> Result<Self> {
        let mut signature = [0; 8];
        input.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            return Err(Error::InvalidSignature);
        }
        let language_id = input.read_u32::<LE>()?;
        let count = input.read_u32::<LE>()?;
        let strings_offset = input.read_u32::<LE>()?;

        let mut headers = vec![];
        for _ in 0..count {
            let flags = input.read_u32::<LE>()?;
            let sound = input.read_fixed_str(16)?;
            let _volume_variance = input.read_u32::<LE>()?;
            let _pitch_variance = input.read_u32::<LE>()?;
            let offset = input.read_u32::<LE>()?;
            let size = input.read_u32::<LE>()?;
            let sound_length = input.read_f32::<LE>()?;
            headers.push((flags, sound, offset, size, sound_length));
        }

        let mut entries = Vec::with_capacity(headers.len());
        for (flags, sound, offset, size, sound_length) in headers {
            let text = if flags & FLAG_TEXT != 0 && size > 0 {
                input.seek(SeekFrom::Start(u64::from(strings_offset) + u64::from(offset)))?;
                let mut bytes = vec![];
                (&mut input).take(size.into()).read_to_end(&mut bytes)?;
                if bytes.len() != size as usize {
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
                }
                decode_str(&bytes)?
            } else {
                String::new()
            };
            let voiceover = if flags & FLAG_SOUND != 0 {
                ResRef::truncated(&sound)
            } else {
                ResRef::blank()
            };
            entries.push(TalktableEntry {
                text,
                voiceover,
                sound_length: Some(sound_length).filter(|_| flags & FLAG_SOUND_LENGTH != 0),
            });
        }

        log::trace!("read talk table with {} entries", entries.len());
        Ok(Self {
            language_id,
            entries,
        })
    }

    /// Write this talk table.
    pub fn write_to(&self, mut output: impl Write) -> Result<()> {
        let texts = self
            .entries
            .iter()
            .map(|entry| encode_str(&entry.text))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        output.write_all(SIGNATURE)?;
        output.write_u32::<LE>(self.language_id)?;
        output.write_u32::<LE>(self.entries.len() as u32)?;
        output.write_u32::<LE>(HEADER_SIZE + ENTRY_SIZE * self.entries.len() as u32)?;

        let mut offset = 0u32;
        for (entry, text) in self.entries.iter().zip(&texts) {
            let mut flags = 0;
            if !text.is_empty() {
                flags |= FLAG_TEXT;
            }
            if !entry.voiceover.is_blank() {
                flags |= FLAG_SOUND;
            }
            if entry.sound_length.is_some() {
                flags |= FLAG_SOUND_LENGTH;
            }
            output.write_u32::<LE>(flags)?;
            output.write_fixed_str(entry.voiceover.as_str(), 16)?;
            output.write_u32::<LE>(0)?;
            output.write_u32::<LE>(0)?;
            output.write_u32::<LE>(offset)?;
            output.write_u32::<LE>(text.len() as u32)?;
            output.write_f32::<LE>(entry.sound_length.unwrap_or(0.0))?;
            offset += text.len() as u32;
        }
        for text in &texts {
            output.write_all(text)?;
        }
        Ok(())
    }

    /// Returns the number of entries in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use kotor_tlk::Talktable;
    /// let mut tlk = Talktable::new(0);
    /// assert_eq!(tlk.len(), 0);
    /// tlk.add("Hello", "");
    /// assert_eq!(tlk.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by string reference.
    pub fn get(&self, stringref: u32) -> Option<&TalktableEntry> {
        self.entries.get(stringref as usize)
    }

    /// Get a mutable entry by string reference.
    pub fn get_mut(&mut self, stringref: u32) -> Option<&mut TalktableEntry> {
        self.entries.get_mut(stringref as usize)
    }

    /// Append an entry and return its string reference.
    ///
    /// Sound names longer than a resref allows are truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use kotor_tlk::Talktable;
    /// let mut tlk = Talktable::new(0);
    /// assert_eq!(tlk.add("first", ""), 0);
    /// assert_eq!(tlk.add("second", "vo_second"), 1);
    /// assert_eq!(tlk.get(1).unwrap().voiceover.as_str(), "vo_second");
    /// ```
    pub fn add(&mut self, text: impl Into<String>, sound: &str) -> u32 {
        self.push(TalktableEntry::new(text, ResRef::truncated(sound)))
    }

    /// Append an entry and return its string reference.
    pub fn push(&mut self, entry: TalktableEntry) -> u32 {
        self.entries.push(entry);
        self.entries.len() as u32 - 1
    }

    /// Replace the entry at `stringref`.
    ///
    /// An empty `text` keeps the existing text, and a blank `sound` keeps the existing sound.
    ///
    /// # Examples
    ///
    /// ```
    /// use kotor_tlk::Talktable;
    /// let mut tlk = Talktable::new(0);
    /// tlk.add("old", "old_vo");
    /// tlk.replace(0, "new", "").unwrap();
    /// let entry = tlk.get(0).unwrap();
    /// assert_eq!(entry.text, "new");
    /// assert_eq!(entry.voiceover.as_str(), "old_vo");
    /// assert!(tlk.replace(5, "x", "").is_err());
    /// ```
    pub fn replace(&mut self, stringref: u32, text: &str, sound: &str) -> Result<()> {
        self.replace_entry(stringref, text, ResRef::truncated(sound))
    }

    /// Replace the entry at `stringref` with an already validated voice-over name.
    ///
    /// An empty `text` keeps the existing text, and a blank `voiceover` keeps the existing sound.
    pub fn replace_entry(&mut self, stringref: u32, text: &str, voiceover: ResRef) -> Result<()> {
        let entry = self
            .entries
            .get_mut(stringref as usize)
            .ok_or(Error::MissingEntry(stringref))?;
        if !text.is_empty() {
            entry.text = text.to_string();
        }
        if !voiceover.is_blank() {
            entry.voiceover = voiceover;
        }
        Ok(())
    }

    /// Grow or shrink the table to `size` entries. New entries are empty.
    pub fn resize(&mut self, size: usize) {
        self.entries.resize_with(size, TalktableEntry::default);
    }

    /// Iterate over `(stringref, entry)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &TalktableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (index as u32, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let mut tlk = Talktable::new(2);
        tlk.add("Bad guy.", "");
        tlk.add("Hello there.", "vo_hello");
        tlk.add("", "");
        tlk.get_mut(1).unwrap().sound_length = Some(1.5);

        let mut bytes = vec![];
        tlk.write_to(&mut bytes)?;
        assert_eq!(bytes.len(), 20 + 3 * 40 + "Bad guy.".len() + "Hello there.".len());

        let again = Talktable::read_from(Cursor::new(bytes))?;
        assert_eq!(again, tlk);
        assert_eq!(again.language_id, 2);
        Ok(())
    }

    #[test]
    fn rejects_bad_signature() {
        let bytes = b"TLK V4.0\0\0\0\0\0\0\0\0\0\0\0\0".to_vec();
        assert!(matches!(
            Talktable::read_from(Cursor::new(bytes)),
            Err(Error::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_counts_and_sizes_past_the_end() -> anyhow::Result<()> {
        let mut bytes = SIGNATURE.to_vec();
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(u32::MAX)?;
        bytes.write_u32::<LE>(20)?;
        assert!(matches!(
            Talktable::read_from(Cursor::new(bytes)),
            Err(Error::IoError(_))
        ));

        let mut tlk = Talktable::new(0);
        tlk.add("Hello there.", "");
        let mut bytes = vec![];
        tlk.write_to(&mut bytes)?;
        // size of the first entry's text
        bytes[20 + 32..20 + 36].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Talktable::read_from(Cursor::new(bytes)),
            Err(Error::IoError(_))
        ));
        Ok(())
    }

    #[test]
    fn resize_fills_with_blank_entries() {
        let mut tlk = Talktable::new(0);
        tlk.resize(3);
        assert_eq!(tlk.len(), 3);
        assert_eq!(tlk.get(2), Some(&TalktableEntry::default()));
        tlk.resize(1);
        assert_eq!(tlk.len(), 1);
    }
}
