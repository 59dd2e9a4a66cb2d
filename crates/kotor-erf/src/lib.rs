//! .erf is the encapsulated resource archive format used by KotOR for module files (`.mod`),
//! save games (`.sav`) and general resource bundles (`.erf`). Resources are identified by a
//! name of up to 16 characters and a numeric type.
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kotor_erf::{Erf, ErfType, ResourceIdentifier};
//! use std::io::Cursor;
//!
//! let mut erf = Erf::new(ErfType::Mod);
//! erf.set(ResourceIdentifier::from_filename("m01aa.are")?, b"contents".to_vec());
//!
//! let mut bytes = vec![];
//! erf.write_to(&mut bytes)?;
//! let erf = Erf::read_from(&mut Cursor::new(bytes))?;
//! for (ident, data) in erf.resources() {
//!     println!("{}: {} bytes", ident, data.len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

use kotor_support::{ReadStringError, WriteStringError};
use std::io::{self, Read, Seek, Write};

mod read;
mod restype;
mod write;

pub use restype::{ParseResourceIdentifierError, ResourceIdentifier, ResourceType};

/// Errors that may occur while reading or writing an archive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file is not an ERF archive.
    #[error("unknown archive type {0:?}")]
    UnknownFileType([u8; 4]),
    /// The archive uses a version other than V1.0.
    #[error("unsupported archive version {0:?}")]
    UnsupportedVersion([u8; 4]),
    /// A resource name could not be read or written.
    #[error("invalid resource name")]
    InvalidResourceName,
    /// The underlying reader or writer failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl From<ReadStringError> for Error {
    fn from(err: ReadStringError) -> Self {
        match err {
            ReadStringError::DecodeStringError(_) => Error::InvalidResourceName,
            ReadStringError::IoError(err) => Error::IoError(err),
        }
    }
}

impl From<WriteStringError> for Error {
    fn from(err: WriteStringError) -> Self {
        match err {
            WriteStringError::EncodeStringError(_) => Error::InvalidResourceName,
            WriteStringError::IoError(err) => Error::IoError(err),
        }
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The flavour of an archive. They share one layout and differ only in the file type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErfType {
    /// A generic resource bundle, `ERF `.
    Erf,
    /// A module, `MOD `.
    Mod,
    /// A save game, `SAV `.
    Sav,
}

impl ErfType {
    /// Get the archive flavour that files with this extension hold.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "erf" => Some(ErfType::Erf),
            "mod" => Some(ErfType::Mod),
            "sav" => Some(ErfType::Sav),
            _ => None,
        }
    }

    fn from_tag(tag: [u8; 4]) -> Result<Self> {
        match &tag {
            b"ERF " => Ok(ErfType::Erf),
            b"MOD " => Ok(ErfType::Mod),
            b"SAV " => Ok(ErfType::Sav),
            _ => Err(Error::UnknownFileType(tag)),
        }
    }

    fn tag(self) -> &'static [u8; 4] {
        match self {
            ErfType::Erf => b"ERF ",
            ErfType::Mod => b"MOD ",
            ErfType::Sav => b"SAV ",
        }
    }
}

/// An archive held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erf {
    /// The archive flavour.
    pub erf_type: ErfType,
    resources: Vec<(ResourceIdentifier, Vec<u8>)>,
}

impl Erf {
    /// Create an empty archive.
    pub fn new(erf_type: ErfType) -> Self {
        Self {
            erf_type,
            resources: vec![],
        }
    }

    /// Read a whole archive into memory.
    pub fn read_from<R: Read + Seek>(handle: &mut R) -> Result<Self> {
        read::read_erf(handle)
    }

    /// Write the archive.
    pub fn write_to<W: Write>(&self, output: &mut W) -> Result<()> {
        write::write_erf(self, output)
    }

    /// The number of resources.
    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if the archive contains no resources.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Get the contents of a resource.
    pub fn get(&self, ident: &ResourceIdentifier) -> Option<&[u8]> {
        self.resources
            .iter()
            .find(|(i, _)| i == ident)
            .map(|(_, data)| data.as_slice())
    }

    /// Check if the archive contains a resource.
    pub fn contains(&self, ident: &ResourceIdentifier) -> bool {
        self.get(ident).is_some()
    }

    /// Add a resource, or replace the contents of an existing one.
    pub fn set(&mut self, ident: ResourceIdentifier, data: Vec<u8>) {
        match self.resources.iter_mut().find(|(i, _)| *i == ident) {
            Some((_, existing)) => *existing = data,
            None => self.resources.push((ident, data)),
        }
    }

    /// Remove a resource, returning its contents.
    pub fn remove(&mut self, ident: &ResourceIdentifier) -> Option<Vec<u8>> {
        let index = self.resources.iter().position(|(i, _)| i == ident)?;
        Some(self.resources.remove(index).1)
    }

    /// Iterate over the resources in archive order.
    pub fn resources(&self) -> impl Iterator<Item = (&ResourceIdentifier, &[u8])> {
        self.resources.iter().map(|(i, data)| (i, data.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let mut erf = Erf::new(ErfType::Mod);
        erf.set(ResourceIdentifier::from_filename("m01aa.are")?, b"area".to_vec());
        erf.set(ResourceIdentifier::from_filename("p_bastila.utc")?, vec![1, 2, 3]);
        erf.set(ResourceIdentifier::from_filename("empty.2da")?, vec![]);

        let mut bytes = vec![];
        erf.write_to(&mut bytes)?;
        let again = Erf::read_from(&mut Cursor::new(bytes))?;
        assert_eq!(again, erf);
        Ok(())
    }

    #[test]
    fn set_replaces() -> anyhow::Result<()> {
        let mut erf = Erf::new(ErfType::Erf);
        let ident = ResourceIdentifier::from_filename("a.uti")?;
        erf.set(ident.clone(), vec![1]);
        erf.set(ident.clone(), vec![2]);
        assert_eq!(erf.len(), 1);
        assert_eq!(erf.get(&ident), Some(&[2u8][..]));
        assert_eq!(erf.remove(&ident), Some(vec![2]));
        assert!(erf.is_empty());
        Ok(())
    }

    #[test]
    fn type_from_extension() {
        assert_eq!(ErfType::from_extension("MOD"), Some(ErfType::Mod));
        assert_eq!(ErfType::from_extension("sav"), Some(ErfType::Sav));
        assert_eq!(ErfType::from_extension("rim"), None);
    }

    #[test]
    fn rejects_other_files() {
        let mut bytes = b"BIFFV1  ".to_vec();
        bytes.resize(160, 0);
        assert!(matches!(
            Erf::read_from(&mut Cursor::new(bytes)),
            Err(Error::UnknownFileType(_))
        ));
    }
}
