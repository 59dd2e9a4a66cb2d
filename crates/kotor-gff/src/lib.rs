//! kotor-gff reads and writes BioWare's Generic File Format (GFF, version 3.2).
//!
//! GFF is the hierarchical container behind most KotOR templates and module files: creature
//! blueprints (`.utc`), items (`.uti`), dialogs (`.dlg`), area data (`.are`, `.git`), and so on.
//! A file is a tree of [`Struct`]s, each holding labelled, typed fields. Fields may themselves
//! be structs or [`List`]s of structs.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kotor_gff::{Gff, List, Struct};
//! use std::io::Cursor;
//!
//! let mut gff = Gff::new(*b"UTC ");
//! gff.root.set("Tag", "bastila");
//! let list = gff.root.set_list("ItemList", List::new());
//! list.add(0).set("Dropable", 1u8);
//!
//! let mut bytes = vec![];
//! gff.write_to(&mut bytes)?;
//! let again = Gff::read_from(Cursor::new(bytes))?;
//! assert_eq!(again, gff);
//! # Ok(()) }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

mod field;
mod locstring;
mod read;
mod structure;
mod vector;
mod write;

pub use field::{FieldType, FieldValue};
pub use locstring::{substring_id, Gender, Language, LocalizedString, Substrings};
pub use structure::{List, Struct};
pub use vector::{ParseVectorError, Vector3, Vector4};

use kotor_support::{DecodeStringError, EncodeStringError, ReadStringError, WriteStringError};
use std::io::{self, Read, Write};

/// Struct ID used for the root struct of every GFF file.
pub const ROOT_STRUCT_ID: u32 = 0xFFFF_FFFF;

/// Errors that may occur while reading or writing a GFF file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file is not a GFF V3.2 file.
    #[error("unsupported GFF version {0:?}")]
    UnsupportedVersion([u8; 4]),
    /// A field entry used a type tag that does not exist.
    #[error("unknown GFF field type {0}")]
    UnknownFieldType(u32),
    /// A struct reference pointed outside the struct array.
    #[error("struct index {0} is out of range")]
    StructIndex(u32),
    /// A field reference pointed outside the field array.
    #[error("field index {0} is out of range")]
    FieldIndex(u32),
    /// A field referenced a label that does not exist.
    #[error("label index {0} is out of range")]
    LabelIndex(u32),
    /// A field label does not fit in the 16 bytes the format allows.
    #[error("field label {0:?} is longer than 16 bytes")]
    LabelTooLong(String),
    /// One of the header's tables reaches past the end of the file.
    #[error("the {0} table reaches past the end of the file")]
    TableOutOfBounds(&'static str),
    /// A struct (indirectly) contains itself.
    #[error("struct {0} contains itself")]
    CyclicStruct(u32),
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

/// Result type for GFF operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A GFF file: a four-character content type and a root struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Gff {
    /// Content type, like `b"UTC "` or `b"DLG "`.
    pub file_type: [u8; 4],
    /// The root of the struct tree.
    pub root: Struct,
}

impl Gff {
    /// Create an empty GFF file with the given content type.
    pub fn new(file_type: [u8; 4]) -> Self {
        Self {
            file_type,
            root: Struct::new(ROOT_STRUCT_ID),
        }
    }

    /// Read a GFF file.
    pub fn read_from(input: impl Read) -> Result<Self> {
        read::read_gff(input)
    }

    /// Write this GFF file.
    pub fn write_to(&self, output: impl Write) -> Result<()> {
        write::write_gff(self, output)
    }

    /// Serialize this GFF file into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Read a GFF file from a byte slice.
pub fn read_gff(bytes: &[u8]) -> Result<Gff> {
    Gff::read_from(bytes)
}

/// Serialize a GFF file to bytes.
pub fn bytes_gff(gff: &Gff) -> Result<Vec<u8>> {
    gff.to_bytes()
}
