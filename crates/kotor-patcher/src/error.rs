use crate::TokenId;
use kotor_gff::FieldType;
use std::io;

/// Errors that stop a single patch instruction, or a single resource, from being applied.
///
/// None of these abort an install run; the installer logs them and moves on to the next
/// instruction or resource.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A 2DA memory token was read before anything stored a value in it.
    #[error("2DAMEMORY{0} was not defined before use")]
    MissingToken2DA(TokenId),
    /// A StrRef memory token was read before anything stored a value in it.
    #[error("StrRef{0} was not defined before use")]
    MissingTokenStr(TokenId),
    /// A path inside a GFF tree could not be followed.
    #[error("could not navigate to {0:?}")]
    Navigation(String),
    /// A value could not be converted to the type of the field it is written to.
    #[error("cannot use {value:?} as a {expected} value")]
    TypeMismatch {
        /// The offending value.
        value: String,
        /// The type that was required.
        expected: FieldType,
    },
    /// A "one more than the largest" value would not fit in a 64-bit integer.
    #[error("no integer comes after the largest value in {0}")]
    NoHigherValue(String),
    /// No row matched a table target.
    #[error("no row matches {0}")]
    RowNotFound(String),
    /// A table column does not exist.
    #[error("column {0:?} does not exist")]
    MissingColumn(String),
    /// A table column already exists.
    #[error("column {0:?} already exists")]
    DuplicateColumn(String),
    /// A row-relative value was used outside of a row.
    #[error("row index, row label and row cell values need a row to refer to")]
    MissingRowContext,
    /// An index was outside the bounds of the resource.
    #[error("index {0} is out of range")]
    IndexOutOfRange(usize),
    /// The base resource for a patch could not be found.
    #[error("could not find {0}")]
    ResourceNotFound(String),
    /// An archive that resources are written into does not exist.
    #[error("the capsule {0:?} does not exist")]
    MissingCapsule(String),
    /// Compiling a script failed.
    #[error("could not compile {0}: {1}")]
    Compile(String, String),
    /// A file name does not map to a known resource type.
    #[error(transparent)]
    ResourceName(#[from] kotor_erf::ParseResourceIdentifierError),
    /// Reading or writing a GFF resource failed.
    #[error(transparent)]
    Gff(#[from] kotor_gff::Error),
    /// Reading or writing a 2DA resource failed.
    #[error(transparent)]
    TwoDA(kotor_twoda::Error),
    /// Reading or writing a talk table failed.
    #[error(transparent)]
    Tlk(#[from] kotor_tlk::Error),
    /// Reading or writing a sound set failed.
    #[error(transparent)]
    Ssf(#[from] kotor_ssf::Error),
    /// Reading or writing an archive failed.
    #[error(transparent)]
    Erf(#[from] kotor_erf::Error),
    /// Script source is not valid Windows-1252 text.
    #[error(transparent)]
    Decode(#[from] kotor_support::DecodeStringError),
    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<kotor_twoda::Error> for PatchError {
    fn from(err: kotor_twoda::Error) -> Self {
        match err {
            kotor_twoda::Error::MissingColumn(column) => PatchError::MissingColumn(column),
            kotor_twoda::Error::DuplicateColumn(column) => PatchError::DuplicateColumn(column),
            kotor_twoda::Error::RowIndex(index) => PatchError::IndexOutOfRange(index),
            err => PatchError::TwoDA(err),
        }
    }
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;
