//! Libraries for reading, writing and patching Knights of the Old Republic game resources.
//!
//! ## Resource Formats
//!
//! > Supported games: Knights of the Old Republic, The Sith Lords
//!
//! Each resource format lives in its own crate and can be read from and written back to bytes:
//!
//! - GFF files (creatures, items, dialogs, ...) are trees of labelled fields. See [`gff`].
//! - 2DA files are tables with labelled rows and named columns. See [`twoda`].
//! - The talk table (`dialog.tlk`) holds every localized string in the game. See [`tlk`].
//! - SSF files map creature sound slots to talk table entries. See [`ssf`].
//! - ERF, MOD and SAV files are archives of other resources. See [`erf`].
//!
//! ```rust
//! use kotor::TwoDA;
//!
//! let mut table = TwoDA::new(vec!["label", "model"]);
//! table.add_row(None, vec![("label", "Bastila"), ("model", "P_BastilaBB")])?;
//! let bytes = table.to_bytes()?;
//!
//! let table = TwoDA::read_from(&bytes[..])?;
//! assert_eq!(table.get_cell(0, "model"), Some("P_BastilaBB"));
//! # Ok::<(), kotor::twoda::Error>(())
//! ```
//!
//! ## Patching
//!
//! The [`patcher`] applies declarative mod instructions to those resources: appending talk table
//! entries, adding and changing 2DA rows, editing GFF fields and sound sets, and compiling
//! scripts. Values computed by one instruction (a new row index, a new string reference) are kept
//! in token memory and can be used by later instructions.
//!
//! The same crate can compare two resources field by field, which is how a patched resource is
//! checked against a known good one.

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

pub use kotor_erf as erf;
pub use kotor_gff as gff;
pub use kotor_patcher as patcher;
pub use kotor_ssf as ssf;
pub use kotor_support as support;
pub use kotor_tlk as tlk;
pub use kotor_twoda as twoda;

pub use kotor_erf::Erf;
pub use kotor_gff::Gff;
pub use kotor_patcher::{ModInstaller, PatcherConfig};
pub use kotor_ssf::SoundSet;
pub use kotor_support::{ResRef, StringRef};
pub use kotor_tlk::Talktable;
pub use kotor_twoda::TwoDA;
