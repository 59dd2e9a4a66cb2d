//! kotor-patcher applies declarative mod patches to KotOR game resources.
//!
//! A mod describes its changes as instructions: add a field to a creature template, append a
//! row to `appearance.2da`, add lines to `dialog.tlk`, and so on. Instructions can record
//! values (a new row's index, a new talk table entry's string reference) into a
//! [`PatcherMemory`], and later instructions can read them back. This is how a mod refers to
//! rows and strings whose final positions depend on what else is installed.
//!
//! The [`mods`] module holds the instruction types for each resource kind. [`ModInstaller`]
//! runs a whole [`PatcherConfig`] against a game folder, and [`diff`] compares resources
//! structurally, which is mostly useful to check what an install changed.
//!
//! ```rust
//! use kotor_gff::{FieldType, Gff, List};
//! use kotor_patcher::mods::gff::{AddField, AddStructToList, ModificationsGff};
//! use kotor_patcher::mods::PatchTarget;
//! use kotor_patcher::{PatchLogger, PatcherMemory};
//!
//! let mut patch = ModificationsGff::new(PatchTarget::new("p_bastila.utc"));
//! patch.modifiers.push(
//!     AddField::new("", "List", FieldType::List, List::new())
//!         .with_modifier(
//!             AddStructToList::new("", Some(0))
//!                 .with_modifier(AddField::new("", "SomeInteger", FieldType::UInt8, 123u8)),
//!         )
//!         .into(),
//! );
//!
//! let mut gff = Gff::new(*b"UTC ");
//! let mut memory = PatcherMemory::new();
//! let mut logger = PatchLogger::new();
//! patch.apply(&mut gff, &mut memory, &mut logger);
//!
//! let first = gff.root.get_list("List").and_then(|list| list.get(0));
//! assert_eq!(first.and_then(|s| s.get_u8("SomeInteger")), Some(123));
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

mod config;
pub mod diff;
mod error;
mod installer;
mod logger;
mod memory;
pub mod mods;
pub mod store;

/// Identifies a slot in [`PatcherMemory`].
pub type TokenId = u32;

pub use config::PatcherConfig;
pub use error::{PatchError, Result};
pub use installer::ModInstaller;
pub use logger::{LogLevel, LogType, PatchLog, PatchLogger};
pub use memory::{PatcherMemory, TokenUsage};
pub use mods::nss::ScriptCompiler;
pub use store::{FileStore, MemoryStore, ResourceStore};
