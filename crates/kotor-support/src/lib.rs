//! Internal utilities for kotor-rs modules.

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(unused)]
#![allow(missing_docs)]

mod ids;
mod macros;
mod read;
mod resref;
mod strings;

pub use ids::*;
pub use macros::*;
pub use read::*;
pub use resref::*;
pub use strings::*;
