//! Patch instructions for each resource kind.

pub mod gff;
pub mod install;
pub mod ncs;
pub mod nss;
pub mod ssf;
pub mod tlk;
pub mod twoda;

use std::fmt;

/// Where a patched resource is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// A folder relative to the game directory, such as `Override`.
    Folder(String),
    /// An archive relative to the game directory, such as `modules/danm13.mod`.
    Capsule(String),
}

impl Destination {
    /// Interpret a destination path: paths ending in an archive extension are capsules.
    pub fn parse(path: &str) -> Self {
        let path = path.trim_matches(|c| c == '\\' || c == '/').replace('\\', "/");
        let lower = path.to_ascii_lowercase();
        if [".mod", ".erf", ".sav"].iter().any(|ext| lower.ends_with(ext)) {
            Destination::Capsule(path)
        } else {
            Destination::Folder(path)
        }
    }

    /// The destination path.
    pub fn path(&self) -> &str {
        match self {
            Destination::Folder(path) | Destination::Capsule(path) => path,
        }
    }

    /// Whether the destination is an archive.
    pub fn is_capsule(&self) -> bool {
        matches!(self, Destination::Capsule(_))
    }
}

impl Default for Destination {
    fn default() -> Self {
        Destination::Folder("Override".to_string())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to do when a resource patched into an archive also exists in `Override`.
///
/// The game loads `Override` first, so the copy there hides the patched one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideType {
    /// Do not check.
    Ignore,
    /// Log a warning.
    Warn,
    /// Rename the `Override` copy with an `old_` prefix.
    Rename,
}

impl Default for OverrideType {
    fn default() -> Self {
        OverrideType::Ignore
    }
}

/// Which resource a patch reads, and where the result goes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    /// Name of the resource the patch starts from.
    pub sourcefile: String,
    /// Name the patched resource is written as.
    pub saveas: String,
    /// Where the patched resource is written.
    pub destination: Destination,
    /// Whether to overwrite a resource that already exists at the destination.
    pub replace_file: bool,
    /// How to handle an `Override` copy of a resource patched into an archive.
    pub override_type: OverrideType,
}

impl PatchTarget {
    /// Target `name`, saved under the same name into `Override`.
    pub fn new(name: impl Into<String>) -> Self {
        let sourcefile = name.into();
        Self {
            saveas: sourcefile.clone(),
            sourcefile,
            destination: Destination::default(),
            replace_file: false,
            override_type: OverrideType::Ignore,
        }
    }

    /// Save the patched resource under a different name.
    pub fn save_as(mut self, name: impl Into<String>) -> Self {
        self.saveas = name.into();
        self
    }

    /// Write the patched resource to `destination`.
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Overwrite an existing resource at the destination.
    pub fn replace(mut self, replace_file: bool) -> Self {
        self.replace_file = replace_file;
        self
    }

    /// Check for a shadowing `Override` copy when writing into an archive.
    pub fn with_override_type(mut self, override_type: OverrideType) -> Self {
        self.override_type = override_type;
        self
    }
}
