//! Plain file installs.

use super::Destination;

/// A file the mod supplies, copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFile {
    /// Name of the file in the mod folder, and at the destination.
    pub filename: String,
    /// Whether to overwrite a file that already exists at the destination.
    pub replace_existing: bool,
}

impl InstallFile {
    /// Create a file install.
    pub fn new(filename: impl Into<String>, replace_existing: bool) -> Self {
        Self {
            filename: filename.into(),
            replace_existing,
        }
    }
}

/// A group of files installed into one folder or archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFolder {
    /// Where the files go.
    pub destination: Destination,
    /// The files.
    pub files: Vec<InstallFile>,
}

impl InstallFolder {
    /// Create an empty group for `destination`, a folder or archive path relative to the game
    /// directory.
    pub fn new(destination: &str) -> Self {
        Self {
            destination: Destination::parse(destination),
            files: vec![],
        }
    }

    /// Add a file.
    pub fn file(mut self, filename: impl Into<String>, replace_existing: bool) -> Self {
        self.files.push(InstallFile::new(filename, replace_existing));
        self
    }

    /// Whether the group already installs `filename`.
    pub fn contains(&self, filename: &str) -> bool {
        self.files
            .iter()
            .any(|file| file.filename.eq_ignore_ascii_case(filename))
    }
}
