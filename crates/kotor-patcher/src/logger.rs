use std::fmt;

/// How much feedback an install run records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Record nothing.
    Nothing = 0,
    /// General progress only.
    General = 1,
    /// General progress and errors.
    Errors = 2,
    /// General progress, errors and warnings.
    Warnings = 3,
    /// Everything, including verbose progress notes.
    #[default]
    Full = 4,
}

/// The kind of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    /// Verbose progress information.
    Verbose,
    /// General progress information.
    Note,
    /// Something unexpected that did not stop the patch.
    Warning,
    /// Something that stopped an instruction or a resource from being patched.
    Error,
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogType::Verbose => "verbose",
            LogType::Note => "note",
            LogType::Warning => "warning",
            LogType::Error => "error",
        })
    }
}

/// One recorded log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLog {
    /// The kind of entry.
    pub log_type: LogType,
    /// The message text.
    pub message: String,
}

impl fmt::Display for PatchLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.log_type, self.message)
    }
}

/// Collects the notes, warnings and errors produced while patching.
///
/// Entries are kept in order so a caller can show them after the run, and each one is also
/// forwarded to the `log` facade as it happens. Logging never fails and never interrupts the
/// caller.
#[derive(Debug, Default, Clone)]
pub struct PatchLogger {
    level: LogLevel,
    entries: Vec<PatchLog>,
    patches_completed: usize,
}

impl PatchLogger {
    /// Create a logger that records everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger that records entries up to the given level.
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    fn record(&mut self, log_type: LogType, minimum: LogLevel, message: String) {
        if self.level >= minimum {
            self.entries.push(PatchLog { log_type, message });
        }
    }

    /// Record verbose progress information.
    pub fn add_verbose(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.record(LogType::Verbose, LogLevel::Full, message);
    }

    /// Record general progress information.
    pub fn add_note(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.record(LogType::Note, LogLevel::General, message);
    }

    /// Record a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.record(LogType::Warning, LogLevel::Warnings, message);
    }

    /// Record an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.record(LogType::Error, LogLevel::Errors, message);
    }

    /// Count one more patch as finished.
    pub fn complete_patch(&mut self) {
        self.patches_completed += 1;
    }

    /// The number of patches finished so far.
    pub fn patches_completed(&self) -> usize {
        self.patches_completed
    }

    /// All recorded entries, in order.
    pub fn entries(&self) -> &[PatchLog] {
        &self.entries
    }

    fn messages(&self, log_type: LogType) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.log_type == log_type)
            .map(|entry| entry.message.as_str())
    }

    /// Recorded notes.
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.messages(LogType::Note)
    }

    /// Recorded verbose notes.
    pub fn verbose(&self) -> impl Iterator<Item = &str> {
        self.messages(LogType::Verbose)
    }

    /// Recorded warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages(LogType::Warning)
    }

    /// Recorded errors.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages(LogType::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut logger = PatchLogger::new();
        logger.add_note("a");
        logger.add_warning("b");
        logger.add_error("c");
        logger.add_verbose("d");
        let kinds: Vec<_> = logger.entries().iter().map(|e| e.log_type).collect();
        assert_eq!(
            kinds,
            vec![LogType::Note, LogType::Warning, LogType::Error, LogType::Verbose]
        );
        assert_eq!(logger.warnings().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn level_filters_entries() {
        let mut logger = PatchLogger::with_level(LogLevel::Errors);
        logger.add_verbose("verbose");
        logger.add_note("note");
        logger.add_warning("warning");
        logger.add_error("error");
        assert_eq!(logger.entries().len(), 2);
        assert_eq!(logger.errors().count(), 1);
        assert_eq!(logger.warnings().count(), 0);

        let mut silent = PatchLogger::with_level(LogLevel::Nothing);
        silent.add_error("error");
        assert!(silent.entries().is_empty());
    }

    #[test]
    fn counts_patches() {
        let mut logger = PatchLogger::new();
        logger.complete_patch();
        logger.complete_patch();
        assert_eq!(logger.patches_completed(), 2);
    }
}
