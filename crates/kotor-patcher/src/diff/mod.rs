//! Structural comparison of resources.
//!
//! Every difference found is written to the [`PatchLogger`](crate::PatchLogger) as a note.
//! Differences are findings, not errors: each comparison returns `true` only when nothing
//! differs.

mod gff;
mod tlk;
mod twoda;

pub use gff::{diff_gff, diff_list, diff_struct};
pub use tlk::diff_tlk;
pub use twoda::diff_twoda;

/// Values longer than this are printed on their own lines.
const MAX_INLINE_LENGTH: usize = 50;

/// Quote a value for a difference report.
///
/// Short single-line values are wrapped in single quotes; anything else goes between
/// triple-quote lines.
pub fn format_text(value: impl std::fmt::Display) -> String {
    let text = value.to_string();
    if text.contains('\n') || text.chars().count() > MAX_INLINE_LENGTH {
        format!("\"\"\"\n{}\n\"\"\"", text)
    } else {
        format!("'{}'", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(format_text(12), "'12'");
        assert_eq!(format_text("a\nb"), "\"\"\"\na\nb\n\"\"\"");
        let long = "x".repeat(51);
        assert_eq!(format_text(&long), format!("\"\"\"\n{}\n\"\"\"", long));
        assert_eq!(format_text("x".repeat(50)), format!("'{}'", "x".repeat(50)));
    }
}
