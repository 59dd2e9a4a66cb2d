use super::format_text;
use crate::PatchLogger;
use kotor_twoda::TwoDA;

/// Compare two tables row by row, in row order.
///
/// Every column of `old` is compared. Rows are paired by position, so tables holding the same
/// rows in a different order differ.
pub fn diff_twoda(old: &TwoDA, new: &TwoDA, logger: &mut PatchLogger) -> bool {
    let mut same = true;
    if old.height() != new.height() {
        logger.add_note(format!(
            "2DA row count mismatch: '{}' --> '{}'",
            old.height(),
            new.height()
        ));
        same = false;
    }

    for header in old.headers() {
        if new.column_index(header).is_none() {
            logger.add_note(format!("2DA column '{}' is missing", header));
            same = false;
        }
    }

    for row in 0..old.height().min(new.height()) {
        for header in old.headers() {
            let (old_cell, new_cell) = match (old.get_cell(row, header), new.get_cell(row, header)) {
                (Some(old_cell), Some(new_cell)) => (old_cell, new_cell),
                _ => continue,
            };
            if old_cell != new_cell {
                logger.add_note(format!(
                    "2DA cell mismatch at row '{}' column '{}': {}-->{}",
                    row,
                    header,
                    format_text(old_cell),
                    format_text(new_cell)
                ));
                same = false;
            }
        }
    }

    same
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[&str; 2]]) -> TwoDA {
        let mut twoda = TwoDA::new(vec!["Col1", "Col2"]);
        for row in rows {
            twoda
                .add_row(None, vec![("Col1", row[0]), ("Col2", row[1])])
                .unwrap();
        }
        twoda
    }

    #[test]
    fn identical() {
        let mut logger = PatchLogger::new();
        let old = table(&[["a", "b"], ["c", "d"]]);
        assert!(diff_twoda(&old, &old.clone(), &mut logger));
        assert_eq!(logger.notes().count(), 0);
    }

    #[test]
    fn row_order_matters() {
        let mut logger = PatchLogger::new();
        let old = table(&[["a", "b"], ["c", "d"]]);
        let new = table(&[["c", "d"], ["a", "b"]]);
        assert!(!diff_twoda(&old, &new, &mut logger));
        assert!(logger
            .notes()
            .any(|n| n == "2DA cell mismatch at row '0' column 'Col1': 'a'-->'c'"));
    }

    #[test]
    fn row_count_and_columns() {
        let mut logger = PatchLogger::new();
        let old = table(&[["a", "b"]]);
        let mut new = table(&[["a", "b"], ["c", "d"]]);
        new.remove_column("Col2").unwrap();
        assert!(!diff_twoda(&old, &new, &mut logger));
        let notes: Vec<&str> = logger.notes().collect();
        assert!(notes.contains(&"2DA row count mismatch: '1' --> '2'"));
        assert!(notes.contains(&"2DA column 'Col2' is missing"));
    }
}
