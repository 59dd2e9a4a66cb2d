use super::format_text;
use crate::PatchLogger;
use kotor_tlk::Talktable;

/// Compare two talk tables entry by entry.
pub fn diff_tlk(old: &Talktable, new: &Talktable, logger: &mut PatchLogger) -> bool {
    let mut same = true;
    if old.len() != new.len() {
        logger.add_note(format!(
            "TLK entry count mismatch: '{}' --> '{}'",
            old.len(),
            new.len()
        ));
        same = false;
    }

    for (stringref, old_entry) in old.iter() {
        let new_entry = match new.get(stringref) {
            Some(entry) => entry,
            None => continue,
        };
        if old_entry.text != new_entry.text {
            logger.add_note(format!(
                "TLK text mismatch at stringref '{}': {}-->{}",
                stringref,
                format_text(&old_entry.text),
                format_text(&new_entry.text)
            ));
            same = false;
        }
        if old_entry.voiceover != new_entry.voiceover {
            logger.add_note(format!(
                "TLK sound mismatch at stringref '{}': {}-->{}",
                stringref,
                format_text(&old_entry.voiceover),
                format_text(&new_entry.voiceover)
            ));
            same = false;
        }
    }

    same
}
