//! Patching of the talk table.

use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenId};
use kotor_gff::FieldType;
use kotor_support::ResRef;
use kotor_tlk::{Talktable, TalktableEntry};

/// Append or replace one talk table entry.
///
/// Appending records the new entry's index in the `StrRef` token `token_id`. Replacing
/// overwrites the entry whose index *is* `token_id`, and records `token_id` itself in that
/// token, so later references to the token still resolve to the replaced entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyTlk {
    /// Token to record into, and for replacements, the entry to overwrite.
    pub token_id: TokenId,
    /// Entry text.
    pub text: String,
    /// Voice-over resource name.
    pub sound: String,
    /// Whether to overwrite an existing entry instead of appending.
    pub is_replacement: bool,
}

impl ModifyTlk {
    /// Append an entry.
    pub fn append(token_id: TokenId, text: impl Into<String>, sound: impl Into<String>) -> Self {
        Self {
            token_id,
            text: text.into(),
            sound: sound.into(),
            is_replacement: false,
        }
    }

    /// Overwrite the entry at index `token_id`.
    pub fn replace(token_id: TokenId, text: impl Into<String>, sound: impl Into<String>) -> Self {
        Self {
            is_replacement: true,
            ..Self::append(token_id, text, sound)
        }
    }

    /// Apply the instruction.
    ///
    /// A sound name that is not a valid resref fails the instruction.
    pub fn apply(&self, dialog: &mut Talktable, memory: &mut PatcherMemory) -> Result<()> {
        let voiceover = ResRef::new(self.sound.as_str()).map_err(|_| PatchError::TypeMismatch {
            value: self.sound.clone(),
            expected: FieldType::ResRef,
        })?;
        if self.is_replacement {
            dialog.replace_entry(self.token_id, &self.text, voiceover)?;
            memory.set_str(self.token_id, self.token_id);
        } else {
            let index = dialog.push(TalktableEntry::new(self.text.as_str(), voiceover));
            memory.set_str(self.token_id, index);
        }
        Ok(())
    }

    fn describe(&self) -> &'static str {
        if self.is_replacement {
            "could not replace entry"
        } else {
            "could not append an entry for token"
        }
    }
}

/// The instructions for the talk table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationsTlk {
    /// Name of the talk table, normally `dialog.tlk`.
    pub filename: String,
    /// Instructions, applied in order.
    pub modifiers: Vec<ModifyTlk>,
}

impl Default for ModificationsTlk {
    fn default() -> Self {
        Self {
            filename: "dialog.tlk".to_string(),
            modifiers: vec![],
        }
    }
}

impl ModificationsTlk {
    /// Create an empty set of instructions for `dialog.tlk`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every instruction. Each applied instruction counts as one completed patch.
    pub fn apply(
        &self,
        dialog: &mut Talktable,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) {
        for modifier in &self.modifiers {
            match modifier.apply(dialog, memory) {
                Ok(()) => logger.complete_patch(),
                Err(err) => logger.add_error(format!(
                    "{}: {} {}: {}",
                    self.filename,
                    modifier.describe(),
                    modifier.token_id,
                    err
                )),
            }
        }
    }
}
