//! Patching of sound sets.

use super::PatchTarget;
use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenUsage};
use kotor_ssf::{SoundSet, SoundSlot};

/// Point one sound slot at a talk table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifySsf {
    /// The slot to change.
    pub sound: SoundSlot,
    /// The talk table index; `-1` clears the slot.
    pub value: TokenUsage,
}

impl ModifySsf {
    /// Create an instruction that sets `sound`.
    pub fn new(sound: SoundSlot, value: impl Into<TokenUsage>) -> Self {
        Self {
            sound,
            value: value.into(),
        }
    }

    /// Apply the instruction.
    pub fn apply(&self, ssf: &mut SoundSet, memory: &PatcherMemory) -> Result<()> {
        let text = self.value.value(memory)?;
        let stringref = match text.trim().parse::<i64>() {
            Ok(-1) => None,
            Ok(n) => Some(u32::try_from(n).map_err(|_| mismatch(&text))?),
            Err(_) => return Err(mismatch(&text)),
        };
        ssf.set(self.sound, stringref);
        Ok(())
    }
}

fn mismatch(text: &str) -> PatchError {
    PatchError::TypeMismatch {
        value: text.to_string(),
        expected: kotor_gff::FieldType::UInt32,
    }
}

/// The instructions for one sound set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationsSsf {
    /// Where the resource is read from and written to.
    pub target: PatchTarget,
    /// Instructions, applied in order.
    pub modifiers: Vec<ModifySsf>,
}

impl ModificationsSsf {
    /// Create an empty set of instructions for a resource.
    pub fn new(target: PatchTarget) -> Self {
        Self {
            target,
            modifiers: vec![],
        }
    }

    /// Apply every instruction. Failed instructions are logged and skipped.
    pub fn apply(&self, ssf: &mut SoundSet, memory: &PatcherMemory, logger: &mut PatchLogger) {
        for modifier in &self.modifiers {
            match modifier.apply(ssf, memory) {
                Ok(()) => logger.add_verbose(format!(
                    "{}: set '{}'",
                    self.target.saveas,
                    modifier.sound.name()
                )),
                Err(err) => logger.add_error(format!(
                    "{}: could not set '{}': {}",
                    self.target.saveas,
                    modifier.sound.name(),
                    err
                )),
            }
        }
    }
}
