//! Binary patching of compiled scripts.

use super::PatchTarget;
use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenId};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom};

/// The value of a 16-bit word written into a compiled script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackValue {
    /// A literal word.
    Constant(u16),
    /// The integer stored in a `2DAMEMORY` token.
    Memory2DA(TokenId),
    /// The talk table index stored in a `StrRef` token.
    MemoryStr(TokenId),
}

impl HackValue {
    /// Resolve the word to write.
    pub fn resolve(self, memory: &PatcherMemory) -> Result<u16> {
        let value = match self {
            HackValue::Constant(value) => return Ok(value),
            HackValue::Memory2DA(token) => {
                let text = memory.get_2da(token)?;
                text.trim().parse::<i64>().map_err(|_| mismatch(text))?
            }
            HackValue::MemoryStr(token) => i64::from(memory.get_str(token)?),
        };
        u16::try_from(value)
            .or_else(|_| i16::try_from(value).map(|n| n as u16))
            .map_err(|_| mismatch(&value.to_string()))
    }
}

fn mismatch(text: &str) -> PatchError {
    PatchError::TypeMismatch {
        value: text.to_string(),
        expected: kotor_gff::FieldType::UInt16,
    }
}

/// Words to overwrite in a compiled script, by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationsNcs {
    /// Where the script is read from and written to.
    pub target: PatchTarget,
    /// `(offset, value)` pairs, applied in order.
    pub hackdata: Vec<(u64, HackValue)>,
}

impl ModificationsNcs {
    /// Create an empty set of instructions for a script.
    pub fn new(target: PatchTarget) -> Self {
        Self {
            target,
            hackdata: vec![],
        }
    }

    /// Write every word into `ncs`. Words are big-endian, like all values in compiled scripts.
    pub fn apply(
        &self,
        ncs: &mut Vec<u8>,
        memory: &PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let mut writer = Cursor::new(ncs);
        for (offset, value) in &self.hackdata {
            logger.add_note(format!(
                "HACKList {}: seeking to offset {:#X}",
                self.target.sourcefile, offset
            ));
            let word = value.resolve(memory)?;
            let end = offset + 2;
            if end > writer.get_ref().len() as u64 {
                return Err(PatchError::IndexOutOfRange(*offset as usize));
            }
            logger.add_note(format!(
                "HACKList {}: writing WORD {} at offset {:#X}",
                self.target.sourcefile, word, offset
            ));
            writer.seek(SeekFrom::Start(*offset))?;
            writer.write_u16::<BigEndian>(word)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_words() {
        let mut memory = PatcherMemory::new();
        memory.set_2da(1, "258");
        memory.set_str(2, 0x0304);
        let mut patch = ModificationsNcs::new(PatchTarget::new("k_script.ncs"));
        patch.hackdata = vec![
            (0, HackValue::Constant(0xABCD)),
            (2, HackValue::Memory2DA(1)),
            (5, HackValue::MemoryStr(2)),
        ];
        let mut ncs = vec![0u8; 8];
        let mut logger = PatchLogger::new();
        patch.apply(&mut ncs, &memory, &mut logger).unwrap();
        assert_eq!(ncs, vec![0xAB, 0xCD, 0x01, 0x02, 0x00, 0x03, 0x04, 0x00]);
        assert!(logger
            .notes()
            .any(|note| note == "HACKList k_script.ncs: writing WORD 258 at offset 0x2"));
    }

    #[test]
    fn negative_words_wrap() {
        let mut memory = PatcherMemory::new();
        memory.set_2da(1, "-1");
        assert_eq!(HackValue::Memory2DA(1).resolve(&memory).unwrap(), 0xFFFF);
        memory.set_2da(2, "70000");
        assert!(HackValue::Memory2DA(2).resolve(&memory).is_err());
    }

    #[test]
    fn offset_past_end() {
        let memory = PatcherMemory::new();
        let mut patch = ModificationsNcs::new(PatchTarget::new("k_script.ncs"));
        patch.hackdata = vec![(7, HackValue::Constant(1))];
        let mut ncs = vec![0u8; 8];
        let mut logger = PatchLogger::new();
        assert!(matches!(
            patch.apply(&mut ncs, &memory, &mut logger),
            Err(PatchError::IndexOutOfRange(7))
        ));
        assert_eq!(ncs, vec![0u8; 8]);
    }
}
