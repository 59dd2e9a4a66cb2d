//! kotor-ssf reads and writes sound sets: the table of voice lines a creature plays in
//! combat and exploration, stored as talk table string references.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kotor_ssf::{SoundSet, SoundSlot};
//! use std::io::Cursor;
//!
//! let mut ssf = SoundSet::new();
//! ssf.set(SoundSlot::BattleCry1, Some(5));
//!
//! let mut bytes = vec![];
//! ssf.write_to(&mut bytes)?;
//! let ssf = SoundSet::read_from(Cursor::new(bytes))?;
//! assert_eq!(ssf.get(SoundSlot::BattleCry1), Some(5));
//! assert_eq!(ssf.get(SoundSlot::Poisoned), None);
//! # Ok(()) }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use kotor_support::{read_opt_u32, write_opt_u32};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::convert::TryFrom;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::str::FromStr;

const SIGNATURE: &[u8; 8] = b"SSF V1.1";
const HEADER_SIZE: u32 = 12;
/// The number of entries the game reserves in a sound set file.
const PADDED_SLOTS: usize = 40;

/// Errors that may occur while reading or writing a sound set.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file does not start with the `SSF V1.1` signature.
    #[error("not an SSF V1.1 file")]
    InvalidSignature,
    /// The underlying reader or writer failed.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// Result type for sound set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A voice line slot in a sound set.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SoundSlot {
    BattleCry1 = 0,
    BattleCry2 = 1,
    BattleCry3 = 2,
    BattleCry4 = 3,
    BattleCry5 = 4,
    BattleCry6 = 5,
    Select1 = 6,
    Select2 = 7,
    Select3 = 8,
    AttackGrunt1 = 9,
    AttackGrunt2 = 10,
    AttackGrunt3 = 11,
    PainGrunt1 = 12,
    PainGrunt2 = 13,
    LowHealth = 14,
    Dead = 15,
    CriticalHit = 16,
    TargetImmune = 17,
    LayMine = 18,
    DisarmMine = 19,
    BeginStealth = 20,
    BeginSearch = 21,
    BeginUnlock = 22,
    UnlockFailed = 23,
    UnlockSuccess = 24,
    SeparatedFromParty = 25,
    RejoinedParty = 26,
    Poisoned = 27,
}

/// Slot names as mod configuration files spell them.
const SLOT_NAMES: [&str; SoundSlot::COUNT] = [
    "Battlecry 1",
    "Battlecry 2",
    "Battlecry 3",
    "Battlecry 4",
    "Battlecry 5",
    "Battlecry 6",
    "Selected 1",
    "Selected 2",
    "Selected 3",
    "Attack 1",
    "Attack 2",
    "Attack 3",
    "Pain 1",
    "Pain 2",
    "Low health",
    "Death",
    "Critical hit",
    "Target immune",
    "Place mine",
    "Disarm mine",
    "Stealth on",
    "Search",
    "Pick lock start",
    "Pick lock fail",
    "Pick lock done",
    "Leave party",
    "Rejoin party",
    "Poisoned",
];

impl SoundSlot {
    /// The number of slots.
    pub const COUNT: usize = 28;

    /// Iterate over all slots in file order.
    pub fn all() -> impl Iterator<Item = SoundSlot> {
        (0..Self::COUNT as u8).filter_map(|n| SoundSlot::try_from(n).ok())
    }

    /// The name mod configuration files use for this slot.
    pub fn name(self) -> &'static str {
        SLOT_NAMES[u8::from(self) as usize]
    }
}

impl fmt::Display for SoundSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a sound slot name that does not exist.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown sound slot {0:?}")]
pub struct ParseSoundSlotError(String);

impl FromStr for SoundSlot {
    type Err = ParseSoundSlotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SLOT_NAMES
            .iter()
            .position(|name| *name == s)
            .and_then(|index| SoundSlot::try_from(index as u8).ok())
            .ok_or_else(|| ParseSoundSlotError(s.to_string()))
    }
}

/// A sound set: one optional string reference per slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SoundSet {
    sounds: [Option<u32>; SoundSlot::COUNT],
}

impl SoundSet {
    /// Create a sound set with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a sound set.
    pub fn read_from(mut input: impl Read + Seek) -> Result<Self> {
        let mut signature = [0; 8];
        input.read_exact(&mut signature)?;
        if &signature != SIGNATURE {
            return Err(Error::InvalidSignature);
        }
        let offset = input.read_u32::<LE>()?;
        input.seek(SeekFrom::Start(offset.into()))?;

        let mut sounds = [None; SoundSlot::COUNT];
        for sound in sounds.iter_mut() {
            *sound = read_opt_u32(&mut input)?;
        }
        Ok(Self { sounds })
    }

    /// Write this sound set, padded to the size the game expects.
    pub fn write_to(&self, mut output: impl Write) -> Result<()> {
        output.write_all(SIGNATURE)?;
        output.write_u32::<LE>(HEADER_SIZE)?;
        for sound in &self.sounds {
            write_opt_u32(&mut output, *sound)?;
        }
        for _ in SoundSlot::COUNT..PADDED_SLOTS {
            output.write_u32::<LE>(0xFFFF_FFFF)?;
        }
        Ok(())
    }

    /// Get the string reference in a slot.
    pub fn get(&self, slot: SoundSlot) -> Option<u32> {
        self.sounds[u8::from(slot) as usize]
    }

    /// Set or clear the string reference in a slot.
    pub fn set(&mut self, slot: SoundSlot, stringref: Option<u32>) {
        self.sounds[u8::from(slot) as usize] = stringref;
    }

    /// Iterate over every slot and its string reference.
    pub fn iter(&self) -> impl Iterator<Item = (SoundSlot, Option<u32>)> + '_ {
        SoundSlot::all().map(move |slot| (slot, self.get(slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_is_padded() -> anyhow::Result<()> {
        let mut ssf = SoundSet::new();
        ssf.set(SoundSlot::BattleCry1, Some(5));
        ssf.set(SoundSlot::Poisoned, Some(123));
        let mut bytes = vec![];
        ssf.write_to(&mut bytes)?;
        assert_eq!(bytes.len(), 12 + 40 * 4);
        assert_eq!(&bytes[bytes.len() - 4..], &[0xFF; 4]);
        assert_eq!(SoundSet::read_from(Cursor::new(bytes))?, ssf);
        Ok(())
    }

    #[test]
    fn slot_names() {
        assert_eq!(SoundSlot::all().count(), SoundSlot::COUNT);
        assert_eq!("Pick lock fail".parse::<SoundSlot>().ok(), Some(SoundSlot::UnlockFailed));
        assert_eq!(SoundSlot::Dead.name(), "Death");
        assert!("Battlecry 7".parse::<SoundSlot>().is_err());
    }
}
