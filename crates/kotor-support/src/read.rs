use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Result, Write};

/// Read a 4-byte integer that uses -1 as an "absent" value.
///
/// ## Example
///
/// ```rust
/// use kotor_support::read_opt_u32;
///
/// let mut minus_one = std::io::Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFF]);
/// let mut seven = std::io::Cursor::new(vec![0x07, 0x00, 0x00, 0x00]);
///
/// assert_eq!(read_opt_u32(&mut minus_one).unwrap(), None);
/// assert_eq!(read_opt_u32(&mut seven).unwrap(), Some(7));
/// ```
pub fn read_opt_u32<R: Read>(input: &mut R) -> Result<Option<u32>> {
    match input.read_u32::<LE>()? {
        0xFFFF_FFFF => Ok(None),
        v => Ok(Some(v)),
    }
}

/// Write a 4-byte integer, using -1 for `None`.
pub fn write_opt_u32<W: Write>(output: &mut W, value: Option<u32>) -> Result<()> {
    output.write_u32::<LE>(value.unwrap_or(0xFFFF_FFFF))
}
