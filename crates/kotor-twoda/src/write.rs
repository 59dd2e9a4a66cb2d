use crate::read::SIGNATURE;
use crate::{Error, Result, TwoDA};
use byteorder::{WriteBytesExt, LE};
use kotor_support::encode_str;
use std::collections::HashMap;
use std::io::Write;

pub(crate) fn write_twoda(table: &TwoDA, mut output: impl Write) -> Result<()> {
    output.write_all(SIGNATURE)?;
    for header in &table.headers {
        output.write_all(&encode_str(header)?)?;
        output.write_u8(b'\t')?;
    }
    output.write_u8(0)?;

    output.write_u32::<LE>(table.rows.len() as u32)?;
    for row in &table.rows {
        output.write_all(&encode_str(&row.label)?)?;
        output.write_u8(b'\t')?;
    }

    // Identical cells share one entry in the data section.
    let mut data = vec![];
    let mut seen: HashMap<&str, u16> = HashMap::new();
    let mut offsets = Vec::with_capacity(table.rows.len() * table.headers.len());
    for row in &table.rows {
        for cell in &row.cells {
            let offset = match seen.get(cell.as_str()) {
                Some(&offset) => offset,
                None => {
                    let offset =
                        u16::try_from(data.len()).map_err(|_| Error::TooLarge(data.len()))?;
                    data.extend_from_slice(&encode_str(cell)?);
                    data.push(0);
                    seen.insert(cell.as_str(), offset);
                    offset
                }
            };
            offsets.push(offset);
        }
    }
    let data_size = u16::try_from(data.len()).map_err(|_| Error::TooLarge(data.len()))?;

    for offset in offsets {
        output.write_u16::<LE>(offset)?;
    }
    output.write_u16::<LE>(data_size)?;
    output.write_all(&data)?;
    Ok(())
}
