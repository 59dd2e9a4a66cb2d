use super::read::VERSION;
use super::{Erf, Result};
use byteorder::{WriteBytesExt, LE};
use kotor_support::WriteStringsExt;
use std::io::Write;

const HEADER_SIZE: u32 = 160;
const KEY_SIZE: u32 = 24;
const RESOURCE_ENTRY_SIZE: u32 = 8;

pub(crate) fn write_erf<W: Write>(erf: &Erf, output: &mut W) -> Result<()> {
    let count = erf.resources.len() as u32;
    let offset_to_keys = HEADER_SIZE;
    let offset_to_resources = offset_to_keys + KEY_SIZE * count;
    let offset_to_data = offset_to_resources + RESOURCE_ENTRY_SIZE * count;

    output.write_all(erf.erf_type.tag())?;
    output.write_all(&VERSION)?;
    output.write_u32::<LE>(0)?; // language count
    output.write_u32::<LE>(0)?; // localized string size
    output.write_u32::<LE>(count)?;
    output.write_u32::<LE>(offset_to_keys)?; // no localized strings
    output.write_u32::<LE>(offset_to_keys)?;
    output.write_u32::<LE>(offset_to_resources)?;
    output.write_u32::<LE>(0)?; // build year
    output.write_u32::<LE>(0)?; // build day
    output.write_u32::<LE>(0xFFFF_FFFF)?; // description strref
    output.write_all(&[0; 116])?;

    for (index, (ident, _)) in erf.resources.iter().enumerate() {
        output.write_fixed_str(&ident.resname, 16)?;
        output.write_u32::<LE>(index as u32)?;
        output.write_u16::<LE>(ident.restype.0)?;
        output.write_u16::<LE>(0)?;
    }

    let mut offset = offset_to_data;
    for (_, data) in &erf.resources {
        output.write_u32::<LE>(offset)?;
        output.write_u32::<LE>(data.len() as u32)?;
        offset += data.len() as u32;
    }

    for (_, data) in &erf.resources {
        output.write_all(data)?;
    }
    Ok(())
}
