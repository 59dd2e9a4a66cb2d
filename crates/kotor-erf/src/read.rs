use super::{Erf, ErfType, Error, ResourceIdentifier, ResourceType, Result};
use byteorder::{ReadBytesExt, LE};
use kotor_support::ReadStringsExt;
use std::io::{Read, Seek, SeekFrom};

pub(crate) const VERSION: [u8; 4] = *b"V1.0";

/// Archive header fields that locate the other sections.
#[derive(Debug)]
struct ErfHeader {
    erf_type: ErfType,
    entry_count: u32,
    offset_to_keys: u32,
    offset_to_resources: u32,
}

impl ErfHeader {
    fn from<R: Read>(source: &mut R) -> Result<Self> {
        let mut file_type = [0; 4];
        source.read_exact(&mut file_type)?;
        let erf_type = ErfType::from_tag(file_type)?;
        let mut version = [0; 4];
        source.read_exact(&mut version)?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let _language_count = source.read_u32::<LE>()?;
        let _localized_string_size = source.read_u32::<LE>()?;
        let entry_count = source.read_u32::<LE>()?;
        let _offset_to_localized_strings = source.read_u32::<LE>()?;
        let offset_to_keys = source.read_u32::<LE>()?;
        let offset_to_resources = source.read_u32::<LE>()?;
        Ok(Self {
            erf_type,
            entry_count,
            offset_to_keys,
            offset_to_resources,
        })
    }
}

pub(crate) fn read_erf<R: Read + Seek>(handle: &mut R) -> Result<Erf> {
    let header = ErfHeader::from(handle)?;

    handle.seek(SeekFrom::Start(header.offset_to_keys.into()))?;
    let mut keys = Vec::with_capacity(header.entry_count as usize);
    for _ in 0..header.entry_count {
        let resname = handle.read_fixed_str(16)?;
        let _resource_id = handle.read_u32::<LE>()?;
        let restype = ResourceType(handle.read_u16::<LE>()?);
        let _unused = handle.read_u16::<LE>()?;
        keys.push(ResourceIdentifier::new(&resname, restype));
    }

    handle.seek(SeekFrom::Start(header.offset_to_resources.into()))?;
    let mut locations = Vec::with_capacity(keys.len());
    for _ in 0..header.entry_count {
        let offset = handle.read_u32::<LE>()?;
        let size = handle.read_u32::<LE>()?;
        locations.push((offset, size));
    }

    let mut erf = Erf::new(header.erf_type);
    for (ident, (offset, size)) in keys.into_iter().zip(locations) {
        handle.seek(SeekFrom::Start(offset.into()))?;
        let mut data = vec![0; size as usize];
        handle.read_exact(&mut data)?;
        erf.resources.push((ident, data));
    }
    log::debug!("read {} resources from archive", erf.len());
    Ok(erf)
}
