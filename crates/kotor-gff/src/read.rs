use crate::{
    Error, FieldType, FieldValue, Gff, List, LocalizedString, Result, Struct, Vector3, Vector4,
};
use byteorder::{ReadBytesExt, LE};
use kotor_support::{ReadStringsExt, ResRef, StringRef};
use std::convert::TryFrom;
use std::io::{self, Cursor, Read};

pub(crate) const VERSION: [u8; 4] = *b"V3.2";
pub(crate) const HEADER_SIZE: u32 = 56;
pub(crate) const LABEL_SIZE: usize = 16;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Header {
    pub file_type: [u8; 4],
    pub struct_offset: u32,
    pub struct_count: u32,
    pub field_offset: u32,
    pub field_count: u32,
    pub label_offset: u32,
    pub label_count: u32,
    pub field_data_offset: u32,
    pub field_data_size: u32,
    pub field_indices_offset: u32,
    pub field_indices_size: u32,
    pub list_indices_offset: u32,
    pub list_indices_size: u32,
}

impl Header {
    fn read_from(mut input: impl Read) -> Result<Self> {
        let mut file_type = [0; 4];
        input.read_exact(&mut file_type)?;
        let mut version = [0; 4];
        input.read_exact(&mut version)?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self {
            file_type,
            struct_offset: input.read_u32::<LE>()?,
            struct_count: input.read_u32::<LE>()?,
            field_offset: input.read_u32::<LE>()?,
            field_count: input.read_u32::<LE>()?,
            label_offset: input.read_u32::<LE>()?,
            label_count: input.read_u32::<LE>()?,
            field_data_offset: input.read_u32::<LE>()?,
            field_data_size: input.read_u32::<LE>()?,
            field_indices_offset: input.read_u32::<LE>()?,
            field_indices_size: input.read_u32::<LE>()?,
            list_indices_offset: input.read_u32::<LE>()?,
            list_indices_size: input.read_u32::<LE>()?,
        })
    }
}

struct GffReader<'a> {
    data: &'a [u8],
    header: Header,
    labels: Vec<String>,
    /// Structs on the path from the root to the struct currently being read.
    visiting: Vec<bool>,
}

impl<'a> GffReader<'a> {
    /// A cursor at `base + index * size`. Positions past the end read as EOF.
    fn cursor_at(&self, base: u32, index: u32, size: u64) -> Cursor<&'a [u8]> {
        let mut cursor = Cursor::new(self.data);
        cursor.set_position(u64::from(base) + u64::from(index) * size);
        cursor
    }

    fn read_labels(&mut self) -> Result<()> {
        let mut cursor = self.cursor_at(self.header.label_offset, 0, 0);
        self.labels = (0..self.header.label_count)
            .map(|_| cursor.read_fixed_str(LABEL_SIZE))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(())
    }

    fn read_struct(&mut self, index: u32) -> Result<Struct> {
        if index >= self.header.struct_count {
            return Err(Error::StructIndex(index));
        }
        if self.visiting[index as usize] {
            return Err(Error::CyclicStruct(index));
        }
        self.visiting[index as usize] = true;

        let mut cursor = self.cursor_at(self.header.struct_offset, index, 12);
        let struct_id = cursor.read_u32::<LE>()?;
        let data = cursor.read_u32::<LE>()?;
        let field_count = cursor.read_u32::<LE>()?;

        let field_indices = match field_count {
            0 => vec![],
            1 => vec![data],
            _ => {
                let mut cursor = self.cursor_at(self.header.field_indices_offset, data, 1);
                (0..field_count)
                    .map(|_| cursor.read_u32::<LE>())
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        let mut result = Struct::new(struct_id);
        for field_index in field_indices {
            let (label, value) = self.read_field(field_index)?;
            result.set(label, value);
        }

        self.visiting[index as usize] = false;
        Ok(result)
    }

    fn read_field(&mut self, index: u32) -> Result<(String, FieldValue)> {
        if index >= self.header.field_count {
            return Err(Error::FieldIndex(index));
        }
        let mut cursor = self.cursor_at(self.header.field_offset, index, 12);
        let type_id = cursor.read_u32::<LE>()?;
        let label_index = cursor.read_u32::<LE>()?;
        let data = cursor.read_u32::<LE>()?;

        let field_type =
            FieldType::try_from(type_id).map_err(|_| Error::UnknownFieldType(type_id))?;
        let label = self
            .labels
            .get(label_index as usize)
            .cloned()
            .ok_or(Error::LabelIndex(label_index))?;

        let mut complex = self.cursor_at(self.header.field_data_offset, data, 1);
        let value = match field_type {
            FieldType::UInt8 => FieldValue::UInt8(data as u8),
            FieldType::Int8 => FieldValue::Int8(data as u8 as i8),
            FieldType::UInt16 => FieldValue::UInt16(data as u16),
            FieldType::Int16 => FieldValue::Int16(data as u16 as i16),
            FieldType::UInt32 => FieldValue::UInt32(data),
            FieldType::Int32 => FieldValue::Int32(data as i32),
            FieldType::Single => FieldValue::Single(f32::from_bits(data)),
            FieldType::UInt64 => FieldValue::UInt64(complex.read_u64::<LE>()?),
            FieldType::Int64 => FieldValue::Int64(complex.read_i64::<LE>()?),
            FieldType::Double => FieldValue::Double(complex.read_f64::<LE>()?),
            FieldType::String => FieldValue::String(complex.read_u32_length_prefixed_str()?),
            FieldType::ResRef => {
                let name = complex.read_u8_length_prefixed_str()?;
                FieldValue::ResRef(ResRef::truncated(&name))
            }
            FieldType::LocalizedString => {
                FieldValue::LocalizedString(read_localized_string(&mut complex)?)
            }
            FieldType::Binary => {
                let len = complex.read_u32::<LE>()?;
                let mut bytes = vec![];
                (&mut complex).take(len.into()).read_to_end(&mut bytes)?;
                if bytes.len() != len as usize {
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
                }
                FieldValue::Binary(bytes)
            }
            FieldType::Vector4 => FieldValue::Vector4(Vector4::new(
                complex.read_f32::<LE>()?,
                complex.read_f32::<LE>()?,
                complex.read_f32::<LE>()?,
                complex.read_f32::<LE>()?,
            )),
            FieldType::Vector3 => FieldValue::Vector3(Vector3::new(
                complex.read_f32::<LE>()?,
                complex.read_f32::<LE>()?,
                complex.read_f32::<LE>()?,
            )),
            FieldType::Struct => FieldValue::Struct(self.read_struct(data)?),
            FieldType::List => {
                let mut cursor = self.cursor_at(self.header.list_indices_offset, data, 1);
                let count = cursor.read_u32::<LE>()?;
                let indices = (0..count)
                    .map(|_| cursor.read_u32::<LE>())
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let mut list = List::new();
                for struct_index in indices {
                    list.push(self.read_struct(struct_index)?);
                }
                FieldValue::List(list)
            }
        };

        Ok((label, value))
    }
}

fn check_table(len: u64, offset: u32, count: u32, size: u64, name: &'static str) -> Result<()> {
    if u64::from(offset) + u64::from(count) * size > len {
        return Err(Error::TableOutOfBounds(name));
    }
    Ok(())
}

fn read_localized_string(input: &mut impl Read) -> Result<LocalizedString> {
    let _total_size = input.read_u32::<LE>()?;
    let stringref = StringRef::from(input.read_u32::<LE>()?);
    let count = input.read_u32::<LE>()?;
    let mut locstring = LocalizedString::new(stringref);
    for _ in 0..count {
        let id = input.read_u32::<LE>()?;
        let text = input.read_u32_length_prefixed_str()?;
        locstring.set_by_id(id, text);
    }
    Ok(locstring)
}

pub(crate) fn read_gff(mut input: impl Read) -> Result<Gff> {
    let mut data = vec![];
    input.read_to_end(&mut data)?;

    let header = Header::read_from(&data[..])?;
    let len = data.len() as u64;
    check_table(len, header.struct_offset, header.struct_count, 12, "struct")?;
    check_table(len, header.field_offset, header.field_count, 12, "field")?;
    check_table(len, header.label_offset, header.label_count, LABEL_SIZE as u64, "label")?;
    log::trace!(
        "reading GFF {:?}: {} structs, {} fields, {} labels",
        String::from_utf8_lossy(&header.file_type),
        header.struct_count,
        header.field_count,
        header.label_count
    );

    let mut reader = GffReader {
        data: &data,
        header,
        labels: vec![],
        visiting: vec![false; header.struct_count as usize],
    };
    reader.read_labels()?;
    let root = reader.read_struct(0)?;

    Ok(Gff {
        file_type: header.file_type,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header_bytes(struct_count: u32, field_count: u32, label_count: u32) -> Vec<u8> {
        let mut bytes = b"UTC V3.2".to_vec();
        let struct_offset = HEADER_SIZE;
        let field_offset = struct_offset + struct_count * 12;
        let label_offset = field_offset + field_count * 12;
        let field_data_offset = label_offset + label_count * 16;
        for value in [
            struct_offset,
            struct_count,
            field_offset,
            field_count,
            label_offset,
            label_count,
            field_data_offset,
            0,
            field_data_offset,
            0,
            field_data_offset,
            0,
        ] {
            bytes.write_u32::<LE>(value).unwrap();
        }
        bytes
    }

    #[test]
    fn rejects_other_versions() {
        let mut bytes = header_bytes(1, 0, 0);
        bytes[4..8].copy_from_slice(b"V4.0");
        assert!(matches!(
            read_gff(&bytes[..]),
            Err(Error::UnsupportedVersion(v)) if &v == b"V4.0"
        ));
    }

    #[test]
    fn reads_inline_fields() -> anyhow::Result<()> {
        let mut bytes = header_bytes(1, 1, 1);
        bytes.write_u32::<LE>(0xFFFF_FFFF)?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(1)?;
        bytes.write_u32::<LE>(FieldType::Int16.into())?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(0xFFFE)?;
        let mut label = b"Value".to_vec();
        label.resize(16, 0);
        bytes.extend_from_slice(&label);

        let gff = read_gff(&bytes[..])?;
        assert_eq!(&gff.file_type, b"UTC ");
        assert_eq!(gff.root.struct_id, 0xFFFF_FFFF);
        assert_eq!(gff.root.get_i16("Value"), Some(-2));
        assert_eq!(gff.root.len(), 1);
        Ok(())
    }

    #[test]
    fn rejects_unknown_field_type() -> anyhow::Result<()> {
        let mut bytes = header_bytes(1, 1, 1);
        bytes.write_u32::<LE>(0xFFFF_FFFF)?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(1)?;
        bytes.write_u32::<LE>(99)?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(0)?;
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(read_gff(&bytes[..]), Err(Error::UnknownFieldType(99))));
        Ok(())
    }

    #[test]
    fn rejects_cycles() -> anyhow::Result<()> {
        let mut bytes = header_bytes(1, 1, 1);
        bytes.write_u32::<LE>(0xFFFF_FFFF)?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(1)?;
        // a Struct field that points back at the root
        bytes.write_u32::<LE>(FieldType::Struct.into())?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(0)?;
        let mut label = b"Self".to_vec();
        label.resize(16, 0);
        bytes.extend_from_slice(&label);
        assert!(matches!(read_gff(&bytes[..]), Err(Error::CyclicStruct(0))));
        Ok(())
    }

    #[test]
    fn rejects_offsets_past_the_end() -> anyhow::Result<()> {
        let mut bytes = header_bytes(1, 2, 0);
        bytes.write_u32::<LE>(0xFFFF_FFFF)?;
        bytes.write_u32::<LE>(0xFFFF_FFF0)?;
        bytes.write_u32::<LE>(2)?;
        bytes.extend_from_slice(&[0; 24]);
        assert!(matches!(read_gff(&bytes[..]), Err(Error::IoError(_))));

        let mut bytes = header_bytes(1, 1, 1);
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            read_gff(&bytes[..]),
            Err(Error::TableOutOfBounds("struct"))
        ));
        Ok(())
    }

    #[test]
    fn rejects_oversized_binary() -> anyhow::Result<()> {
        let mut bytes = header_bytes(1, 1, 1);
        bytes.write_u32::<LE>(0xFFFF_FFFF)?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(1)?;
        bytes.write_u32::<LE>(FieldType::Binary.into())?;
        bytes.write_u32::<LE>(0)?;
        bytes.write_u32::<LE>(0)?;
        bytes.extend_from_slice(&[0; 16]);
        bytes.write_u32::<LE>(u32::MAX)?;
        bytes.extend_from_slice(b"abc");
        assert!(matches!(read_gff(&bytes[..]), Err(Error::IoError(_))));
        Ok(())
    }
}
