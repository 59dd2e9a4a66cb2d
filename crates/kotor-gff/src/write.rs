use crate::read::{HEADER_SIZE, LABEL_SIZE, VERSION};
use crate::{Error, FieldValue, Gff, LocalizedString, Result, Struct};
use byteorder::{WriteBytesExt, LE};
use kotor_support::{encode_str, WriteStringsExt};
use std::io::Write;

/// Flattened sections of a GFF file, filled by walking the struct tree depth first.
#[derive(Debug, Default)]
struct GffWriter {
    structs: Vec<[u32; 3]>,
    fields: Vec<[u32; 3]>,
    labels: Vec<String>,
    field_data: Vec<u8>,
    field_indices: Vec<u8>,
    list_indices: Vec<u8>,
}

impl GffWriter {
    fn label_index(&mut self, label: &str) -> Result<u32> {
        if let Some(index) = self.labels.iter().position(|l| l == label) {
            return Ok(index as u32);
        }
        if encode_str(label)?.len() > LABEL_SIZE {
            return Err(Error::LabelTooLong(label.to_string()));
        }
        self.labels.push(label.to_string());
        Ok(self.labels.len() as u32 - 1)
    }

    fn add_struct(&mut self, gff_struct: &Struct) -> Result<u32> {
        let index = self.structs.len();
        self.structs.push([gff_struct.struct_id, 0, 0]);

        let field_indices = gff_struct
            .iter()
            .map(|(label, value)| self.add_field(label, value))
            .collect::<Result<Vec<_>>>()?;

        let data = match field_indices.len() {
            0 => 0xFFFF_FFFF,
            1 => field_indices[0],
            _ => {
                let offset = self.field_indices.len() as u32;
                for field_index in &field_indices {
                    self.field_indices.write_u32::<LE>(*field_index)?;
                }
                offset
            }
        };
        self.structs[index] = [gff_struct.struct_id, data, field_indices.len() as u32];
        Ok(index as u32)
    }

    fn add_field(&mut self, label: &str, value: &FieldValue) -> Result<u32> {
        let label_index = self.label_index(label)?;
        let index = self.fields.len();
        self.fields.push([value.field_type().into(), label_index, 0]);

        let data_offset = self.field_data.len() as u32;
        let data = match value {
            FieldValue::UInt8(n) => u32::from(*n),
            FieldValue::Int8(n) => u32::from(*n as u8),
            FieldValue::UInt16(n) => u32::from(*n),
            FieldValue::Int16(n) => u32::from(*n as u16),
            FieldValue::UInt32(n) => *n,
            FieldValue::Int32(n) => *n as u32,
            FieldValue::Single(n) => n.to_bits(),
            FieldValue::UInt64(n) => {
                self.field_data.write_u64::<LE>(*n)?;
                data_offset
            }
            FieldValue::Int64(n) => {
                self.field_data.write_i64::<LE>(*n)?;
                data_offset
            }
            FieldValue::Double(n) => {
                self.field_data.write_f64::<LE>(*n)?;
                data_offset
            }
            FieldValue::String(s) => {
                self.field_data.write_u32_length_prefixed_str(s)?;
                data_offset
            }
            FieldValue::ResRef(r) => {
                self.field_data.write_u8_length_prefixed_str(r.as_str())?;
                data_offset
            }
            FieldValue::LocalizedString(l) => {
                write_localized_string(&mut self.field_data, l)?;
                data_offset
            }
            FieldValue::Binary(bytes) => {
                self.field_data.write_u32::<LE>(bytes.len() as u32)?;
                self.field_data.write_all(bytes)?;
                data_offset
            }
            FieldValue::Vector4(v) => {
                for component in [v.x, v.y, v.z, v.w] {
                    self.field_data.write_f32::<LE>(component)?;
                }
                data_offset
            }
            FieldValue::Vector3(v) => {
                for component in [v.x, v.y, v.z] {
                    self.field_data.write_f32::<LE>(component)?;
                }
                data_offset
            }
            FieldValue::Struct(child) => self.add_struct(child)?,
            FieldValue::List(list) => {
                let struct_indices = list
                    .iter()
                    .map(|child| self.add_struct(child))
                    .collect::<Result<Vec<_>>>()?;
                let offset = self.list_indices.len() as u32;
                self.list_indices.write_u32::<LE>(struct_indices.len() as u32)?;
                for struct_index in struct_indices {
                    self.list_indices.write_u32::<LE>(struct_index)?;
                }
                offset
            }
        };
        self.fields[index][2] = data;
        Ok(index as u32)
    }
}

fn write_localized_string(output: &mut Vec<u8>, locstring: &LocalizedString) -> Result<()> {
    let mut body = vec![];
    body.write_u32::<LE>(locstring.stringref.raw())?;
    body.write_u32::<LE>(locstring.len() as u32)?;
    for (id, text) in locstring {
        body.write_u32::<LE>(id)?;
        body.write_u32_length_prefixed_str(text)?;
    }
    output.write_u32::<LE>(body.len() as u32)?;
    output.write_all(&body)?;
    Ok(())
}

pub(crate) fn write_gff(gff: &Gff, mut output: impl Write) -> Result<()> {
    let mut writer = GffWriter::default();
    writer.add_struct(&gff.root)?;

    let struct_offset = HEADER_SIZE;
    let field_offset = struct_offset + writer.structs.len() as u32 * 12;
    let label_offset = field_offset + writer.fields.len() as u32 * 12;
    let field_data_offset = label_offset + writer.labels.len() as u32 * LABEL_SIZE as u32;
    let field_indices_offset = field_data_offset + writer.field_data.len() as u32;
    let list_indices_offset = field_indices_offset + writer.field_indices.len() as u32;

    output.write_all(&gff.file_type)?;
    output.write_all(&VERSION)?;
    for value in [
        struct_offset,
        writer.structs.len() as u32,
        field_offset,
        writer.fields.len() as u32,
        label_offset,
        writer.labels.len() as u32,
        field_data_offset,
        writer.field_data.len() as u32,
        field_indices_offset,
        writer.field_indices.len() as u32,
        list_indices_offset,
        writer.list_indices.len() as u32,
    ] {
        output.write_u32::<LE>(value)?;
    }

    for entry in writer.structs.iter().chain(writer.fields.iter()) {
        for value in entry {
            output.write_u32::<LE>(*value)?;
        }
    }
    for label in &writer.labels {
        output.write_fixed_str(label, LABEL_SIZE)?;
    }
    output.write_all(&writer.field_data)?;
    output.write_all(&writer.field_indices)?;
    output.write_all(&writer.list_indices)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldType, Gender, Language, List, Vector3, Vector4};
    use kotor_support::ResRef;
    use std::io::Cursor;

    fn sample() -> Gff {
        let mut gff = Gff::new(*b"UTC ");
        gff.root.set("Byte", 200u8);
        gff.root.set("Char", -3i8);
        gff.root.set("Word", 60000u16);
        gff.root.set("Short", -1234i16);
        gff.root.set("DWORD", 3_000_000_000u32);
        gff.root.set("Int", -7i32);
        gff.root.set("DWORD64", u64::MAX);
        gff.root.set("Int64", i64::MIN);
        gff.root.set("Float", 1.5f32);
        gff.root.set("Double", -0.25f64);
        gff.root.set("Tag", "n_commoner");
        gff.root.set("Resref", ResRef::truncated("p_bastila"));
        let mut name = LocalizedString::new(12u32);
        name.set(Language::English, Gender::Male, "Bastila");
        name.set(Language::French, Gender::Female, "Bastila F");
        gff.root.set("FirstName", name);
        gff.root.set("Data", FieldValue::Binary(vec![1, 2, 3]));
        gff.root.set("Orientation", Vector4::new(0.0, 0.0, 0.7, 0.7));
        gff.root.set("Position", Vector3::new(1.0, 2.0, 3.0));
        let child = gff.root.set_struct("Child", Struct::new(5));
        child.set("Tag", "inner");
        let list = gff.root.set_list("List", List::new());
        list.add(0).set("SomeInteger", 123i32);
        list.add(1);
        list.add(2).set("Tag", "third");
        gff
    }

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let gff = sample();
        let bytes = gff.to_bytes()?;
        let again = Gff::read_from(Cursor::new(&bytes))?;
        assert_eq!(again, gff);
        assert_eq!(again.root.get("Byte").map(FieldValue::field_type), Some(FieldType::UInt8));
        Ok(())
    }

    #[test]
    fn labels_are_shared() -> anyhow::Result<()> {
        let gff = sample();
        let bytes = gff.to_bytes()?;
        let tag_labels = bytes
            .windows(16)
            .filter(|w| *w == &b"Tag\0\0\0\0\0\0\0\0\0\0\0\0\0"[..])
            .count();
        assert_eq!(tag_labels, 1);
        Ok(())
    }

    #[test]
    fn long_labels_are_rejected() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("ThisLabelIsTooLong", 1u8);
        assert!(matches!(gff.to_bytes(), Err(Error::LabelTooLong(_))));
    }
}
