use super::format_text;
use crate::PatchLogger;
use kotor_gff::{FieldValue, Gff, List, Struct};

/// Compare two GFF trees from the root.
pub fn diff_gff(old: &Gff, new: &Gff, logger: &mut PatchLogger) -> bool {
    let mut same = true;
    if old.file_type != new.file_type {
        logger.add_note(format!(
            "GFF file type is different: '{}'-->'{}'",
            String::from_utf8_lossy(&old.file_type).trim_end(),
            String::from_utf8_lossy(&new.file_type).trim_end()
        ));
        same = false;
    }
    diff_struct(&old.root, &new.root, "GFFRoot", logger) && same
}

fn field_label(label: &str, index: usize) -> String {
    if label.is_empty() {
        format!("gffstruct({})", index)
    } else {
        label.to_string()
    }
}

fn find_field<'a>(fields: &[(String, &'a FieldValue)], label: &str) -> Option<&'a FieldValue> {
    fields
        .iter()
        .find(|(l, _)| l == label)
        .map(|(_, value)| *value)
}

/// Compare two structs at `path`.
///
/// Fields are matched by label. Nested structs and lists are compared recursively.
pub fn diff_struct(old: &Struct, new: &Struct, path: &str, logger: &mut PatchLogger) -> bool {
    let mut same = true;
    if old.len() != new.len() {
        logger.add_note(format!(
            "GFFStruct: number of fields have changed at '{}': '{}' --> '{}'",
            path,
            old.len(),
            new.len()
        ));
        same = false;
    }

    let old_fields: Vec<(String, &FieldValue)> = old
        .iter()
        .enumerate()
        .map(|(i, (label, value))| (field_label(label, i), value))
        .collect();
    let new_fields: Vec<(String, &FieldValue)> = new
        .iter()
        .enumerate()
        .map(|(i, (label, value))| (field_label(label, i), value))
        .collect();

    for (label, old_value) in &old_fields {
        let child_path = format!("{}\\{}", path, label);
        let new_value = match find_field(&new_fields, label) {
            Some(value) => value,
            None => {
                logger.add_note(format!(
                    "Missing '{}' field at '{}': {}",
                    old_value.field_type(),
                    child_path,
                    format_text(old_value)
                ));
                same = false;
                continue;
            }
        };
        if !diff_field(old_value, new_value, &child_path, logger) {
            same = false;
        }
    }

    for (label, new_value) in &new_fields {
        if find_field(&old_fields, label).is_none() {
            logger.add_note(format!(
                "Extra '{}' field found at '{}\\{}': {}",
                new_value.field_type(),
                path,
                label,
                format_text(new_value)
            ));
            same = false;
        }
    }

    same
}

fn diff_field(old: &FieldValue, new: &FieldValue, path: &str, logger: &mut PatchLogger) -> bool {
    if old.field_type() != new.field_type() {
        logger.add_note(format!(
            "Field type is different at '{}': '{}'-->'{}'",
            path,
            old.field_type(),
            new.field_type()
        ));
        return false;
    }
    match (old, new) {
        (FieldValue::Struct(old), FieldValue::Struct(new)) => {
            let mut same = true;
            if old.struct_id != new.struct_id {
                logger.add_note(format!(
                    "Struct ID is different at '{}': '{}'-->'{}'",
                    path, old.struct_id, new.struct_id
                ));
                same = false;
            }
            diff_struct(old, new, path, logger) && same
        }
        (FieldValue::List(old), FieldValue::List(new)) => diff_list(old, new, path, logger),
        (old, new) if old != new => {
            logger.add_note(format!(
                "Field '{}' is different at '{}': {}-vvv->{}",
                old.field_type(),
                path,
                format_text(old),
                format_text(new)
            ));
            false
        }
        _ => true,
    }
}

fn log_contents(heading: &str, child: &Struct, logger: &mut PatchLogger) {
    logger.add_note(heading);
    for (label, value) in child {
        logger.add_note(format!(
            "{} {}: {}",
            value.field_type(),
            label,
            format_text(value)
        ));
    }
}

/// Compare two lists at `path`, element by element in list order.
///
/// Elements are paired by position, so a reordered list differs even when it holds the same
/// structs.
pub fn diff_list(old: &List, new: &List, path: &str, logger: &mut PatchLogger) -> bool {
    let mut same = true;
    if old.len() != new.len() {
        logger.add_note(format!(
            "GFFList counts have changed at '{}': '{}' --> '{}'",
            path,
            old.len(),
            new.len()
        ));
        same = false;
    }

    for (index, old_child) in old.iter().enumerate() {
        let child_path = format!("{}\\{}", path, index);
        match new.get(index) {
            Some(new_child) => {
                if old_child.struct_id != new_child.struct_id {
                    logger.add_note(format!(
                        "Struct ID is different at '{}': '{}'-->'{}'",
                        child_path, old_child.struct_id, new_child.struct_id
                    ));
                    same = false;
                }
                if !diff_struct(old_child, new_child, &child_path, logger) {
                    same = false;
                }
            }
            None => {
                logger.add_note(format!(
                    "Missing GFFStruct at '{}' with struct ID '{}'",
                    child_path, old_child.struct_id
                ));
                log_contents("Contents of old struct:", old_child, logger);
                same = false;
            }
        }
    }
    for (index, new_child) in new.iter().enumerate().skip(old.len()) {
        logger.add_note(format!(
            "Extra GFFStruct at '{}\\{}' with struct ID '{}'",
            path, index, new_child.struct_id
        ));
        log_contents("Contents of new struct:", new_child, logger);
        same = false;
    }

    same
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Gff {
        let mut gff = Gff::new(*b"UTC ");
        gff.root.set("Tag", "bastila");
        gff.root.set("Appearance", 4u16);
        let list = gff.root.set_list("ItemList", List::new());
        list.add(0).set("InventoryRes", "g_w_lghtsbr01");
        list.add(1).set("InventoryRes", "g_a_clothes01");
        gff
    }

    #[test]
    fn identical_trees() {
        let mut logger = PatchLogger::new();
        assert!(diff_gff(&tree(), &tree(), &mut logger));
        assert_eq!(logger.notes().count(), 0);
    }

    #[test]
    fn extra_field() {
        let mut new = tree();
        new.root.set("Extra", 1u8);
        let mut logger = PatchLogger::new();
        assert!(!diff_gff(&tree(), &new, &mut logger));
        assert!(logger
            .notes()
            .any(|n| n == "Extra 'Byte' field found at 'GFFRoot\\Extra': '1'"));
    }

    #[test]
    fn changed_and_missing_fields() {
        let mut new = tree();
        new.root.set("Appearance", 5u16);
        new.root.remove("Tag");
        let mut logger = PatchLogger::new();
        assert!(!diff_gff(&tree(), &new, &mut logger));
        let notes: Vec<&str> = logger.notes().collect();
        assert!(notes.contains(&"Missing 'ExoString' field at 'GFFRoot\\Tag': 'bastila'"));
        assert!(notes.contains(&"Field 'Word' is different at 'GFFRoot\\Appearance': '4'-vvv->'5'"));
    }

    #[test]
    fn type_change() {
        let mut new = tree();
        new.root.set("Appearance", 4u32);
        let mut logger = PatchLogger::new();
        assert!(!diff_gff(&tree(), &new, &mut logger));
        assert!(logger
            .notes()
            .any(|n| n == "Field type is different at 'GFFRoot\\Appearance': 'Word'-->'DWORD'"));
    }

    #[test]
    fn list_positions() {
        let old = tree();
        let mut new = Gff::new(*b"UTC ");
        new.root.set("Tag", "bastila");
        new.root.set("Appearance", 4u16);
        let list = new.root.set_list("ItemList", List::new());
        list.add(1).set("InventoryRes", "g_a_clothes01");
        list.add(0).set("InventoryRes", "g_w_lghtsbr01");
        list.add(2);

        let mut logger = PatchLogger::new();
        assert!(!diff_gff(&old, &new, &mut logger));
        let notes: Vec<&str> = logger.notes().collect();
        assert!(notes.contains(&"GFFList counts have changed at 'GFFRoot\\ItemList': '2' --> '3'"));
        assert!(notes.contains(&"Struct ID is different at 'GFFRoot\\ItemList\\0': '0'-->'1'"));
        assert!(notes.contains(&"Extra GFFStruct at 'GFFRoot\\ItemList\\2' with struct ID '2'"));
    }
}
