//! Patching of GFF trees.
//!
//! Instructions address fields with backslash (or slash) separated paths from the root
//! struct. A path step is a field label when the current container is a struct, and a decimal
//! index when it is a list.

use crate::{PatchError, PatchLogger, PatcherMemory, Result, TokenId};
use kotor_gff::{
    substring_id, FieldType, FieldValue, Gender, Gff, Language, List, LocalizedString, Struct,
    Vector3, Vector4,
};
use kotor_support::{ResRef, StringRef};

/// Where the value written into a field comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// A literal value, converted to the field's type when applied.
    Constant(FieldValue),
    /// The text stored in a `2DAMEMORY` token.
    Memory2DA(TokenId),
    /// The talk table index stored in a `StrRef` token.
    MemoryStr(TokenId),
    /// Changes to merge into a localized string.
    LocalizedString(LocalizedStringDelta),
}

impl FieldSource {
    /// Resolve the value and convert it to `field_type`.
    pub fn resolve(&self, memory: &PatcherMemory, field_type: FieldType) -> Result<FieldValue> {
        match self {
            FieldSource::Constant(value) => coerce(value.clone(), field_type),
            FieldSource::Memory2DA(token) => coerce(
                FieldValue::String(memory.get_2da(*token)?.to_string()),
                field_type,
            ),
            FieldSource::MemoryStr(token) => {
                coerce(FieldValue::UInt32(memory.get_str(*token)?), field_type)
            }
            FieldSource::LocalizedString(delta) => {
                if field_type != FieldType::LocalizedString {
                    return Err(PatchError::TypeMismatch {
                        value: "localized string".to_string(),
                        expected: field_type,
                    });
                }
                let mut locstring = LocalizedString::default();
                delta.apply(&mut locstring, memory)?;
                Ok(FieldValue::LocalizedString(locstring))
            }
        }
    }
}

macro_rules! constant_source_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldSource {
                fn from(value: $ty) -> Self {
                    FieldSource::Constant(value.into())
                }
            }
        )*
    };
}

constant_source_from!(
    FieldValue, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, String, &str, ResRef,
    LocalizedString, Struct, List, Vector3, Vector4
);

/// Changes to a localized string: an optional new string reference, plus substrings to set.
///
/// Substrings that the delta does not mention are left alone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LocalizedStringDelta {
    /// The new talk table reference, if it should change.
    pub stringref: Option<Box<FieldSource>>,
    substrings: Vec<(u32, String)>,
}

impl LocalizedStringDelta {
    /// Create a delta that optionally changes the string reference.
    pub fn new(stringref: Option<FieldSource>) -> Self {
        Self {
            stringref: stringref.map(Box::new),
            substrings: vec![],
        }
    }

    /// Set the text for a language and gender.
    pub fn set(&mut self, language: Language, gender: Gender, text: impl Into<String>) {
        self.set_by_id(substring_id(language, gender), text);
    }

    /// Set the text for a raw substring ID.
    pub fn set_by_id(&mut self, id: u32, text: impl Into<String>) {
        let text = text.into();
        match self.substrings.iter_mut().find(|(i, _)| *i == id) {
            Some((_, existing)) => *existing = text,
            None => self.substrings.push((id, text)),
        }
    }

    /// Merge this delta into `locstring`.
    pub fn apply(&self, locstring: &mut LocalizedString, memory: &PatcherMemory) -> Result<()> {
        if let Some(source) = &self.stringref {
            if let FieldValue::LocalizedString(resolved) =
                source.resolve(memory, FieldType::LocalizedString)?
            {
                locstring.stringref = resolved.stringref;
            }
        }
        for (id, text) in &self.substrings {
            locstring.set_by_id(*id, text.clone());
        }
        Ok(())
    }
}

fn mismatch(value: &FieldValue, expected: FieldType) -> PatchError {
    PatchError::TypeMismatch {
        value: value.to_string(),
        expected,
    }
}

fn integer_field(n: i128, field_type: FieldType) -> Option<FieldValue> {
    Some(match field_type {
        FieldType::UInt8 => FieldValue::UInt8(u8::try_from(n).ok()?),
        FieldType::Int8 => FieldValue::Int8(i8::try_from(n).ok()?),
        FieldType::UInt16 => FieldValue::UInt16(u16::try_from(n).ok()?),
        FieldType::Int16 => FieldValue::Int16(i16::try_from(n).ok()?),
        FieldType::UInt32 => FieldValue::UInt32(u32::try_from(n).ok()?),
        FieldType::Int32 => FieldValue::Int32(i32::try_from(n).ok()?),
        FieldType::UInt64 => FieldValue::UInt64(u64::try_from(n).ok()?),
        FieldType::Int64 => FieldValue::Int64(i64::try_from(n).ok()?),
        _ => return None,
    })
}

fn stringref_from(n: i128) -> Option<StringRef> {
    if n == -1 {
        Some(StringRef::NONE)
    } else {
        u32::try_from(n).ok().map(StringRef::from)
    }
}

/// Convert a value to the given field type.
///
/// Text is parsed without regard to locale, integers are range checked, and resource names
/// that do not fit are rejected rather than truncated.
pub fn coerce(value: FieldValue, field_type: FieldType) -> Result<FieldValue> {
    if value.field_type() == field_type {
        return Ok(value);
    }
    let converted = match (&value, field_type) {
        (_, t) if t.is_integer() => match &value {
            FieldValue::String(text) => text
                .trim()
                .parse::<i128>()
                .ok()
                .and_then(|n| integer_field(n, t)),
            other => other.as_integer().and_then(|n| integer_field(n, t)),
        },
        (_, t) if t.is_float() => {
            let n = match &value {
                FieldValue::String(text) => text.trim().parse::<f64>().ok(),
                other => other
                    .as_float()
                    .or_else(|| other.as_integer().map(|n| n as f64)),
            };
            n.map(|n| match t {
                FieldType::Single => FieldValue::Single(n as f32),
                _ => FieldValue::Double(n),
            })
        }
        (FieldValue::String(text), FieldType::ResRef) => ResRef::new(text.as_str())
            .ok()
            .map(FieldValue::ResRef),
        (other, FieldType::ResRef) if other.as_integer().is_some() => {
            ResRef::new(other.to_string()).ok().map(FieldValue::ResRef)
        }
        (other, FieldType::String) => match other {
            FieldValue::Struct(_)
            | FieldValue::List(_)
            | FieldValue::Binary(_)
            | FieldValue::LocalizedString(_) => None,
            other => Some(FieldValue::String(other.to_string())),
        },
        (FieldValue::String(text), FieldType::LocalizedString) => text
            .trim()
            .parse::<i128>()
            .ok()
            .and_then(stringref_from)
            .map(|r| FieldValue::LocalizedString(LocalizedString::new(r))),
        (other, FieldType::LocalizedString) => other
            .as_integer()
            .and_then(stringref_from)
            .map(|r| FieldValue::LocalizedString(LocalizedString::new(r))),
        (FieldValue::String(text), FieldType::Vector3) => {
            text.parse::<Vector3>().ok().map(FieldValue::Vector3)
        }
        (FieldValue::String(text), FieldType::Vector4) => {
            text.parse::<Vector4>().ok().map(FieldValue::Vector4)
        }
        _ => None,
    };
    converted.ok_or_else(|| mismatch(&value, field_type))
}

/// A mutable position in a GFF tree.
#[derive(Debug)]
pub enum Container<'a> {
    /// A struct, whose children are addressed by label.
    Struct(&'a mut Struct),
    /// A list, whose children are addressed by index.
    List(&'a mut List),
}

fn path_steps(path: &str) -> impl Iterator<Item = &str> {
    path.split(|c| c == '\\' || c == '/')
        .filter(|step| !step.is_empty())
}

/// Follow `path` from `container`. Returns `None` if a step does not exist, or does not lead
/// to a struct or list.
pub fn navigate<'a>(container: Container<'a>, path: &str) -> Option<Container<'a>> {
    let mut container = container;
    for step in path_steps(path) {
        container = match container {
            Container::Struct(parent) => match parent.get_mut(step)? {
                FieldValue::Struct(child) => Container::Struct(child),
                FieldValue::List(list) => Container::List(list),
                _ => return None,
            },
            Container::List(list) => {
                let index = step.parse::<usize>().ok()?;
                Container::Struct(list.get_mut(index)?)
            }
        };
    }
    Some(container)
}

/// Split a field path into the path of its parent and its label.
fn split_label(path: &str) -> (String, &str) {
    let steps: Vec<&str> = path_steps(path).collect();
    match steps.split_last() {
        Some((label, parent)) => (parent.join("\\"), label),
        None => (String::new(), ""),
    }
}

/// Add a field to the container at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct AddField {
    /// Path of the struct (or list, for new struct fields) to add to.
    pub path: String,
    /// Label of the new field.
    pub label: String,
    /// Type of the new field.
    pub field_type: FieldType,
    /// The new field's value.
    pub value: FieldSource,
    /// Instructions applied to the new struct or list.
    pub modifiers: Vec<GffModifier>,
    /// Token that receives the list index of a struct appended to a list.
    pub index_to_token: Option<TokenId>,
}

impl AddField {
    /// Create an instruction that adds a field to the container at `path`.
    pub fn new(
        path: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
        value: impl Into<FieldSource>,
    ) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            field_type,
            value: value.into(),
            modifiers: vec![],
            index_to_token: None,
        }
    }

    /// Add a sub-instruction applied to the newly created container.
    pub fn with_modifier(mut self, modifier: impl Into<GffModifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    fn apply(
        &self,
        container: Container<'_>,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let container = match navigate(container, &self.path) {
            Some(container) => container,
            None => {
                logger.add_warning(format!(
                    "Parent field at '{}' does not exist or is not a List or Struct. Unable to add new Field '{}'...",
                    self.path, self.label
                ));
                return Ok(());
            }
        };

        let value = self.value.resolve(memory, self.field_type)?;
        let created = match (container, value) {
            (Container::Struct(parent), FieldValue::Struct(child)) => {
                Container::Struct(parent.set_struct(self.label.as_str(), child))
            }
            (Container::Struct(parent), FieldValue::List(list)) => {
                Container::List(parent.set_list(self.label.as_str(), list))
            }
            (Container::Struct(parent), value) => {
                logger.add_verbose(format!("Adding field '{}' = {}", self.label, value));
                parent.set(self.label.as_str(), value);
                return Ok(());
            }
            (Container::List(list), FieldValue::Struct(child)) => {
                let index = list.len();
                if let Some(token) = self.index_to_token {
                    memory.set_2da(token, index.to_string());
                }
                Container::Struct(list.push(child))
            }
            (Container::List(_), _) => {
                logger.add_warning(format!(
                    "Cannot add '{}' field '{}' to the list at '{}', lists only hold structs",
                    self.field_type, self.label, self.path
                ));
                return Ok(());
            }
        };

        apply_all(&self.modifiers, created, memory, logger)
    }
}

/// Append a struct to the list at `path`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AddStructToList {
    /// Path of the list.
    pub path: String,
    /// Struct ID of the new struct. Defaults to the struct's index in the list.
    pub struct_id: Option<u32>,
    /// Token that receives the index of the new struct.
    pub index_to_token: Option<TokenId>,
    /// Label used when `path` leads to a struct instead of a list.
    pub label: String,
    /// Instructions applied to the new struct.
    pub modifiers: Vec<GffModifier>,
}

impl AddStructToList {
    /// Create an instruction that appends a struct to the list at `path`.
    pub fn new(path: impl Into<String>, struct_id: Option<u32>) -> Self {
        Self {
            path: path.into(),
            struct_id,
            ..Self::default()
        }
    }

    /// Record the index of the new struct in a `2DAMEMORY` token.
    pub fn with_index_token(mut self, token: TokenId) -> Self {
        self.index_to_token = Some(token);
        self
    }

    /// Add a sub-instruction applied to the new struct.
    pub fn with_modifier(mut self, modifier: impl Into<GffModifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    fn apply(
        &self,
        container: Container<'_>,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let new_struct = match navigate(container, &self.path) {
            Some(Container::List(list)) => {
                let index = list.len();
                let struct_id = self.struct_id.unwrap_or(index as u32);
                if let Some(token) = self.index_to_token {
                    memory.set_2da(token, index.to_string());
                }
                list.add(struct_id)
            }
            Some(Container::Struct(parent)) if !self.label.is_empty() => parent.set_struct(
                self.label.as_str(),
                Struct::new(self.struct_id.unwrap_or(0)),
            ),
            _ => {
                logger.add_error(format!(
                    "Failed to add a new struct with struct_id '{}' at '{}'. Aborting.",
                    self.struct_id
                        .map_or_else(|| "auto".to_string(), |id| id.to_string()),
                    self.path
                ));
                return Ok(());
            }
        };

        apply_all(&self.modifiers, Container::Struct(new_struct), memory, logger)
    }
}

/// Change the value of an existing field.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyField {
    /// Path of the field, including its label.
    pub path: String,
    /// The new value.
    pub value: FieldSource,
}

impl ModifyField {
    /// Create an instruction that changes the field at `path`.
    pub fn new(path: impl Into<String>, value: impl Into<FieldSource>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    fn apply(
        &self,
        container: Container<'_>,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        let (parent_path, label) = split_label(&self.path);
        let field = match navigate(container, &parent_path) {
            Some(Container::Struct(parent)) => parent.get_mut(label),
            _ => None,
        };
        let field = match field {
            Some(field) => field,
            None => {
                logger.add_warning(format!(
                    "Unable to find a field label matching '{}', skipping...",
                    self.path
                ));
                return Ok(());
            }
        };

        let field_type = field.field_type();
        match (field, &self.value) {
            (FieldValue::LocalizedString(existing), FieldSource::LocalizedString(delta)) => {
                delta.apply(existing, memory)?;
            }
            (FieldValue::LocalizedString(existing), source) => {
                if let FieldValue::LocalizedString(new) = source.resolve(memory, field_type)? {
                    existing.stringref = new.stringref;
                    for (id, text) in &new {
                        existing.set_by_id(id, text);
                    }
                }
            }
            (field, source) => {
                *field = source.resolve(memory, field_type)?;
            }
        }
        logger.add_verbose(format!("Modified field '{}'", self.path));
        Ok(())
    }
}

/// A GFF patch instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum GffModifier {
    /// Add a field.
    AddField(AddField),
    /// Append a struct to a list.
    AddStructToList(AddStructToList),
    /// Change an existing field.
    ModifyField(ModifyField),
}

impl GffModifier {
    /// Apply this instruction, starting path navigation at `container`.
    pub fn apply(
        &self,
        container: Container<'_>,
        memory: &mut PatcherMemory,
        logger: &mut PatchLogger,
    ) -> Result<()> {
        match self {
            GffModifier::AddField(modifier) => modifier.apply(container, memory, logger),
            GffModifier::AddStructToList(modifier) => modifier.apply(container, memory, logger),
            GffModifier::ModifyField(modifier) => modifier.apply(container, memory, logger),
        }
    }
}

impl From<AddField> for GffModifier {
    fn from(modifier: AddField) -> Self {
        GffModifier::AddField(modifier)
    }
}

impl From<AddStructToList> for GffModifier {
    fn from(modifier: AddStructToList) -> Self {
        GffModifier::AddStructToList(modifier)
    }
}

impl From<ModifyField> for GffModifier {
    fn from(modifier: ModifyField) -> Self {
        GffModifier::ModifyField(modifier)
    }
}

fn apply_all(
    modifiers: &[GffModifier],
    container: Container<'_>,
    memory: &mut PatcherMemory,
    logger: &mut PatchLogger,
) -> Result<()> {
    match container {
        Container::Struct(target) => {
            for modifier in modifiers {
                modifier.apply(Container::Struct(&mut *target), memory, logger)?;
            }
        }
        Container::List(target) => {
            for modifier in modifiers {
                modifier.apply(Container::List(&mut *target), memory, logger)?;
            }
        }
    }
    Ok(())
}

/// The instructions for one GFF resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationsGff {
    /// Where the resource is read from and written to.
    pub target: super::PatchTarget,
    /// Instructions, applied in order.
    pub modifiers: Vec<GffModifier>,
}

impl ModificationsGff {
    /// Create an empty set of instructions for a resource.
    pub fn new(target: super::PatchTarget) -> Self {
        Self {
            target,
            modifiers: vec![],
        }
    }

    /// Apply every instruction to the tree.
    ///
    /// An instruction that fails is logged as an error and skipped; the remaining
    /// instructions still run.
    pub fn apply(&self, gff: &mut Gff, memory: &mut PatcherMemory, logger: &mut PatchLogger) {
        for modifier in &self.modifiers {
            if let Err(err) = modifier.apply(Container::Struct(&mut gff.root), memory, logger) {
                logger.add_error(format!("{}: {}", self.target.saveas, err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::PatchTarget;

    fn apply(gff: &mut Gff, memory: &mut PatcherMemory, modifiers: Vec<GffModifier>) -> PatchLogger {
        let mut logger = PatchLogger::new();
        let mut patch = ModificationsGff::new(PatchTarget::new("test.utc"));
        patch.modifiers = modifiers;
        patch.apply(gff, memory, &mut logger);
        logger
    }

    #[test]
    fn coerce_rules() {
        assert_eq!(
            coerce("123".into(), FieldType::UInt8).unwrap(),
            FieldValue::UInt8(123)
        );
        assert!(coerce("300".into(), FieldType::UInt8).is_err());
        assert!(coerce(FieldValue::Int32(-1), FieldType::UInt32).is_err());
        assert_eq!(
            coerce(FieldValue::Int32(7), FieldType::Single).unwrap(),
            FieldValue::Single(7.0)
        );
        assert_eq!(
            coerce(FieldValue::UInt32(5), FieldType::String).unwrap(),
            FieldValue::String("5".to_string())
        );
        assert!(matches!(
            coerce("far_too_long_resource_name".into(), FieldType::ResRef),
            Err(PatchError::TypeMismatch { expected: FieldType::ResRef, .. })
        ));
        assert_eq!(
            coerce("1|2|3".into(), FieldType::Vector3).unwrap(),
            FieldValue::Vector3(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            coerce("1.5".into(), FieldType::Double).unwrap(),
            FieldValue::Double(1.5)
        );
        assert!(coerce("1,5".into(), FieldType::Double).is_err());
    }

    #[test]
    fn navigate_paths() {
        let mut root = Struct::new(0);
        root.set_list("List", List::new()).add(0).set("String", "");
        assert!(matches!(
            navigate(Container::Struct(&mut root), "List\\0"),
            Some(Container::Struct(_))
        ));
        assert!(matches!(
            navigate(Container::Struct(&mut root), "List/0"),
            Some(Container::Struct(_))
        ));
        assert!(navigate(Container::Struct(&mut root), "List\\1").is_none());
        assert!(navigate(Container::Struct(&mut root), "List\\0\\String").is_none());
        assert!(navigate(Container::Struct(&mut root), "Missing").is_none());
    }

    #[test]
    fn modify_field_uses_existing_type() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("Int16", 0i16);
        gff.root.set("Double", 0f64);
        gff.root.set("Resref", ResRef::blank());
        let mut memory = PatcherMemory::new();
        apply(
            &mut gff,
            &mut memory,
            vec![
                ModifyField::new("Int16", FieldValue::Int32(-5)).into(),
                ModifyField::new("Double", "2.5").into(),
                ModifyField::new("Resref", "p_bastila").into(),
            ],
        );
        assert_eq!(gff.root.get_i16("Int16"), Some(-5));
        assert_eq!(gff.root.get_double("Double"), Some(2.5));
        assert_eq!(
            gff.root.get_resref("Resref").map(String::from),
            Some("p_bastila".to_string())
        );
    }

    #[test]
    fn modify_nested() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set_list("List", List::new()).add(0).set("String", "");
        let mut memory = PatcherMemory::new();
        apply(
            &mut gff,
            &mut memory,
            vec![ModifyField::new("List\\0\\String", "abc").into()],
        );
        let nested = gff.root.get_list("List").and_then(|l| l.get(0));
        assert_eq!(nested.and_then(|s| s.get_string("String")), Some("abc".into()));
    }

    #[test]
    fn modify_from_memory() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("String", "");
        gff.root.set("Integer", 0u8);
        let mut memory = PatcherMemory::new();
        memory.set_2da(5, "123");
        memory.set_str(6, 45);
        apply(
            &mut gff,
            &mut memory,
            vec![
                ModifyField::new("String", FieldSource::Memory2DA(5)).into(),
                ModifyField::new("Integer", FieldSource::MemoryStr(6)).into(),
            ],
        );
        assert_eq!(gff.root.get_string("String"), Some("123".into()));
        assert_eq!(gff.root.get_u8("Integer"), Some(45));
    }

    #[test]
    fn modify_missing_field_warns() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("Other", 1u8);
        let mut memory = PatcherMemory::new();
        let logger = apply(
            &mut gff,
            &mut memory,
            vec![
                ModifyField::new("Missing\\Field", 1u8).into(),
                ModifyField::new("Other", 2u8).into(),
            ],
        );
        assert_eq!(logger.warnings().count(), 1);
        assert_eq!(gff.root.get_u8("Other"), Some(2));
    }

    #[test]
    fn missing_token_fails_only_that_instruction() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("A", 0u8);
        gff.root.set("B", 0u8);
        let mut memory = PatcherMemory::new();
        let logger = apply(
            &mut gff,
            &mut memory,
            vec![
                ModifyField::new("A", FieldSource::Memory2DA(9)).into(),
                ModifyField::new("B", 3u8).into(),
            ],
        );
        assert_eq!(logger.errors().count(), 1);
        assert_eq!(gff.root.get_u8("A"), Some(0));
        assert_eq!(gff.root.get_u8("B"), Some(3));
    }

    #[test]
    fn modify_locstring_merges() {
        let mut gff = Gff::new(*b"GFF ");
        let mut original = LocalizedString::new(0u32);
        original.set(Language::English, Gender::Male, "a");
        original.set(Language::French, Gender::Male, "b");
        gff.root.set("Name", original);

        let mut delta = LocalizedStringDelta::new(Some(1u32.into()));
        delta.set(Language::English, Gender::Male, "1");
        delta.set(Language::German, Gender::Male, "2");

        let mut memory = PatcherMemory::new();
        apply(
            &mut gff,
            &mut memory,
            vec![ModifyField::new("Name", FieldSource::LocalizedString(delta)).into()],
        );

        let name = gff.root.get_locstring("Name").unwrap();
        assert_eq!(name.stringref, StringRef::from(1u32));
        assert_eq!(name.len(), 3);
        assert_eq!(name.get(Language::English, Gender::Male), Some("1"));
        assert_eq!(name.get(Language::German, Gender::Male), Some("2"));
        assert_eq!(name.get(Language::French, Gender::Male), Some("b"));
    }

    #[test]
    fn modify_locstring_from_token_sets_stringref() {
        let mut gff = Gff::new(*b"GFF ");
        let mut original = LocalizedString::new(0u32);
        original.set(Language::English, Gender::Male, "keep");
        gff.root.set("Name", original);
        let mut memory = PatcherMemory::new();
        memory.set_str(2, 77);
        apply(
            &mut gff,
            &mut memory,
            vec![ModifyField::new("Name", FieldSource::MemoryStr(2)).into()],
        );
        let name = gff.root.get_locstring("Name").unwrap();
        assert_eq!(name.stringref, StringRef::from(77u32));
        assert_eq!(name.get(Language::English, Gender::Male), Some("keep"));
    }

    #[test]
    fn add_nested_list() {
        let mut gff = Gff::new(*b"GFF ");
        let mut memory = PatcherMemory::new();
        let add = AddField::new("", "List", FieldType::List, List::new()).with_modifier(
            AddStructToList::new("", Some(0)).with_modifier(AddField::new(
                "",
                "SomeInteger",
                FieldType::UInt8,
                123u8,
            )),
        );
        apply(&mut gff, &mut memory, vec![add.into()]);

        let first = gff.root.get_list("List").and_then(|l| l.get(0));
        assert_eq!(first.map(|s| s.struct_id), Some(0));
        assert_eq!(first.and_then(|s| s.get_u8("SomeInteger")), Some(123));
    }

    #[test]
    fn add_field_into_list_element() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set_list("List", List::new()).add(0);
        let mut memory = PatcherMemory::new();
        apply(
            &mut gff,
            &mut memory,
            vec![AddField::new("List\\0", "String", FieldType::String, "abc").into()],
        );
        let first = gff.root.get_list("List").and_then(|l| l.get(0));
        assert_eq!(first.and_then(|s| s.get_string("String")), Some("abc".into()));
    }

    #[test]
    fn add_field_from_memory() {
        let mut gff = Gff::new(*b"GFF ");
        let mut memory = PatcherMemory::new();
        memory.set_2da(5, "123");
        memory.set_str(5, 123);
        apply(
            &mut gff,
            &mut memory,
            vec![
                AddField::new("", "String", FieldType::String, FieldSource::Memory2DA(5)).into(),
                AddField::new("", "Integer", FieldType::UInt8, FieldSource::MemoryStr(5)).into(),
            ],
        );
        assert_eq!(gff.root.get_string("String"), Some("123".into()));
        assert_eq!(gff.root.get_u8("Integer"), Some(123));
    }

    #[test]
    fn add_locstring_from_delta() {
        let mut gff = Gff::new(*b"GFF ");
        let mut memory = PatcherMemory::new();
        memory.set_2da(5, "123");
        apply(
            &mut gff,
            &mut memory,
            vec![AddField::new(
                "",
                "Field1",
                FieldType::LocalizedString,
                FieldSource::LocalizedString(LocalizedStringDelta::new(Some(
                    FieldSource::Memory2DA(5),
                ))),
            )
            .into()],
        );
        assert_eq!(
            gff.root.get_locstring("Field1").map(|l| l.stringref),
            Some(StringRef::from(123u32))
        );
    }

    #[test]
    fn add_to_missing_container_warns() {
        let mut gff = Gff::new(*b"GFF ");
        let mut memory = PatcherMemory::new();
        let logger = apply(
            &mut gff,
            &mut memory,
            vec![AddField::new("Nowhere", "Field", FieldType::UInt8, 1u8).into()],
        );
        assert_eq!(logger.warnings().count(), 1);
        assert!(gff.root.is_empty());
    }

    #[test]
    fn add_struct_into_list_records_index() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set_list("List", List::new());
        let mut memory = PatcherMemory::new();
        let mut add = AddField::new("List", "", FieldType::Struct, Struct::new(9));
        add.index_to_token = Some(3);
        apply(&mut gff, &mut memory, vec![add.clone().into(), add.into()]);
        assert_eq!(gff.root.get_list("List").map(List::len), Some(2));
        assert_eq!(memory.get_2da(3).unwrap(), "1");
    }

    #[test]
    fn add_struct_to_list_ids() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set_list("List", List::new());
        let mut memory = PatcherMemory::new();
        let add = AddStructToList::new("List", None);
        apply(
            &mut gff,
            &mut memory,
            vec![add.clone().into(), add.clone().into(), add.into()],
        );
        let ids: Vec<u32> = gff
            .root
            .get_list("List")
            .map(|l| l.iter().map(|s| s.struct_id).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn add_struct_to_list_stores_index() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set_list("List", List::new());
        let mut memory = PatcherMemory::new();
        apply(
            &mut gff,
            &mut memory,
            vec![
                AddStructToList::new("List", Some(0)).into(),
                AddStructToList::new("List", Some(0))
                    .with_index_token(12)
                    .into(),
            ],
        );
        assert_eq!(memory.get_2da(12).unwrap(), "1");
    }

    #[test]
    fn add_struct_to_non_container_is_an_error() {
        let mut gff = Gff::new(*b"GFF ");
        gff.root.set("Value", 1u8);
        let mut memory = PatcherMemory::new();
        let logger = apply(
            &mut gff,
            &mut memory,
            vec![AddStructToList::new("Value", Some(0))
                .with_modifier(AddField::new("", "Child", FieldType::UInt8, 1u8))
                .into()],
        );
        assert_eq!(logger.errors().count(), 1);
        assert_eq!(gff.root.len(), 1);
    }
}
