use crate::{FieldValue, LocalizedString, Vector3, Vector4};
use kotor_support::ResRef;

/// A GFF struct: an ordered collection of labelled fields.
///
/// Labels are unique within a struct. Field order is preserved when reading and writing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Struct {
    /// Game-defined identifier for the kind of struct this is.
    pub struct_id: u32,
    fields: Vec<(String, FieldValue)>,
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("Get the `", stringify!($variant), "` field with the given label.")]
        ///
        /// Returns `None` if the field is missing or has a different type.
        pub fn $name(&self, label: &str) -> Option<$ty> {
            match self.get(label) {
                Some(FieldValue::$variant(value)) => Some(value.clone()),
                _ => None,
            }
        }
    };
}

impl Struct {
    /// Create an empty struct.
    pub fn new(struct_id: u32) -> Self {
        Self {
            struct_id,
            fields: vec![],
        }
    }

    /// The number of fields in this struct.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this struct has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a field with the given label exists.
    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.fields.iter().position(|(l, _)| l == label)
    }

    /// Get a field by its label.
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value)
    }

    /// Get a mutable reference to a field by its label.
    pub fn get_mut(&mut self, label: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value)
    }

    /// Set a field. An existing field with the same label is replaced in place, keeping its
    /// position; otherwise the field is appended.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<FieldValue>) {
        let label = label.into();
        let value = value.into();
        match self.position(&label) {
            Some(index) => self.fields[index].1 = value,
            None => self.fields.push((label, value)),
        }
    }

    /// Set a field to a new struct and return a reference to it.
    pub fn set_struct(&mut self, label: impl Into<String>, child: Struct) -> &mut Struct {
        let index = self.set_and_index(label.into(), FieldValue::Struct(child));
        match &mut self.fields[index].1 {
            FieldValue::Struct(child) => child,
            _ => unreachable!(),
        }
    }

    /// Set a field to a new list and return a reference to it.
    pub fn set_list(&mut self, label: impl Into<String>, list: List) -> &mut List {
        let index = self.set_and_index(label.into(), FieldValue::List(list));
        match &mut self.fields[index].1 {
            FieldValue::List(list) => list,
            _ => unreachable!(),
        }
    }

    fn set_and_index(&mut self, label: String, value: FieldValue) -> usize {
        match self.position(&label) {
            Some(index) => {
                self.fields[index].1 = value;
                index
            }
            None => {
                self.fields.push((label, value));
                self.fields.len() - 1
            }
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, label: &str) -> Option<FieldValue> {
        let index = self.position(label)?;
        Some(self.fields.remove(index).1)
    }

    /// Iterate over the fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v))
    }

    /// Iterate over the field labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    typed_getter!(get_u8, UInt8, u8);
    typed_getter!(get_i8, Int8, i8);
    typed_getter!(get_u16, UInt16, u16);
    typed_getter!(get_i16, Int16, i16);
    typed_getter!(get_u32, UInt32, u32);
    typed_getter!(get_i32, Int32, i32);
    typed_getter!(get_u64, UInt64, u64);
    typed_getter!(get_i64, Int64, i64);
    typed_getter!(get_single, Single, f32);
    typed_getter!(get_double, Double, f64);
    typed_getter!(get_string, String, String);
    typed_getter!(get_resref, ResRef, ResRef);
    typed_getter!(get_locstring, LocalizedString, LocalizedString);
    typed_getter!(get_vector3, Vector3, Vector3);
    typed_getter!(get_vector4, Vector4, Vector4);

    /// Get a child struct by label.
    pub fn get_struct(&self, label: &str) -> Option<&Struct> {
        match self.get(label) {
            Some(FieldValue::Struct(child)) => Some(child),
            _ => None,
        }
    }

    /// Get a mutable child struct by label.
    pub fn get_struct_mut(&mut self, label: &str) -> Option<&mut Struct> {
        match self.get_mut(label) {
            Some(FieldValue::Struct(child)) => Some(child),
            _ => None,
        }
    }

    /// Get a child list by label.
    pub fn get_list(&self, label: &str) -> Option<&List> {
        match self.get(label) {
            Some(FieldValue::List(list)) => Some(list),
            _ => None,
        }
    }

    /// Get a mutable child list by label.
    pub fn get_list_mut(&mut self, label: &str) -> Option<&mut List> {
        match self.get_mut(label) {
            Some(FieldValue::List(list)) => Some(list),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Struct {
    type Item = (&'a str, &'a FieldValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a FieldValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// An ordered sequence of structs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct List(Vec<Struct>);

impl List {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(vec![])
    }

    /// The number of structs in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a new empty struct and return a reference to it.
    pub fn add(&mut self, struct_id: u32) -> &mut Struct {
        self.push(Struct::new(struct_id))
    }

    /// Append a struct and return a reference to it.
    pub fn push(&mut self, child: Struct) -> &mut Struct {
        self.0.push(child);
        let last = self.0.len() - 1;
        &mut self.0[last]
    }

    /// Get a struct by its index.
    pub fn get(&self, index: usize) -> Option<&Struct> {
        self.0.get(index)
    }

    /// Get a mutable struct by its index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Struct> {
        self.0.get_mut(index)
    }

    /// Remove the struct at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Struct> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    /// Iterate over the structs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Struct> {
        self.0.iter()
    }

    /// Iterate mutably over the structs in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Struct> {
        self.0.iter_mut()
    }
}

impl From<Vec<Struct>> for List {
    fn from(structs: Vec<Struct>) -> Self {
        Self(structs)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Struct;
    type IntoIter = std::slice::Iter<'a, Struct>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
