//! Decoded entities and the arena that owns them.
//!
//! | Variant              | Wire record                         |
//! |----------------------|-------------------------------------|
//! | [`Entity::Object`]   | `TC_OBJECT`, `TC_ENUM`              |
//! | [`Entity::Array`]    | `TC_ARRAY`                          |
//! | [`Entity::Text`]     | `TC_STRING`, `TC_LONGSTRING`        |
//! | [`Entity::Block`]    | `TC_BLOCKDATA`, `TC_BLOCKDATALONG`  |
//! | [`Entity::Class`]    | `TC_CLASS`                          |
//!
//! Primitives never stand alone in a stream; they appear inline as
//! [`Value::Prim`] inside objects and arrays.
//!
//! Every entity is owned by the session's [`Graph`]. Links between
//! entities are [`EntityId`]s, so self-referential graphs hold no
//! ownership cycles and identity is plain id equality.

use std::fmt;

use indexmap::IndexMap;
use serialysis_buffers::{Cursor, Reader};

use crate::class_desc::{display_type_name, ClassId, FieldType};

/// Index of an entity in its session's [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The eight primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl PrimKind {
    /// Maps a field type code (`B`, `C`, `D`, `F`, `I`, `J`, `S`, `Z`).
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            b'B' => PrimKind::Byte,
            b'C' => PrimKind::Char,
            b'D' => PrimKind::Double,
            b'F' => PrimKind::Float,
            b'I' => PrimKind::Int,
            b'J' => PrimKind::Long,
            b'S' => PrimKind::Short,
            b'Z' => PrimKind::Boolean,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            PrimKind::Byte => b'B',
            PrimKind::Char => b'C',
            PrimKind::Double => b'D',
            PrimKind::Float => b'F',
            PrimKind::Int => b'I',
            PrimKind::Long => b'J',
            PrimKind::Short => b'S',
            PrimKind::Boolean => b'Z',
        }
    }

    /// Java keyword for the kind.
    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Byte => "byte",
            PrimKind::Char => "char",
            PrimKind::Double => "double",
            PrimKind::Float => "float",
            PrimKind::Int => "int",
            PrimKind::Long => "long",
            PrimKind::Short => "short",
            PrimKind::Boolean => "boolean",
        }
    }

    /// Bytes the kind takes on the wire.
    pub fn width(self) -> usize {
        match self {
            PrimKind::Byte | PrimKind::Boolean => 1,
            PrimKind::Char | PrimKind::Short => 2,
            PrimKind::Int | PrimKind::Float => 4,
            PrimKind::Long | PrimKind::Double => 8,
        }
    }
}

/// A primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Byte(i8),
    /// A UTF-16 code unit.
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
}

impl Primitive {
    pub fn kind(&self) -> PrimKind {
        match self {
            Primitive::Byte(_) => PrimKind::Byte,
            Primitive::Char(_) => PrimKind::Char,
            Primitive::Double(_) => PrimKind::Double,
            Primitive::Float(_) => PrimKind::Float,
            Primitive::Int(_) => PrimKind::Int,
            Primitive::Long(_) => PrimKind::Long,
            Primitive::Short(_) => PrimKind::Short,
            Primitive::Boolean(_) => PrimKind::Boolean,
        }
    }

    /// Integral kinds widened to `i64`; `None` for floats and booleans.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Primitive::Byte(v) => Some(v as i64),
            Primitive::Char(v) => Some(v as i64),
            Primitive::Int(v) => Some(v as i64),
            Primitive::Long(v) => Some(v),
            Primitive::Short(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Primitive::Double(v) => Some(v),
            Primitive::Float(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Primitive::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Primitive::Byte(v) => write!(f, "{v}"),
            Primitive::Char(v) => match char::from_u32(v as u32) {
                Some(c) if !c.is_control() => write!(f, "{c}"),
                _ => write!(f, "\\u{v:04x}"),
            },
            Primitive::Double(v) => write!(f, "{v}"),
            Primitive::Float(v) => write!(f, "{v}"),
            Primitive::Int(v) => write!(f, "{v}"),
            Primitive::Long(v) => write!(f, "{v}"),
            Primitive::Short(v) => write!(f, "{v}"),
            Primitive::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// What a field, array element or annotation holds.
///
/// Equality on [`Value::Entity`] is identity: two structurally equal
/// objects read from different records compare unequal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Null,
    Prim(Primitive),
    Entity(EntityId),
    /// A class descriptor, where one appears as a value.
    Class(ClassId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_entity(&self) -> Option<EntityId> {
        match *self {
            Value::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<Primitive> {
        match *self {
            Value::Prim(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match *self {
            Value::Class(id) => Some(id),
            _ => None,
        }
    }
}

/// A general object, or an enum constant.
///
/// Fields are keyed by name in ancestor-to-descendant declaration order.
/// An enum constant has exactly one field,
/// [`ENUM_NAME_FIELD`](crate::constants::ENUM_NAME_FIELD), holding its name.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    type_name: String,
    class: ClassId,
    fields: IndexMap<String, Value>,
    annotations: Vec<Value>,
}

impl Composite {
    pub(crate) fn new(type_name: String, class: ClassId) -> Self {
        Self {
            type_name,
            class,
            fields: IndexMap::new(),
            annotations: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Descriptor the object was read with.
    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Data written after the declared fields by custom write hooks
    /// anywhere in the class hierarchy, in stream order.
    pub fn annotations(&self) -> &[Value] {
        &self.annotations
    }

    pub(crate) fn set_field(&mut self, name: String, value: Value) {
        self.fields.insert(name, value);
    }

    pub(crate) fn extend_annotations(&mut self, values: Vec<Value>) {
        self.annotations.extend(values);
    }
}

/// An array.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    type_name: String,
    class: ClassId,
    element_type: FieldType,
    elements: Vec<Value>,
}

impl Sequence {
    pub(crate) fn new(type_name: String, class: ClassId, element_type: FieldType, len: usize) -> Self {
        Self {
            type_name,
            class,
            element_type,
            elements: Vec::with_capacity(len.min(4096)),
        }
    }

    /// Wire class name, e.g. `[I` or `[Ljava.lang.Integer;`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn element_type(&self) -> &FieldType {
        &self.element_type
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, i: usize) -> Option<Value> {
        self.elements.get(i).copied()
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.elements.push(value);
    }
}

/// Raw bytes written with `DataOutput` methods rather than as objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueBlock {
    data: Vec<u8>,
}

impl OpaqueBlock {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A typed reader over the block, for data whose layout the caller
    /// knows (`readUTF`, `readInt`, ...).
    pub fn cursor(&self) -> Cursor<Reader<'_>> {
        Cursor::new(Reader::new(&self.data))
    }
}

/// A `java.lang.Class` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassObject {
    pub name: String,
    pub class: ClassId,
}

/// Broad variant of an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Object,
    Array,
    Text,
    Block,
    Class,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Object => "object",
            EntityKind::Array => "array",
            EntityKind::Text => "string",
            EntityKind::Block => "blockdata",
            EntityKind::Class => "class",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Object(Composite),
    Array(Sequence),
    Text(String),
    Block(OpaqueBlock),
    Class(ClassObject),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Object(_) => EntityKind::Object,
            Entity::Array(_) => EntityKind::Array,
            Entity::Text(_) => EntityKind::Text,
            Entity::Block(_) => EntityKind::Block,
            Entity::Class(_) => EntityKind::Class,
        }
    }

    /// Declared Java type, in source spelling.
    pub fn type_name(&self) -> String {
        match self {
            Entity::Object(o) => o.type_name.clone(),
            Entity::Array(a) => display_type_name(&a.type_name),
            Entity::Text(_) => "java.lang.String".to_owned(),
            Entity::Block(_) => "blockdata".to_owned(),
            Entity::Class(_) => "java.lang.Class".to_owned(),
        }
    }

    pub fn as_object(&self) -> Option<&Composite> {
        match self {
            Entity::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Sequence> {
        match self {
            Entity::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entity::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&OpaqueBlock> {
        match self {
            Entity::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassObject> {
        match self {
            Entity::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// Arena owning every entity decoded in a session.
///
/// Entities are never removed; the arena is dropped with its session.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Vec<Entity>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entity: Entity) -> EntityId {
        self.nodes.push(entity);
        EntityId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(id.0)
    }

    /// The entity a value points at; `None` for nulls, primitives and
    /// descriptors.
    pub fn entity(&self, value: Value) -> Option<&Entity> {
        value.as_entity().and_then(|id| self.get(id))
    }

    pub fn object(&self, value: Value) -> Option<&Composite> {
        self.entity(value).and_then(Entity::as_object)
    }

    pub fn array(&self, value: Value) -> Option<&Sequence> {
        self.entity(value).and_then(Entity::as_array)
    }

    pub fn text(&self, value: Value) -> Option<&str> {
        self.entity(value).and_then(Entity::as_text)
    }

    pub fn block(&self, value: Value) -> Option<&OpaqueBlock> {
        self.entity(value).and_then(Entity::as_block)
    }

    pub(crate) fn object_mut(&mut self, id: EntityId) -> Option<&mut Composite> {
        match self.nodes.get_mut(id.0) {
            Some(Entity::Object(o)) => Some(o),
            _ => None,
        }
    }

    pub(crate) fn array_mut(&mut self, id: EntityId) -> Option<&mut Sequence> {
        match self.nodes.get_mut(id.0) {
            Some(Entity::Array(a)) => Some(a),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.nodes.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prim_kind_codes_roundtrip() {
        for code in *b"BCDFIJSZ" {
            let kind = PrimKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(PrimKind::from_code(b'L'), None);
        assert_eq!(PrimKind::Long.width(), 8);
        assert_eq!(PrimKind::Char.name(), "char");
    }

    #[test]
    fn primitive_display() {
        assert_eq!(Primitive::Int(5).to_string(), "5");
        assert_eq!(Primitive::Char(b'x' as u16).to_string(), "x");
        assert_eq!(Primitive::Char(0).to_string(), "\\u0000");
        assert_eq!(Primitive::Boolean(true).to_string(), "true");
        assert_eq!(Primitive::Double(1.5).to_string(), "1.5");
    }

    #[test]
    fn composite_keeps_insertion_order() {
        let mut o = Composite::new("Point".into(), ClassId(0));
        o.set_field("y".into(), Value::Prim(Primitive::Int(2)));
        o.set_field("x".into(), Value::Prim(Primitive::Int(1)));
        assert_eq!(o.field_names().collect::<Vec<_>>(), vec!["y", "x"]);
        assert_eq!(o.field("x"), Some(Value::Prim(Primitive::Int(1))));
        assert!(o.annotations().is_empty());
    }

    #[test]
    fn graph_identity_is_by_id() {
        let mut g = Graph::new();
        let a = g.push(Entity::Text("same".into()));
        let b = g.push(Entity::Text("same".into()));
        assert_eq!(g.get(a), g.get(b));
        assert_ne!(Value::Entity(a), Value::Entity(b));
        assert_eq!(g.text(Value::Entity(a)), Some("same"));
        assert_eq!(g.entity(Value::Null), None);
    }

    #[test]
    fn block_cursor_reads_data_output() {
        let block = OpaqueBlock::new(vec![0x00, 0x02, b'h', b'i', 0x00, 0x00, 0x04, 0xd2]);
        let mut c = block.cursor();
        assert_eq!(c.utf().unwrap(), "hi");
        assert_eq!(c.i32().unwrap(), 1234);
    }
}
