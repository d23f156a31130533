//! Class descriptors and the per-session table that owns them.
//!
//! A descriptor records one class's serial shape: name, version tag,
//! flags, declared serial fields and a link to its superclass descriptor.
//! Descriptors are referenceable like any other record, so each one also
//! remembers the handle it was assigned.

use crate::constants::{
    SC_BLOCK_DATA, SC_ENUM, SC_EXTERNALIZABLE, SC_SERIALIZABLE, SC_WRITE_METHOD,
};
use crate::entity::{PrimKind, Value};
use crate::error::DecodeError;

/// Index of a descriptor in its session's [`ClassTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The `classDescFlags` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassFlags(pub u8);

impl ClassFlags {
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_enum(self) -> bool {
        self.0 & SC_ENUM != 0
    }

    /// The class wrote extra data after its fields (`writeObject`).
    pub fn has_custom_write(self) -> bool {
        self.0 & SC_WRITE_METHOD != 0
    }

    pub fn is_externalizable(self) -> bool {
        self.0 & SC_EXTERNALIZABLE != 0
    }

    pub fn is_serializable(self) -> bool {
        self.0 & SC_SERIALIZABLE != 0
    }

    /// Externalizable data is framed in block-data records.
    pub fn has_block_data(self) -> bool {
        self.0 & SC_BLOCK_DATA != 0
    }
}

/// Type of a serial field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Prim(PrimKind),
    /// Object or array field, with its JVM type signature
    /// (`Ljava/lang/Object;`, `[I`, ...).
    Object(String),
}

impl FieldType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Prim(_))
    }

    /// Java source spelling of the type: `int`, `java.lang.Object`, `int[]`.
    pub fn java_name(&self) -> String {
        match self {
            FieldType::Prim(kind) => kind.name().to_owned(),
            FieldType::Object(sig) => signature_to_java_name(sig),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: String,
    pub ty: FieldType,
}

/// One class descriptor record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
    pub name: String,
    pub serial_version_uid: i64,
    pub flags: ClassFlags,
    /// Declared serial fields, in stream (declaration) order.
    pub fields: Vec<FieldDesc>,
    pub superclass: Option<ClassId>,
    /// Interface names of a dynamic proxy class; empty otherwise.
    pub interfaces: Vec<String>,
    pub is_proxy: bool,
    /// Content written by `annotateClass` / `annotateProxyClass`.
    pub annotations: Vec<Value>,
    /// Handle the descriptor was assigned when first seen.
    pub handle: u32,
}

impl ClassDesc {
    pub(crate) fn new(name: String, serial_version_uid: i64, handle: u32) -> Self {
        Self {
            name,
            serial_version_uid,
            flags: ClassFlags::default(),
            fields: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            is_proxy: false,
            annotations: Vec::new(),
            handle,
        }
    }

    pub(crate) fn proxy(handle: u32) -> Self {
        let mut desc = Self::new(String::new(), 0, handle);
        desc.is_proxy = true;
        desc.flags = ClassFlags(SC_SERIALIZABLE);
        desc
    }

    /// Rejects flag combinations no producer writes.
    pub(crate) fn validate(&self) -> Result<(), DecodeError> {
        let flags = self.flags;
        if flags.is_serializable() && flags.is_externalizable() {
            return Err(malformed(&self.name, "both serializable and externalizable"));
        }
        if flags.is_enum() {
            if !self.fields.is_empty() {
                return Err(malformed(&self.name, "enum descriptor declares fields"));
            }
            if self.serial_version_uid != 0 {
                return Err(malformed(&self.name, "enum descriptor has non-zero serialVersionUID"));
            }
        }
        Ok(())
    }
}

pub(crate) fn malformed(class: &str, what: &str) -> DecodeError {
    DecodeError::MalformedDescriptor(format!("{class}: {what}"))
}

/// Arena of every descriptor read in a session.
///
/// Survives handle resets: a reset only drops the numbering in the
/// [`HandleTable`](crate::HandleTable).
#[derive(Debug, Default, Clone)]
pub struct ClassTable {
    descs: Vec<ClassDesc>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, desc: ClassDesc) -> ClassId {
        self.descs.push(desc);
        ClassId(self.descs.len() - 1)
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassDesc> {
        self.descs.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ClassId) -> Option<&mut ClassDesc> {
        self.descs.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassDesc)> {
        self.descs.iter().enumerate().map(|(i, d)| (ClassId(i), d))
    }

    /// First descriptor with the given class name.
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.descs.iter().position(|d| d.name == name).map(ClassId)
    }

    /// The chain from the outermost ancestor down to `id` itself.
    pub fn hierarchy(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(cur) = next {
            // Chains are checked acyclic when linked; the bound is belt and braces.
            if chain.len() > self.descs.len() {
                break;
            }
            chain.push(cur);
            next = self.get(cur).and_then(|d| d.superclass);
        }
        chain.reverse();
        chain
    }

    /// True if following superclass links from `from` reaches `target`.
    pub(crate) fn reaches(&self, from: Option<ClassId>, target: ClassId) -> bool {
        let mut next = from;
        let mut steps = 0;
        while let Some(cur) = next {
            if cur == target || steps > self.descs.len() {
                return true;
            }
            steps += 1;
            next = self.get(cur).and_then(|d| d.superclass);
        }
        false
    }
}

/// Converts a JVM signature or array class name to Java source spelling.
///
/// ```
/// use serialysis::signature_to_java_name;
///
/// assert_eq!(signature_to_java_name("Ljava/lang/String;"), "java.lang.String");
/// assert_eq!(signature_to_java_name("[[I"), "int[][]");
/// ```
pub fn signature_to_java_name(sig: &str) -> String {
    let dims = sig.bytes().take_while(|&b| b == b'[').count();
    let elem = &sig[dims..];
    let mut out = match elem.as_bytes().first() {
        Some(b'L') if elem.ends_with(';') => elem[1..elem.len() - 1].replace('/', "."),
        Some(&code) if dims > 0 && elem.len() == 1 => match PrimKind::from_code(code) {
            Some(kind) => kind.name().to_owned(),
            None => elem.to_owned(),
        },
        _ => elem.replace('/', "."),
    };
    for _ in 0..dims {
        out.push_str("[]");
    }
    out
}

/// Java source spelling of a wire class name; arrays become `T[]`.
///
/// ```
/// use serialysis::display_type_name;
///
/// assert_eq!(display_type_name("[Ljava.lang.Integer;"), "java.lang.Integer[]");
/// assert_eq!(display_type_name("java.lang.Integer"), "java.lang.Integer");
/// ```
pub fn display_type_name(name: &str) -> String {
    if name.starts_with('[') {
        signature_to_java_name(name)
    } else {
        name.to_owned()
    }
}
