//! Recursive-descent decoder for object serialization streams.
//!
//! One [`Session`] reads one stream. It owns the handle table, the class
//! descriptor table and the entity arena; all three persist across
//! top-level records, so later records can refer back to earlier ones.

use serialysis_buffers::{BufferError, ByteSource, Cursor, Reader};
use tracing::{debug, trace};

use crate::class_desc::{malformed, ClassDesc, ClassFlags, ClassId, ClassTable, FieldDesc, FieldType};
use crate::constants::*;
use crate::entity::{ClassObject, Composite, Entity, EntityId, Graph, OpaqueBlock, PrimKind, Primitive, Sequence, Value};
use crate::error::DecodeError;
use crate::handles::{HandleTable, Slot};
use crate::render::Renderer;

/// Default bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Records nested deeper than this fail with
    /// [`DecodeError::RecursionLimitExceeded`].
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A decoding session over one stream.
///
/// # Example
///
/// ```
/// use serialysis::{Reader, Session};
///
/// // "noddy" as written by ObjectOutputStream.writeObject
/// let bytes = [
///     0xac, 0xed, 0x00, 0x05, 0x74, 0x00, 0x05, b'n', b'o', b'd', b'd', b'y',
/// ];
/// let mut session = Session::open(Reader::new(&bytes)).unwrap();
/// let value = session.decode_next().unwrap().unwrap();
/// assert_eq!(session.graph().text(value), Some("noddy"));
/// assert_eq!(session.decode_next().unwrap(), None);
/// ```
pub struct Session<S> {
    cursor: Cursor<S>,
    handles: HandleTable,
    classes: ClassTable,
    graph: Graph,
    options: DecodeOptions,
    depth: usize,
    terminated: bool,
}

impl<S: ByteSource> Session<S> {
    /// Opens a session, reading and checking the stream header.
    pub fn open(source: S) -> Result<Self, DecodeError> {
        Self::with_options(source, DecodeOptions::default())
    }

    pub fn with_options(source: S, options: DecodeOptions) -> Result<Self, DecodeError> {
        let mut session = Self {
            cursor: Cursor::new(source),
            handles: HandleTable::new(),
            classes: ClassTable::new(),
            graph: Graph::new(),
            options,
            depth: 0,
            terminated: false,
        };
        let magic = session.read(|c| c.u16())?;
        if magic != STREAM_MAGIC {
            return Err(DecodeError::InvalidMagic(magic));
        }
        let version = session.read(|c| c.u16())?;
        if version != STREAM_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        Ok(session)
    }

    /// Decodes the next top-level record.
    ///
    /// Returns `Ok(None)` once the stream ends cleanly between records.
    /// Any error terminates the session; later calls return
    /// [`DecodeError::SessionTerminated`].
    pub fn decode_next(&mut self) -> Result<Option<Value>, DecodeError> {
        if self.terminated {
            return Err(DecodeError::SessionTerminated);
        }
        self.depth = 0;
        match self.next_record() {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!(offset = self.cursor.position(), error = %err, "session terminated");
                self.terminated = true;
                Err(err)
            }
        }
    }

    /// Decodes every remaining top-level record.
    pub fn decode_all(&mut self) -> Result<Vec<Value>, DecodeError> {
        let mut out = Vec::new();
        while let Some(value) = self.decode_next()? {
            out.push(value);
        }
        Ok(out)
    }

    /// Forgets every assigned handle, as a `TC_RESET` record does.
    ///
    /// Entities already decoded stay in the graph.
    pub fn reset_handles(&mut self) {
        debug!(handles = self.handles.len(), "handle table reset");
        self.handles.reset();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Bytes consumed so far, header included.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.graph, &self.classes)
    }

    /// Cycle-safe text form of a value from this session.
    pub fn render(&self, value: Value) -> String {
        self.renderer().render(value)
    }

    pub fn into_source(self) -> S {
        self.cursor.into_inner()
    }

    // ── records ────────────────────────────────────────────────────────────

    fn next_record(&mut self) -> Result<Option<Value>, DecodeError> {
        loop {
            match self.peek()? {
                None => return Ok(None),
                Some(TC_RESET) => {
                    self.read(|c| c.u8())?;
                    self.reset_handles();
                }
                Some(_) => return self.read_content().map(Some),
            }
        }
    }

    fn read_content(&mut self) -> Result<Value, DecodeError> {
        self.nested(Self::read_content_inner)
    }

    fn read_content_inner(&mut self) -> Result<Value, DecodeError> {
        loop {
            let offset = self.cursor.position();
            let tag = self.read(|c| c.u8())?;
            trace!(target: "serialysis::decode", offset, tag = tag_name(tag), depth = self.depth);
            return match tag {
                TC_NULL => Ok(Value::Null),
                TC_REFERENCE => self.read_reference(),
                // Resets are only legal between top-level records.
                TC_RESET if self.depth > 1 => Err(DecodeError::UnexpectedTag { tag, offset }),
                TC_RESET => {
                    self.reset_handles();
                    continue;
                }
                TC_STRING => self.read_string(false).map(Value::Entity),
                TC_LONGSTRING => self.read_string(true).map(Value::Entity),
                TC_CLASSDESC => self.read_new_class_desc().map(Value::Class),
                TC_PROXYCLASSDESC => self.read_proxy_class_desc().map(Value::Class),
                TC_CLASS => self.read_class_object(),
                TC_ARRAY => self.read_array(),
                TC_ENUM => self.read_enum(),
                TC_OBJECT => self.read_object(),
                TC_BLOCKDATA | TC_BLOCKDATALONG => self.read_block_data(tag),
                TC_EXCEPTION => Err(self.read_exception()),
                TC_ENDBLOCKDATA => Err(DecodeError::UnexpectedTag { tag, offset }),
                _ => Err(DecodeError::UnknownTag { tag, offset }),
            };
        }
    }

    fn read_reference(&mut self) -> Result<Value, DecodeError> {
        let handle = self.read(|c| c.u32())?;
        self.handles.resolve(handle)
    }

    fn read_string(&mut self, long: bool) -> Result<EntityId, DecodeError> {
        let handle = self.handles.allocate();
        let text = if long {
            self.read(|c| c.long_utf())?
        } else {
            self.read(|c| c.utf())?
        };
        let id = self.graph.push(Entity::Text(text));
        self.handles.bind(handle, Slot::Entity(id))?;
        Ok(id)
    }

    fn read_block_data(&mut self, tag: u8) -> Result<Value, DecodeError> {
        let len = if tag == TC_BLOCKDATA {
            self.read(|c| c.u8())? as usize
        } else {
            let len = self.read(|c| c.i32())?;
            usize::try_from(len).map_err(|_| DecodeError::InvalidLength(len as i64))?
        };
        let data = self.read(|c| c.bytes(len))?;
        Ok(Value::Entity(self.graph.push(Entity::Block(OpaqueBlock::new(data)))))
    }

    fn read_class_object(&mut self) -> Result<Value, DecodeError> {
        let class = self.read_required_class_desc()?;
        let name = self.class_name(class);
        let handle = self.handles.allocate();
        let id = self.graph.push(Entity::Class(ClassObject { name, class }));
        self.handles.bind(handle, Slot::Entity(id))?;
        Ok(Value::Entity(id))
    }

    fn read_array(&mut self) -> Result<Value, DecodeError> {
        let class = self.read_required_class_desc()?;
        let name = self.class_name(class);
        let element_type = array_element_type(&name)?;
        let handle = self.handles.allocate();
        let len = self.read(|c| c.i32())?;
        let len = usize::try_from(len).map_err(|_| DecodeError::InvalidLength(len as i64))?;
        let id = self
            .graph
            .push(Entity::Array(Sequence::new(name, class, element_type.clone(), len)));
        self.handles.bind(handle, Slot::Entity(id))?;
        for _ in 0..len {
            let value = match element_type {
                FieldType::Prim(kind) => Value::Prim(self.read_prim(kind)?),
                FieldType::Object(_) => self.read_content()?,
            };
            if let Some(arr) = self.graph.array_mut(id) {
                arr.push(value);
            }
        }
        Ok(Value::Entity(id))
    }

    fn read_enum(&mut self) -> Result<Value, DecodeError> {
        let class = self.read_required_class_desc()?;
        let name = self.class_name(class);
        if !self.flags(class).is_enum() {
            return Err(malformed(&name, "non-enum descriptor used for an enum constant"));
        }
        let handle = self.handles.allocate();
        let id = self.graph.push(Entity::Object(Composite::new(name, class)));
        self.handles.bind(handle, Slot::Entity(id))?;
        let constant = self.read_content()?;
        if self.graph.text(constant).is_none() {
            return Err(malformed(&self.class_name(class), "enum constant name is not a string"));
        }
        if let Some(obj) = self.graph.object_mut(id) {
            obj.set_field(ENUM_NAME_FIELD.to_owned(), constant);
        }
        Ok(Value::Entity(id))
    }

    fn read_object(&mut self) -> Result<Value, DecodeError> {
        let class = self.read_required_class_desc()?;
        let name = self.class_name(class);
        if self.flags(class).is_enum() {
            return Err(malformed(&name, "enum descriptor used for an ordinary object"));
        }
        let handle = self.handles.allocate();
        let flags = self.flags(class);
        let id = self.graph.push(Entity::Object(Composite::new(name, class)));
        self.handles.bind(handle, Slot::Entity(id))?;
        if flags.is_externalizable() {
            // One writeExternal section for the whole object; ancestors write nothing.
            if !flags.has_block_data() {
                return Err(malformed(
                    &self.class_name(class),
                    "externalizable data written with protocol version 1",
                ));
            }
            self.read_object_annotations(id)?;
            return Ok(Value::Entity(id));
        }
        for level in self.classes.hierarchy(class) {
            self.read_class_data(id, level)?;
        }
        Ok(Value::Entity(id))
    }

    /// Reads the part of a serializable object that one class in its
    /// hierarchy wrote.
    fn read_class_data(&mut self, id: EntityId, level: ClassId) -> Result<(), DecodeError> {
        let (flags, fields) = match self.classes.get(level) {
            Some(desc) => (desc.flags, desc.fields.clone()),
            None => return Ok(()),
        };
        for field in fields {
            let value = match field.ty {
                FieldType::Prim(kind) => Value::Prim(self.read_prim(kind)?),
                FieldType::Object(_) => self.read_content()?,
            };
            if let Some(obj) = self.graph.object_mut(id) {
                obj.set_field(field.name, value);
            }
        }
        if flags.has_custom_write() {
            self.read_object_annotations(id)?;
        }
        Ok(())
    }

    fn read_object_annotations(&mut self, id: EntityId) -> Result<(), DecodeError> {
        let values = self.read_annotations()?;
        if let Some(obj) = self.graph.object_mut(id) {
            obj.extend_annotations(values);
        }
        Ok(())
    }

    /// Reads content records up to and including `TC_ENDBLOCKDATA`.
    fn read_annotations(&mut self) -> Result<Vec<Value>, DecodeError> {
        let mut values = Vec::new();
        loop {
            match self.peek()? {
                None => {
                    return Err(DecodeError::TruncatedInput {
                        offset: self.cursor.position(),
                    })
                }
                Some(TC_ENDBLOCKDATA) => {
                    self.read(|c| c.u8())?;
                    return Ok(values);
                }
                Some(_) => values.push(self.read_content()?),
            }
        }
    }

    /// The producer aborted: reset, read the throwable, reset again.
    fn read_exception(&mut self) -> DecodeError {
        self.reset_handles();
        let thrown = match self.read_content() {
            Ok(value) => value,
            Err(err) => return err,
        };
        self.reset_handles();
        match self.graph.entity(thrown).zip(thrown.as_entity()) {
            Some((entity, exception)) => {
                let class_name = entity.type_name();
                debug!(%class_name, "stream aborted by producer");
                DecodeError::UpstreamAbort {
                    exception,
                    class_name,
                }
            }
            None => DecodeError::MalformedDescriptor("exception record without a throwable".into()),
        }
    }

    // ── class descriptors ──────────────────────────────────────────────────

    /// Reads a `classDesc` position: new descriptor, reference or null.
    fn read_class_desc(&mut self) -> Result<Option<ClassId>, DecodeError> {
        self.nested(|s| {
            let offset = s.cursor.position();
            let tag = s.read(|c| c.u8())?;
            match tag {
                TC_NULL => Ok(None),
                TC_CLASSDESC => s.read_new_class_desc().map(Some),
                TC_PROXYCLASSDESC => s.read_proxy_class_desc().map(Some),
                TC_REFERENCE => match s.read_reference()? {
                    Value::Class(id) => Ok(Some(id)),
                    _ => Err(DecodeError::MalformedDescriptor(
                        "reference to a non-descriptor where a class was expected".into(),
                    )),
                },
                TC_NULL..=TC_ENUM => Err(DecodeError::UnexpectedTag { tag, offset }),
                _ => Err(DecodeError::UnknownTag { tag, offset }),
            }
        })
    }

    fn read_required_class_desc(&mut self) -> Result<ClassId, DecodeError> {
        self.read_class_desc()?
            .ok_or_else(|| DecodeError::MalformedDescriptor("null class descriptor".into()))
    }

    fn read_new_class_desc(&mut self) -> Result<ClassId, DecodeError> {
        let name = self.read(|c| c.utf())?;
        let suid = self.read(|c| c.i64())?;
        let handle = self.handles.allocate();
        let id = self.classes.push(ClassDesc::new(name, suid, handle));
        self.handles.bind(handle, Slot::Class(id))?;

        let flags = ClassFlags(self.read(|c| c.u8())?);
        let count = self.read(|c| c.i16())?;
        let count = usize::try_from(count).map_err(|_| DecodeError::InvalidLength(count as i64))?;
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            fields.push(self.read_field_desc()?);
        }
        if let Some(desc) = self.classes.get_mut(id) {
            desc.flags = flags;
            desc.fields = fields;
        }
        if let Some(desc) = self.classes.get(id) {
            desc.validate()?;
        }
        self.finish_class_desc(id)?;
        Ok(id)
    }

    fn read_proxy_class_desc(&mut self) -> Result<ClassId, DecodeError> {
        let handle = self.handles.allocate();
        let id = self.classes.push(ClassDesc::proxy(handle));
        self.handles.bind(handle, Slot::Class(id))?;

        let count = self.read(|c| c.i32())?;
        let count = usize::try_from(count).map_err(|_| DecodeError::InvalidLength(count as i64))?;
        let mut interfaces = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            interfaces.push(self.read(|c| c.utf())?);
        }
        if let Some(desc) = self.classes.get_mut(id) {
            desc.name = format!("$Proxy[{}]", interfaces.join(", "));
            desc.interfaces = interfaces;
        }
        self.finish_class_desc(id)?;
        Ok(id)
    }

    /// Reads class annotations and the superclass link shared by both
    /// descriptor forms.
    fn finish_class_desc(&mut self, id: ClassId) -> Result<(), DecodeError> {
        let annotations = self.read_annotations()?;
        let superclass = self.read_class_desc()?;
        if self.classes.reaches(superclass, id) {
            return Err(malformed(&self.class_name(id), "cyclic superclass chain"));
        }
        if let Some(desc) = self.classes.get_mut(id) {
            desc.annotations = annotations;
            desc.superclass = superclass;
        }
        Ok(())
    }

    fn read_field_desc(&mut self) -> Result<FieldDesc, DecodeError> {
        let code = self.read(|c| c.u8())?;
        let name = self.read(|c| c.utf())?;
        let ty = match code {
            b'L' | b'[' => {
                let value = self.read_content()?;
                let sig = match self.graph.text(value) {
                    Some(sig) => sig.to_owned(),
                    None => return Err(malformed(&name, "field type signature is not a string")),
                };
                if !matches!(sig.as_bytes().first(), Some(b'L' | b'[')) {
                    return Err(malformed(&name, &format!("bad object field signature {sig:?}")));
                }
                FieldType::Object(sig)
            }
            _ => match PrimKind::from_code(code) {
                Some(kind) => FieldType::Prim(kind),
                None => {
                    return Err(malformed(
                        &name,
                        &format!("unknown field type code 0x{code:02x}"),
                    ))
                }
            },
        };
        Ok(FieldDesc { name, ty })
    }

    // ── helpers ────────────────────────────────────────────────────────────

    fn read_prim(&mut self, kind: PrimKind) -> Result<Primitive, DecodeError> {
        Ok(match kind {
            PrimKind::Byte => Primitive::Byte(self.read(|c| c.i8())?),
            PrimKind::Char => Primitive::Char(self.read(|c| c.u16())?),
            PrimKind::Double => Primitive::Double(self.read(|c| c.f64())?),
            PrimKind::Float => Primitive::Float(self.read(|c| c.f32())?),
            PrimKind::Int => Primitive::Int(self.read(|c| c.i32())?),
            PrimKind::Long => Primitive::Long(self.read(|c| c.i64())?),
            PrimKind::Short => Primitive::Short(self.read(|c| c.i16())?),
            PrimKind::Boolean => Primitive::Boolean(self.read(|c| c.bool())?),
        })
    }

    /// Runs one cursor read, tagging failures with the offset it started at.
    fn read<T>(
        &mut self,
        f: impl FnOnce(&mut Cursor<S>) -> Result<T, BufferError>,
    ) -> Result<T, DecodeError> {
        let offset = self.cursor.position();
        f(&mut self.cursor).map_err(|err| DecodeError::from_buffer(err, offset))
    }

    fn peek(&mut self) -> Result<Option<u8>, DecodeError> {
        self.read(|c| c.peek())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, DecodeError>) -> Result<T, DecodeError> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::RecursionLimitExceeded(self.options.max_depth));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn class_name(&self, id: ClassId) -> String {
        self.classes
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    fn flags(&self, id: ClassId) -> ClassFlags {
        self.classes.get(id).map(|d| d.flags).unwrap_or_default()
    }
}

/// Element type of an array class, from its wire name (`[I`, `[Ljava.lang.String;`).
fn array_element_type(name: &str) -> Result<FieldType, DecodeError> {
    let bytes = name.as_bytes();
    if bytes.first() != Some(&b'[') {
        return Err(malformed(name, "array class name does not start with '['"));
    }
    match bytes.get(1) {
        Some(b'L' | b'[') => Ok(FieldType::Object(name[1..].replace('.', "/"))),
        Some(&code) => PrimKind::from_code(code)
            .map(FieldType::Prim)
            .ok_or_else(|| malformed(name, "unknown array element type")),
        None => Err(malformed(name, "array class name has no element type")),
    }
}

/// Decodes the first record of an in-memory stream.
///
/// The returned session owns the graph the value lives in and can keep
/// decoding any records that follow.
pub fn examine(bytes: &[u8]) -> Result<(Value, Session<Reader<'_>>), DecodeError> {
    let mut session = Session::open(Reader::new(bytes))?;
    match session.decode_next()? {
        Some(value) => Ok((value, session)),
        None => Err(DecodeError::TruncatedInput {
            offset: session.position(),
        }),
    }
}
