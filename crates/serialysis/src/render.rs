//! Indented text rendering of an entity graph.
//!
//! Output has the shape `kind(type){contents}`, one field or element per
//! line, nested content indented by depth:
//!
//! ```text
//! object(Holder){
//!   held = object(Holder){...}
//! }
//! ```
//!
//! An entity met again while it is still being rendered prints as
//! [`CYCLE_MARKER`] instead of recursing, so self-referential graphs
//! terminate.

use serialysis_buffers::print_octets;

use crate::class_desc::ClassTable;
use crate::entity::{Entity, EntityId, Graph, Value};

/// Placeholder for an entity already on the rendering path.
pub const CYCLE_MARKER: &str = "...";

/// Placeholder for content below [`RenderOptions::max_depth`].
pub const DEPTH_MARKER: &str = "<depth limit>";

/// Number of block-data bytes shown in hex.
const BLOCK_PREVIEW: usize = 16;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Deepest entity nesting rendered before [`DEPTH_MARKER`] is printed.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            max_depth: 1024,
        }
    }
}

/// Renders values of one session's graph.
///
/// Holds no state between calls; the path of entities currently being
/// rendered is a local of each [`render`](Self::render) call.
pub struct Renderer<'a> {
    graph: &'a Graph,
    classes: &'a ClassTable,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(graph: &'a Graph, classes: &'a ClassTable) -> Self {
        Self::with_options(graph, classes, RenderOptions::default())
    }

    pub fn with_options(graph: &'a Graph, classes: &'a ClassTable, options: RenderOptions) -> Self {
        Self {
            graph,
            classes,
            options,
        }
    }

    pub fn render(&self, value: Value) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.write_value(&mut out, value, &mut path);
        out
    }

    fn write_value(&self, out: &mut String, value: Value, path: &mut Vec<EntityId>) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Prim(p) => {
                out.push_str("prim(");
                out.push_str(p.kind().name());
                out.push_str("){");
                out.push_str(&p.to_string());
                out.push('}');
            }
            Value::Class(id) => {
                out.push_str("classdesc(");
                match self.classes.get(id) {
                    Some(desc) => out.push_str(&desc.name),
                    None => out.push('?'),
                }
                out.push_str("){}");
            }
            Value::Entity(id) => self.write_entity(out, id, path),
        }
    }

    fn write_entity(&self, out: &mut String, id: EntityId, path: &mut Vec<EntityId>) {
        let Some(entity) = self.graph.get(id) else {
            out.push_str("<missing>");
            return;
        };
        out.push_str(entity.kind().name());
        out.push('(');
        out.push_str(&entity.type_name());
        out.push_str("){");
        if path.contains(&id) {
            out.push_str(CYCLE_MARKER);
        } else if path.len() >= self.options.max_depth {
            out.push_str(DEPTH_MARKER);
        } else {
            path.push(id);
            self.write_contents(out, entity, path);
            path.pop();
        }
        if out.ends_with('\n') {
            self.indent(out, path.len());
        }
        out.push('}');
    }

    fn write_contents(&self, out: &mut String, entity: &Entity, path: &mut Vec<EntityId>) {
        let depth = path.len();
        match entity {
            Entity::Object(obj) => {
                out.push('\n');
                for (name, value) in obj.fields() {
                    self.indent(out, depth);
                    out.push_str(name);
                    out.push_str(" = ");
                    self.write_value(out, value, path);
                    out.push('\n');
                }
                if !obj.annotations().is_empty() {
                    self.indent(out, depth);
                    out.push_str("-- data written by class's writeObject:\n");
                    for &value in obj.annotations() {
                        self.indent(out, depth);
                        self.write_value(out, value, path);
                        out.push('\n');
                    }
                }
            }
            Entity::Array(arr) => {
                out.push('\n');
                for &value in arr.elements() {
                    self.indent(out, depth);
                    self.write_value(out, value, path);
                    out.push('\n');
                }
            }
            Entity::Text(s) => out.push_str(&format!("{s:?}")),
            Entity::Block(block) => {
                let n = block.len();
                out.push_str(&format!(
                    "{n} byte{} of binary data",
                    if n == 1 { "" } else { "s" }
                ));
                if n > 0 {
                    out.push_str(": ");
                    out.push_str(&print_octets(block.bytes(), BLOCK_PREVIEW));
                }
            }
            Entity::Class(class) => out.push_str(&class.name),
        }
    }

    fn indent(&self, out: &mut String, depth: usize) {
        for _ in 0..depth * self.options.indent {
            out.push(' ');
        }
    }
}
