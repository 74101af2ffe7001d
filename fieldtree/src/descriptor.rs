use core::fmt;
use core::num::NonZeroUsize;
use std::collections::HashMap;

use fieldtree_core::{ConstTypeId, Field, Kind, Shape, Tag};

use crate::{AccessError, BuildOptions, IterPolicy, debug};

/// Index of a field within its [`TypeDescriptor`].
///
/// Ids are dense, start at 0, and follow a pre-order depth-first walk of the
/// declared fields: a nested record comes right before its own fields.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FieldId(usize);

impl FieldId {
    /// Wrap a raw index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for FieldId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Slot of a nested record instance, used to share its resolved address
/// between all of its fields. Slot 0 is the root instance, so nested ids
/// start at 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NestedId(NonZeroUsize);

impl NestedId {
    /// The raw slot index (at least 1).
    pub const fn index(self) -> usize {
        self.0.get()
    }
}

/// Everything known statically about one field of the tree.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    id: FieldId,
    parent: Option<FieldId>,
    children: Vec<FieldId>,
    /// One past the last id of this field's subtree.
    subtree_end: usize,
    nested: Option<NestedId>,
    depth: usize,
    indirection: usize,
    selector: String,
    field: &'static Field,
    underlying: &'static Shape,
}

impl FieldDescriptor {
    /// This field's id.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// The enclosing field, or `None` for top-level fields.
    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    /// Directly nested fields, in declaration order. Empty unless the
    /// underlying type is a record that was expanded.
    pub fn children(&self) -> &[FieldId] {
        &self.children
    }

    /// The declared field name.
    pub fn name(&self) -> &'static str {
        self.field.name
    }

    /// The dotted path from the root, e.g. `inner.b`.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The raw field tag.
    pub fn tag(&self) -> Tag {
        self.field.tag
    }

    /// Byte offset of the field within its immediately enclosing record.
    pub fn offset(&self) -> usize {
        self.field.offset
    }

    /// The declared type, including any `Option`/`Box` layers.
    pub fn declared_shape(&self) -> &'static Shape {
        self.field.shape()
    }

    /// The type left after stripping every `Option`/`Box` layer.
    pub fn underlying_shape(&self) -> &'static Shape {
        self.underlying
    }

    /// Kind of the declared type.
    pub fn kind(&self) -> Kind {
        self.declared_shape().kind()
    }

    /// Kind of the underlying type.
    pub fn underlying_kind(&self) -> Kind {
        self.underlying.kind()
    }

    /// Number of `Option`/`Box` layers between the declared and the
    /// underlying type.
    pub fn indirection(&self) -> usize {
        self.indirection
    }

    /// Nesting depth: 0 for top-level fields.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The nested-instance slot, set when the underlying type is a record.
    pub fn nested_id(&self) -> Option<NestedId> {
        self.nested
    }

    /// Ids of every descendant, which are contiguous in pre-order.
    pub(crate) fn descendants(&self) -> core::ops::Range<usize> {
        self.id.0 + 1..self.subtree_end
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.selector)?;
        if self.indirection > 0 {
            write!(f, " (indirection {})", self.indirection)?;
        }
        Ok(())
    }
}

/// The field tree of one record type.
///
/// Built once per type (usually through a
/// [`DescriptorCache`](crate::DescriptorCache)) and immutable afterwards, so
/// it can be shared freely across threads and bound to any number of
/// instances.
#[derive(Debug)]
pub struct TypeDescriptor {
    shape: &'static Shape,
    fields: Vec<FieldDescriptor>,
    roots: Vec<FieldId>,
    groups: HashMap<String, Vec<FieldId>>,
    nested_count: usize,
    depth: usize,
    max_depth: usize,
}

impl TypeDescriptor {
    /// Builds the field tree for `shape`, bypassing any cache.
    ///
    /// `Box`/`Option` layers around the record are stripped first. Fails
    /// only if what is left is not a record.
    pub fn build(shape: &'static Shape, options: &BuildOptions) -> Result<Self, AccessError> {
        let (record, _) = shape.underlying();
        if !record.is_record() {
            return Err(AccessError::NotARecord { shape });
        }

        let mut builder = TreeBuilder {
            options,
            fields: Vec::with_capacity(record.fields().len()),
            nested_count: 1,
            levels: 0,
            stopped: false,
        };
        let roots = builder.walk(record, None, 0);

        let mut groups: HashMap<String, Vec<FieldId>> = HashMap::new();
        if let Some(group_by) = &options.group_by {
            for field in &builder.fields {
                if let Some(key) = group_by(field) {
                    groups.entry(key).or_default().push(field.id);
                }
            }
        }

        debug!(
            shape = %record,
            fields = builder.fields.len(),
            depth = builder.levels,
            groups = groups.len(),
            "built type descriptor"
        );

        Ok(Self {
            shape: record,
            fields: builder.fields,
            roots,
            groups,
            nested_count: builder.nested_count,
            depth: builder.levels,
            max_depth: options.max_depth,
        })
    }

    /// The record shape this descriptor describes.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Identity of the record type; the cache key.
    pub fn type_id(&self) -> ConstTypeId {
        self.shape.id
    }

    /// Number of fields in the tree, nested records included.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// The field with the given id, if it exists.
    pub fn field(&self, id: impl Into<FieldId>) -> Option<&FieldDescriptor> {
        self.fields.get(id.into().0)
    }

    /// Every field, indexed by id.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Top-level fields, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.roots.iter().map(|id| &self.fields[id.0])
    }

    /// Number of nesting levels present in the tree (0 for an empty tree).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The depth bound the tree was built with.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of nested-instance slots, the root's included.
    pub fn nested_count(&self) -> usize {
        self.nested_count
    }

    /// Ids of every field matching `predicate`, in ascending order.
    ///
    /// Only looks at descriptors, so the result can be computed once and
    /// reused with every instance of the type.
    pub fn filter(&self, mut predicate: impl FnMut(&FieldDescriptor) -> bool) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|field| predicate(field))
            .map(|field| field.id)
            .collect()
    }

    /// Ids of the fields placed in group `key` at build time, in id order.
    pub fn group(&self, key: &str) -> &[FieldId] {
        self.groups.get(key).map_or(&[], Vec::as_slice)
    }

    /// Names of every non-empty group, in no particular order.
    pub fn group_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// A displayable view of the subtree rooted at `id`.
    pub fn subtree(&self, id: impl Into<FieldId>) -> Option<Subtree<'_>> {
        let id = id.into();
        self.field(id)?;
        Some(Subtree {
            descriptor: self,
            id,
        })
    }

    fn fmt_subtree(&self, id: FieldId, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.fields[id.0];
        writeln!(f, "{:indent$}{field}", "", indent = indent * 2)?;
        for child in &field.children {
            self.fmt_subtree(*child, indent + 1, f)?;
        }
        Ok(())
    }
}

/// Renders the tree, one field per line, children indented under parents.
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            self.fmt_subtree(*root, 0, f)?;
        }
        Ok(())
    }
}

/// See [`TypeDescriptor::subtree`].
pub struct Subtree<'a> {
    descriptor: &'a TypeDescriptor,
    id: FieldId,
}

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.descriptor.fmt_subtree(self.id, 0, f)
    }
}

struct TreeBuilder<'o> {
    options: &'o BuildOptions,
    fields: Vec<FieldDescriptor>,
    nested_count: usize,
    levels: usize,
    stopped: bool,
}

impl TreeBuilder<'_> {
    /// Adds the fields of `record` in pre-order and returns the ids of the
    /// ones kept at this level.
    fn walk(
        &mut self,
        record: &'static Shape,
        parent: Option<FieldId>,
        depth: usize,
    ) -> Vec<FieldId> {
        let mut ids = Vec::new();
        if depth >= self.options.max_depth {
            debug!(
                shape = %record,
                depth,
                max_depth = self.options.max_depth,
                "max depth reached, not expanding"
            );
            return ids;
        }

        for field in record.fields() {
            if self.stopped {
                break;
            }

            let (underlying, indirection) = field.shape().underlying();
            let selector = match parent {
                Some(parent) => format!("{}.{}", self.fields[parent.0].selector, field.name),
                None => field.name.to_owned(),
            };
            let id = FieldId(self.fields.len());
            let is_record = underlying.is_record();
            let descriptor = FieldDescriptor {
                id,
                parent,
                children: Vec::new(),
                subtree_end: id.0 + 1,
                nested: if is_record {
                    NonZeroUsize::new(self.nested_count).map(NestedId)
                } else {
                    None
                },
                depth,
                indirection,
                selector,
                field,
                underlying,
            };

            let policy = self
                .options
                .iterator
                .as_ref()
                .map_or(IterPolicy::Take, |iterator| iterator(&descriptor));
            if !policy.keeps_field() {
                self.stopped = policy.stops();
                continue;
            }

            if is_record {
                self.nested_count += 1;
            }
            self.fields.push(descriptor);
            self.levels = self.levels.max(depth + 1);
            ids.push(id);

            if is_record && policy.expands_children() {
                let children = self.walk(underlying, Some(id), depth + 1);
                let end = self.fields.len();
                let descriptor = &mut self.fields[id.0];
                descriptor.children = children;
                descriptor.subtree_end = end;
            }

            if policy.stops() {
                self.stopped = true;
            }
        }
        ids
    }
}
