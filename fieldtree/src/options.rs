//! Knobs that shape how a [`TypeDescriptor`](crate::TypeDescriptor) is built.

use std::sync::Arc;

use crate::FieldDescriptor;

/// Default bound on how deep nested records are expanded.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Decision returned by an iteration policy for each field, before it is
/// added to the tree.
///
/// | Policy                | Field kept | Subtree expanded | Traversal continues |
/// |-----------------------|------------|------------------|---------------------|
/// | `Take`                | yes        | yes              | yes                 |
/// | `SkipChildren`        | yes        | no               | yes                 |
/// | `Skip`                | no         | no               | yes                 |
/// | `TakeAndStop`         | yes        | yes              | no                  |
/// | `SkipChildrenAndStop` | yes        | no               | no                  |
/// | `SkipAndStop`         | no         | no               | no                  |
///
/// When a policy stops the traversal, the remaining siblings and every
/// subtree not visited yet are left out. `TakeAndStop` still expands the
/// field it was returned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterPolicy {
    /// Keep the field and expand its subtree.
    #[default]
    Take,
    /// Keep the field, but not its descendants.
    SkipChildren,
    /// Leave out the field and its descendants.
    Skip,
    /// Keep the field and its subtree, then stop.
    TakeAndStop,
    /// Keep the field without its descendants, then stop.
    SkipChildrenAndStop,
    /// Leave out the field and its descendants, then stop.
    SkipAndStop,
}

impl IterPolicy {
    /// Returns true if the field is added to the tree.
    pub const fn keeps_field(self) -> bool {
        !matches!(self, IterPolicy::Skip | IterPolicy::SkipAndStop)
    }

    /// Returns true if the field's subtree is expanded.
    pub const fn expands_children(self) -> bool {
        matches!(self, IterPolicy::Take | IterPolicy::TakeAndStop)
    }

    /// Returns true if the traversal halts after this field.
    pub const fn stops(self) -> bool {
        matches!(
            self,
            IterPolicy::TakeAndStop | IterPolicy::SkipChildrenAndStop | IterPolicy::SkipAndStop
        )
    }
}

/// Decides, per field, whether and how it enters the tree.
///
/// The descriptor it sees is provisional: its id and, for a record, its
/// nested id are the ones the field gets if it is kept, and it has no
/// children yet.
pub type IteratorFn = Arc<dyn Fn(&FieldDescriptor) -> IterPolicy + Send + Sync>;

/// Puts a field in at most one named group.
pub type GroupByFn = Arc<dyn Fn(&FieldDescriptor) -> Option<String> + Send + Sync>;

/// Options used every time a descriptor is built.
#[derive(Clone)]
pub struct BuildOptions {
    pub(crate) max_depth: usize,
    pub(crate) iterator: Option<IteratorFn>,
    pub(crate) group_by: Option<GroupByFn>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            iterator: None,
            group_by: None,
        }
    }
}

impl core::fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BuildOptions")
            .field("max_depth", &self.max_depth)
            .field("iterator", &self.iterator.is_some())
            .field("group_by", &self.group_by.is_some())
            .finish()
    }
}

impl BuildOptions {
    /// Options with every default: depth 16, take every field, no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of nesting levels expanded; fields deeper than this
    /// are silently left out.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the iteration policy.
    pub fn iterator<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> IterPolicy + Send + Sync + 'static,
    {
        self.iterator = Some(Arc::new(f));
        self
    }

    /// Sets the grouping function.
    pub fn group_by<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> Option<String> + Send + Sync + 'static,
    {
        self.group_by = Some(Arc::new(f));
        self
    }

    /// Returns the configured depth bound.
    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }
}
