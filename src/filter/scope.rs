//! Scope Tracker: which compiled filter nodes currently have an open
//! activation window.

use std::fmt;

/// Compact handle for one compiled filter node's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope {}", self.0)
    }
}

/// One flag per scope. A scope is active between its matching start tag
/// and the next end tag with the same name.
///
/// Sized once at compile time and reset in place between documents.
#[derive(Debug, Clone, Default)]
pub struct ScopeTracker {
    active: Vec<bool>,
}

impl ScopeTracker {
    pub fn new(scope_count: usize) -> Self {
        Self {
            active: vec![false; scope_count],
        }
    }

    pub fn is_active(&self, id: ScopeId) -> bool {
        self.active[id.0]
    }

    /// Root handlers (no parent scope) are always allowed to run.
    pub fn gate_open(&self, parent: Option<ScopeId>) -> bool {
        parent.is_none_or(|parent| self.is_active(parent))
    }

    /// Activate the scope. Re-activating an active scope changes nothing.
    pub fn enter(&mut self, id: ScopeId) {
        self.active[id.0] = true;
    }

    /// Deactivate the scope whatever its history. Returns whether it was
    /// active.
    pub fn leave(&mut self, id: ScopeId) -> bool {
        std::mem::replace(&mut self.active[id.0], false)
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|active| **active).count()
    }

    pub fn reset(&mut self) {
        self.active.fill(false);
    }
}
