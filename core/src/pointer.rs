//! Active-workspace pointer: a per-session hint naming the workspace the
//! caller was last operating in.
//!
//! RULE: The pointer only ever selects among memberships the caller
//! already holds. It is reconciled against the store on every request and
//! is never consulted for authorization.

use crate::types::WorkspaceId;

pub trait WorkspacePointer {
    fn get(&self) -> Option<WorkspaceId>;
    fn set(&mut self, workspace_id: &str);
    fn clear(&mut self);
}

/// Cookie-style pointer holding a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookiePointer {
    value: Option<WorkspaceId>,
    writes: u32,
}

impl CookiePointer {
    pub fn new(value: Option<&str>) -> Self {
        Self {
            value: value.map(String::from),
            writes: 0,
        }
    }

    /// Number of times the value was rewritten since construction.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl WorkspacePointer for CookiePointer {
    fn get(&self) -> Option<WorkspaceId> {
        self.value.clone()
    }

    fn set(&mut self, workspace_id: &str) {
        self.value = Some(workspace_id.to_string());
        self.writes += 1;
    }

    fn clear(&mut self) {
        self.value = None;
        self.writes += 1;
    }
}
