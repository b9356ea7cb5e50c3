//! Global roles
//!
//! Roles are global and instance-independent: a person holds at most one,
//! and it grants the same baseline on every object of a given kind.
//! Instance-scoped grants come from access control roles, defined in the
//! authorization crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global system role, ordered by privilege
///
/// The ordering backs the monotonicity property of the permission model:
/// for any (kind, action) the grant set is monotone in this order, apart
/// from rows the capability matrix documents as unimplemented.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Role {
    /// May create own objects, sees nothing created by others
    Creator,
    /// Read-only access across the system
    Reader,
    /// Read and write access across the system
    Editor,
    /// Full access, including role administration
    Administrator,
}

impl Role {
    /// All roles, in privilege order
    pub const ALL: [Role; 4] = [
        Role::Creator,
        Role::Reader,
        Role::Editor,
        Role::Administrator,
    ];

    /// Canonical role name as stored in role tables
    pub fn name(&self) -> &'static str {
        match self {
            Role::Creator => "Creator",
            Role::Reader => "Reader",
            Role::Editor => "Editor",
            Role::Administrator => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_order() {
        assert!(Role::Creator < Role::Reader);
        assert!(Role::Reader < Role::Editor);
        assert!(Role::Editor < Role::Administrator);
    }

    #[test]
    fn test_names() {
        for role in Role::ALL {
            assert_eq!(role.to_string(), role.name());
        }
    }
}
