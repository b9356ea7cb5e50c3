//! Access control roles
//!
//! An access control role (ACR) is a named capability context scoped to one
//! object kind, assignable to a person on a specific object instance.
//! Holding an ACR on one object grants nothing elsewhere except through
//! downward propagation along the workflow hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_core::{ObjectId, ObjectKind, PersonId, Role};

/// An access control role definition: a named capability per object kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessControlRole {
    /// Object kind the role is scoped to
    pub object_kind: ObjectKind,
    /// Role name, unique within the kind
    pub name: String,
}

impl AccessControlRole {
    /// Create an ACR definition
    pub fn new(object_kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            object_kind,
            name: name.into(),
        }
    }

    /// The built-in workflow Admin role
    pub fn workflow_admin() -> Self {
        Self::new(ObjectKind::Workflow, "Admin")
    }
}

impl fmt::Display for AccessControlRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.object_kind, self.name)
    }
}

/// An ACL entry: a person holding an ACR on a specific object instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Person holding the role
    pub person: PersonId,
    /// The access control role held
    pub acr: AccessControlRole,
    /// Object instance the role is held on
    pub object: ObjectId,
}

/// One effective role a person holds with respect to a target object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleAssignment {
    /// The person's global role, instance-independent
    Global(Role),
    /// An ACR held on the target object or one of its ancestors
    Custom {
        /// The access control role
        acr: AccessControlRole,
        /// Object the ACR is held on (the target itself or an ancestor)
        object: ObjectId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_admin_definition() {
        let acr = AccessControlRole::workflow_admin();
        assert_eq!(acr.object_kind, ObjectKind::Workflow);
        assert_eq!(acr.name, "Admin");
        assert_eq!(acr.to_string(), "Workflow/Admin");
    }
}
