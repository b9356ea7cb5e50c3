//! Static grant tables
//!
//! The baseline table maps (global role, object kind, action) to a grant,
//! independent of the object instance. The ACR table maps an access control
//! role to the grants it carries on its scope kind and every kind below it.
//!
//! Baselines are layered so the superset property holds by construction:
//! Editor extends Reader, Administrator extends Editor. Creator sits
//! outside the chain with a single grant (creating workflows), which is
//! also the one documented gap in the role ordering: Reader's workflow
//! `create` is denied in the shipped product and tracked as unimplemented
//! in the capability matrix.
//!
//! Several rows deliberately deny actions to roles that look like they
//! should hold them (Administrator cannot update a Cycle, Editor cannot
//! delete a CycleTaskGroup). These mirror shipped behavior and are covered
//! by the matrix with an "unimplemented" annotation; they are
//! configuration, not defects in the evaluator.

use crate::acr::AccessControlRole;
use trellis_core::{Action, ObjectKind, Role};

/// Baseline grant for a global role, independent of instance
pub fn baseline_allows(role: Role, kind: ObjectKind, action: Action) -> bool {
    match role {
        Role::Creator => creator_allows(kind, action),
        Role::Reader => reader_allows(kind, action),
        Role::Editor => editor_allows(kind, action),
        Role::Administrator => administrator_allows(kind, action),
    }
}

/// Grant carried by an ACR on kinds within its scope
///
/// The caller is responsible for scope checks (the target kind must be the
/// ACR's kind or a descendant of it). The workflow Admin ACR carries the
/// full action set on its subtree; unknown ACRs carry nothing.
pub fn acr_allows(acr: &AccessControlRole, kind: ObjectKind, action: Action) -> bool {
    let _ = (kind, action);
    acr.object_kind == ObjectKind::Workflow && acr.name == "Admin"
}

fn creator_allows(kind: ObjectKind, action: Action) -> bool {
    // Creators only ever see objects they own; against someone else's
    // workflow scope the one grant left is creating workflows of their own.
    matches!((kind, action), (ObjectKind::Workflow, Action::Create))
}

fn reader_allows(kind: ObjectKind, action: Action) -> bool {
    match action {
        Action::Read | Action::ReadRevisions | Action::ReadComment | Action::ReadMappedControl => {
            true
        }
        Action::Clone => kind == ObjectKind::Workflow,
        _ => false,
    }
}

fn editor_allows(kind: ObjectKind, action: Action) -> bool {
    if reader_allows(kind, action) {
        return true;
    }
    match kind {
        ObjectKind::Workflow => matches!(
            action,
            Action::Create
                | Action::Update
                | Action::Delete
                | Action::Activate
                | Action::AssignWfRole
        ),
        ObjectKind::TaskGroup => matches!(
            action,
            Action::Create
                | Action::Update
                | Action::Delete
                | Action::Clone
                | Action::Assign
                | Action::MapControl
                | Action::MapCreatedControl
                | Action::UpmapControl
        ),
        ObjectKind::TaskGroupTask => matches!(
            action,
            Action::Create | Action::Update | Action::Delete | Action::Assign
        ),
        // Cycle-level containers are generated by activation: editors work
        // the tasks inside them but cannot rewrite or remove the containers.
        ObjectKind::Cycle | ObjectKind::CycleTaskGroup => false,
        ObjectKind::CycleTask => matches!(
            action,
            Action::Create
                | Action::Update
                | Action::AddComment
                | Action::DeleteComment
                | Action::MapControl
                | Action::MapCreatedControl
                | Action::UpmapControl
                | Action::Start
                | Action::End
                | Action::Verify
                | Action::Decline
                | Action::Deprecate
                | Action::Restore
                | Action::Assign
                | Action::BulkUpdate
        ),
        ObjectKind::Comment | ObjectKind::Control => false,
    }
}

fn administrator_allows(kind: ObjectKind, action: Action) -> bool {
    if editor_allows(kind, action) {
        return true;
    }
    match kind {
        ObjectKind::Cycle => action == Action::End,
        ObjectKind::CycleTask => action == Action::Delete,
        _ => false,
    }
}
