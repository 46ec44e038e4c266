//! Errors from resolving managers and moving bindings.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Null argument | Binding has no live data source | Rebind stops after detach |
//! | Missing member | Path segment not in parent schema | No slot is cached |
//! | Binding cycle | Property chain loops back on itself | Nothing attached |
//! | Duplicate binding | Binding already held by the manager | Collection unchanged |
//! | Foreign binding | Binding not held by the manager | Collection unchanged |

use thiserror::Error;

/// Result alias for binding operations.
pub type Result<T, E = BindingError> = std::result::Result<T, E>;

/// Errors raised by [`BindingContext`](crate::BindingContext) and
/// [`BindingManager`](crate::BindingManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A required argument was absent.
    #[error("argument '{name}' must not be null")]
    NullArgument { name: &'static str },

    /// A member-path segment is not exposed by the parent manager.
    #[error("cannot create a child list for field '{member}'")]
    MissingMember { member: String },

    /// Attaching the binding would make a property depend on itself.
    #[error("data binding cycle detected on property '{property}'")]
    BindingCycle { property: String },

    /// The binding is already held by this manager.
    #[error("binding for property '{property}' is already in this collection")]
    DuplicateBinding { property: String },

    /// The binding is not held by the manager it was removed from.
    #[error("binding for property '{property}' does not belong to this collection")]
    ForeignBinding { property: String },
}
