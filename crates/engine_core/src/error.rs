//! Core error types.

use crate::entity::Entity;

/// Errors returned by the checked registry and scene graph APIs.
///
/// Running out of storage is never reported: every container grows on
/// demand, so only handle and hierarchy misuse surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A handle whose generation (or, for scene objects, whose owning entity)
    /// no longer matches live storage.
    #[error("stale {kind} handle (index {index}, generation {generation})")]
    StaleHandle {
        /// What kind of handle was used, e.g. a slot map's value type.
        kind: &'static str,
        /// The slot index carried by the handle.
        index: u32,
        /// The generation carried by the handle.
        generation: u32,
    },

    /// Parenting a scene object to itself or to one of its descendants.
    #[error("cannot parent scene object {child} under {parent}: would create a cycle")]
    InvalidHierarchy {
        /// Entity of the node being moved.
        child: Entity,
        /// Entity of the requested parent.
        parent: Entity,
    },

    /// The entity has no node in the scene graph.
    #[error("{entity} has no scene object")]
    NotAttached {
        /// The entity that was looked up.
        entity: Entity,
    },
}

/// Alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;
