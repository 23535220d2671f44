//! # engine_scene
//!
//! The transform hierarchy. A [`Scene`] maps each attached
//! [`Entity`](engine_core::Entity) to a node holding a local and a world
//! matrix, keeps the nodes in dense swap-compacted columns, and recomputes
//! world matrices parent-before-child whenever a local transform or a parent
//! changes.
//!
//! Changed entities are collected per frame and published in one batch to
//! every [`TransformUpdateReceiver`] via [`Scene::notify_updated_transforms`].

pub mod fanout;
pub mod scene;

pub use fanout::{TransformUpdateReceiver, UpdatedEntities};
pub use scene::{Children, Scene, SceneObjectId};
