//! # engine_core
//!
//! Identity primitives shared by every engine subsystem.
//!
//! This crate provides:
//!
//! - [`Entity`]: a packed 32-bit id with 22 index bits and 8 generation bits.
//! - [`EntityRegistry`]: issues entities and recycles their indices through
//!   a FIFO queue so stale ids stay detectable for as long as possible.
//! - [`SlotMap`] / [`SlotId`]: a generational pool container used for
//!   resource storage.
//! - [`CoreError`]: the error type of every checked lookup.

pub mod entity;
pub mod error;
pub mod slot_map;

pub use entity::{Entity, EntityRegistry, MINIMUM_FREE_INDICES};
pub use error::{CoreError, Result};
pub use slot_map::{SlotId, SlotMap};
