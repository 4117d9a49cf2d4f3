//! # Weave World
//!
//! The world side of the quest weaver - entities, per-entity metadata and the
//! transactional world model that applies create/update/delete/keep actions.
//! This crate holds no quest logic and draws no random numbers.

pub mod actions;
pub mod entities;
pub mod error;
pub mod world_model;

pub use actions::*;
pub use entities::*;
pub use error::*;
pub use world_model::*;
