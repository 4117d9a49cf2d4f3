//! # Weave Core (The Quest Weaver)
//!
//! Procedural quest generation on top of `weave_world`. Each cycle the weaver
//! asks its template factories for quest drafts, resolves their entity
//! requirements, scores them and commits at most one (or every priority
//! draft) into the world.
//!
//! ## Core Components
//!
//! - **graph**: Constraint graph of property alternatives and its solver
//! - **selection**: Candidate scoring and randomized selection
//! - **quest**: Quest data, kinds, lifecycle and the quest registry
//! - **template**: Template collaborators that offer quest drafts
//! - **story**: Story collaborators that write narrative text
//! - **weaver**: The facade that runs generation cycles and ticks
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: Every random draw goes through one seeded stream, in a fixed order
//! - **Collaborator-Driven**: Templates and stories are traits; content lives outside this crate
//! - **Resumable**: The whole state can be captured as plain data and restored

pub mod config;
pub mod error;
pub mod graph;
pub mod quest;
pub mod random;
pub mod selection;
pub mod story;
pub mod template;
pub mod weaver;

pub use config::*;
pub use error::*;
pub use graph::*;
pub use quest::*;
pub use random::*;
pub use selection::*;
pub use story::*;
pub use template::*;
pub use weaver::*;
