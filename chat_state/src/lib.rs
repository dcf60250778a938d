//! # Chat State
//!
//! The session data model for the conversation runtime. Holds everything
//! that is stored per (user, character) pair and contains no rule logic.
//!
//! ## Core Components
//!
//! - **variables**: The Variable Store - named runtime values with default-on-miss reads
//! - **session**: Session identity, ending progress, and one-shot trigger bookkeeping
//! - **persist**: The load/save boundary and the stores that implement it
//! - **config**: TOML runtime configuration

pub mod config;
pub mod persist;
pub mod session;
pub mod variables;

pub use config::*;
pub use persist::*;
pub use session::*;
pub use variables::*;
