//! Core types - pure abstractions shared across the codebase.

mod mapping;
mod state;

pub use mapping::Mapping;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
