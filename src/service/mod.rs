//! Service layer for the notes server.
//!
//! Services are constructed explicitly and shared through `Arc` with the MCP
//! handlers and the dev dashboard.

pub mod notes;

pub use notes::{Note, NotesService};
