//! Bridge between the UI thread and the backend worker that owns the controllers.

pub mod commands;
pub mod runtime;
