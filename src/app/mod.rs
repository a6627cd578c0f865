//! Terminal plumbing shared by the command handlers.

pub(crate) mod progress_manager;
pub(crate) mod surface;
pub(crate) mod terminal;
