//! Shared helpers for unit tests.

pub mod engine;
pub mod epub_fixture;
pub mod socket_guard;
