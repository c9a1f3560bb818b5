//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own backend protocol details (endpoint paths, envelope
//! interpretation, token handling) so route handlers stay focused on request
//! parsing and status mapping.

pub mod auth;
pub mod backend;
pub mod content;
pub mod fetch;
pub mod session;
