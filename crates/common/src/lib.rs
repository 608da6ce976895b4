//! Cross-cutting helpers shared by the CMS crates: logging bootstrap,
//! runtime environment checks, HTTP metrics and small shared types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
