//! CLI command implementations

pub mod auth;
pub mod category;
pub mod config;
pub mod link;
pub mod share;
pub mod status;
pub mod sync;
