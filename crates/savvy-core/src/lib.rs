//! Savvy Core Library
//!
//! This crate provides the core functionality for Savvy, a read-later
//! manager for links, images, and notes organized into categories.
//!
//! # Architecture
//!
//! Persistence is delegated to a hosted data service (session auth, table
//! CRUD with row-level ownership, and an object-storage bucket). The
//! `Store` keeps a local mirror of remote state and an on-disk snapshot
//! so queries work without a round-trip.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open(Config::load()?).await?;
//! store.refresh().await?;
//!
//! let mut link = Link::new("https://example.com");
//! link.set_title("Example");
//! store.add_link(link).await?;
//!
//! let unread = store.filtered(&LinkFilter::default());
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Data structures for links and categories
//! - `filter`: Pure filtering and search over the link list
//! - `remote`: Client for the hosted data service
//! - `mirror`: On-disk snapshot of the last fetch
//! - `config`: Application configuration

pub mod config;
pub mod filter;
pub mod mirror;
pub mod models;
pub mod remote;
pub mod store;

pub use config::Config;
pub use filter::{LinkFilter, ReadFilter};
pub use mirror::Mirror;
pub use models::{Category, Link, LinkType};
pub use remote::{AuthUser, RemoteClient, RemoteError, Session};
pub use store::{CategoryDelete, Store};
