#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Downpour application wiring.
//!
//! Layout: `service.rs` (the lifecycle façade, sole external mutator),
//! `reconciler.rs` (the single event consumer), `bootstrap.rs` (environment
//! loading and task wiring).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level errors.
pub mod error;
/// Event-to-repository reconciliation.
pub mod reconciler;
/// Lifecycle service façade.
pub mod service;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
pub use reconciler::Reconciler;
pub use service::LifecycleService;
