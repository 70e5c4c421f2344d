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

//! HTTP surface for the downpour control plane.
//!
//! Requests funnel into the lifecycle workflow and inspector traits; error
//! kinds from the core taxonomy map onto response statuses in one place.

mod auth;
mod errors;
mod handlers;
mod health;
mod models;
mod router;
mod state;

pub use router::ApiServer;
pub use state::DownloadHandles;
