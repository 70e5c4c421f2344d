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

//! aria2 backend adapter.
//!
//! Sole owner of the JSON-RPC and notification-channel handles to the
//! engine. Lifecycle verbs become RPC calls; engine notifications and the
//! periodic progress poll become [`downpour_core::DownloadEvent`]s on a
//! bounded channel consumed by the reconciler. In-process tables map engine
//! GIDs back to download identifiers and absorb the metadata-GID swap that
//! magnet transfers perform.

mod adapter;
mod notifications;
mod poller;
mod rpc;
mod types;

pub use adapter::{Aria2Adapter, Aria2Config, EVENT_BUFFER};
