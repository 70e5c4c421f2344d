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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Filesystem cleanup for deleted downloads.
//!
//! Removal is planned before any mutation: every candidate path is checked
//! against the declared target directory, and a single violation aborts the
//! whole operation. Payload removal tolerates already-missing paths so a
//! failed delete can be retried safely.

mod error;
mod service;

pub use error::{FsOpsError, FsOpsResult};
pub use service::{RemovalReport, RemovalRequest, remove_download, strip_leading_tags};
