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

//! Engine-agnostic download interfaces and DTOs shared across the workspace.

mod error;
mod event;
mod fingerprint;
mod model;
mod repository;
mod service;

pub use error::{Error, ErrorKind, Result};
pub use event::DownloadEvent;
pub use fingerprint::{fingerprint, lexical_clean, normalise_source, normalise_target};
pub use model::{DesiredStatus, Download, DownloadFile, Status};
pub use repository::{Mutation, Repository};
pub use service::{AddOutcome, DownloadEngine, DownloadInspector, DownloadWorkflow, NewDownload};
