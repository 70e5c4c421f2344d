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

//! Repository implementations for the download catalog: an in-memory store
//! for tests and single-node deployments, and a Postgres store whose
//! fingerprint uniqueness constraint enforces idempotent creation
//! atomically.

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;
