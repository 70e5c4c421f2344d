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

//! Binary entrypoint that wires the downpour services together and blocks
//! until shutdown.

use downpour_app::AppResult;

#[tokio::main]
async fn main() -> AppResult<()> {
    downpour_app::run_app().await
}
