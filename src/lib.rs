//! Finds debug print statements in source files by reconstructing multi-line
//! calls from delimiter balance and classifying them by call target and
//! literal content.

pub mod batch;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod scanner;

pub use batch::{Batch, BatchReport, FileFailure, FileScan, Target};
pub use config::{ConfigOverlay, DetectionMode, Language, ScanConfig};
pub use dispatch::{Action, Applied, Collector, Dispatch, Rewrite};
pub use error::{ConfigError, DbgcError, ScanError};
pub use scanner::{scan_lines, scan_source, Classification, Reason, SourceLine, Statement};

/// Log to stderr, filtered by `RUST_LOG` (default `dbgc=warn`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dbgc=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
