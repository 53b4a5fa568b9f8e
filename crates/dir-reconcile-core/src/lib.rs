pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod model;
pub mod platform;
pub mod progress;
pub mod scanner;

pub use config::AppConfig;
pub use engine::{reconcile, ReconcileEngine};
pub use error::Error;
pub use hasher::{content_equals, fingerprint, ContentIdentity, Fingerprint, HashAlgorithm};
pub use model::{
    FileError, FileOperation, IdentityPolicy, Outcome, OutcomeKind, ReconcileOptions,
    RunSummary, SourceDisposition,
};
pub use progress::{ProgressReporter, SilentReporter};
