//! Launches privileged diagnosis jobs for validated dataset names.
//!
//! A request flows through four stages, each short-circuiting on error:
//! [`identifier::validate`], [`log_sink::resolve_sink`], [`context::build`]
//! and [`launcher::launch`]. [`DiagnosisService`] chains them.

pub mod context;
pub mod error;
pub mod identifier;
pub mod launcher;
pub mod log_sink;
pub mod service;

pub use context::{ExecutionContext, ExecutionPolicy};
pub use error::{LaunchError, SinkError, SubmitError, ValidationError};
pub use identifier::{validate, SafeIdentifier, MAX_DATASET_LEN};
pub use log_sink::LogSink;
pub use service::{DiagnosisService, Submission};
