//! TrimDesk Library
//!
//! Timeline clip arrangement, stream-copy trim preview/export through an
//! external ffmpeg engine, and per-user saved projects behind a single
//! access policy.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Clip, ClipId, MediaType, SourceRef, TimeSpec, TrackId, TrimRange};
pub use domain::timeline::TimelineController;
pub use error::{TrimDeskError, TrimDeskResult};
