//! # SmartDocs Common Library
//!
//! Shared code for the SmartDocs pipeline tracker:
//! - Database models, schema initialization and queries
//! - Domain enums (project status, job status, pipeline stages)
//! - Stage derivation (per-stage render state from project + job rows)
//! - Storage path layout
//! - Configuration resolution
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod types;

pub use error::{Error, Result};
pub use types::{JobStatus, PipelineStage, ProjectStatus, SourceType};
