//! Database access layer
//!
//! One module per entity, following the store's ownership hierarchy
//! (projects -> {lessons -> {frames}, jobs}). The mutators beyond project
//! create/delete exist for the pipeline workers, which progress projects
//! through stages by updating job rows and inserting lessons/frames.

pub mod frames;
pub mod jobs;
pub mod lessons;
pub mod projects;
