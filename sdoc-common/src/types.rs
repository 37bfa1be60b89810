//! Domain enums shared across the workspace
//!
//! The status / stage / source strings are part of the wire and database
//! contract, so every enum here carries explicit renames rather than relying
//! on variant-name conventions alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall project status, advanced by the pipeline workers.
///
/// All values except `failed` form a total order (see [`ProjectStatus::ordinal`]);
/// `failed` is an out-of-order terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    Downloading,
    ExtractingAudio,
    Transcribing,
    Analyzing,
    Clipping,
    GeneratingSops,
    Completed,
    Failed,
}

impl ProjectStatus {
    /// Position in the pipeline's total status order.
    ///
    /// `failed` has no position: it can be entered from anywhere.
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            ProjectStatus::Pending => Some(0),
            ProjectStatus::Downloading => Some(1),
            ProjectStatus::ExtractingAudio => Some(2),
            ProjectStatus::Transcribing => Some(3),
            ProjectStatus::Analyzing => Some(4),
            ProjectStatus::Clipping => Some(5),
            ProjectStatus::GeneratingSops => Some(6),
            ProjectStatus::Completed => Some(7),
            ProjectStatus::Failed => None,
        }
    }

    /// Terminal statuses: no further pipeline progress will occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Downloading => "downloading",
            ProjectStatus::ExtractingAudio => "extracting_audio",
            ProjectStatus::Transcribing => "transcribing",
            ProjectStatus::Analyzing => "analyzing",
            ProjectStatus::Clipping => "clipping",
            ProjectStatus::GeneratingSops => "generating_sops",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single pipeline stage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a project's source video came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SourceType {
    Upload,
    Youtube,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Upload => "upload",
            SourceType::Youtube => "youtube",
        }
    }
}

impl FromStr for SourceType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(SourceType::Upload),
            "youtube" => Ok(SourceType::Youtube),
            _ => Err(crate::Error::Validation(
                "sourceType must be \"upload\" or \"youtube\"".to_string(),
            )),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven pipeline stages, in execution order.
///
/// Stage keys are SCREAMING_SNAKE on the wire and in the jobs table, matching
/// the worker contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PipelineStage {
    #[serde(rename = "DOWNLOAD")]
    #[sqlx(rename = "DOWNLOAD")]
    Download,
    #[serde(rename = "EXTRACT_AUDIO")]
    #[sqlx(rename = "EXTRACT_AUDIO")]
    ExtractAudio,
    #[serde(rename = "TRANSCRIBE")]
    #[sqlx(rename = "TRANSCRIBE")]
    Transcribe,
    #[serde(rename = "ANALYZE")]
    #[sqlx(rename = "ANALYZE")]
    Analyze,
    #[serde(rename = "CLIP")]
    #[sqlx(rename = "CLIP")]
    Clip,
    #[serde(rename = "EXTRACT_FRAMES")]
    #[sqlx(rename = "EXTRACT_FRAMES")]
    ExtractFrames,
    #[serde(rename = "GENERATE_SOPS")]
    #[sqlx(rename = "GENERATE_SOPS")]
    GenerateSops,
}

impl PipelineStage {
    /// All stages in pipeline execution order.
    pub fn all() -> [PipelineStage; 7] {
        [
            PipelineStage::Download,
            PipelineStage::ExtractAudio,
            PipelineStage::Transcribe,
            PipelineStage::Analyze,
            PipelineStage::Clip,
            PipelineStage::ExtractFrames,
            PipelineStage::GenerateSops,
        ]
    }

    /// The project-level status a project carries while this stage runs.
    ///
    /// `EXTRACT_FRAMES` has no project-level status (it runs inside the
    /// clipping phase), so its render state can only come from its own job
    /// rows or from a terminal project status.
    pub fn status_match(&self) -> Option<ProjectStatus> {
        match self {
            PipelineStage::Download => Some(ProjectStatus::Downloading),
            PipelineStage::ExtractAudio => Some(ProjectStatus::ExtractingAudio),
            PipelineStage::Transcribe => Some(ProjectStatus::Transcribing),
            PipelineStage::Analyze => Some(ProjectStatus::Analyzing),
            PipelineStage::Clip => Some(ProjectStatus::Clipping),
            PipelineStage::ExtractFrames => None,
            PipelineStage::GenerateSops => Some(ProjectStatus::GeneratingSops),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Download => "DOWNLOAD",
            PipelineStage::ExtractAudio => "EXTRACT_AUDIO",
            PipelineStage::Transcribe => "TRANSCRIBE",
            PipelineStage::Analyze => "ANALYZE",
            PipelineStage::Clip => "CLIP",
            PipelineStage::ExtractFrames => "EXTRACT_FRAMES",
            PipelineStage::GenerateSops => "GENERATE_SOPS",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
