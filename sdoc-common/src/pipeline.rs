//! Stage derivation: per-stage render state from project status + job rows
//!
//! This is the one place the system reconciles partial, possibly inconsistent
//! pipeline data (a stage's job row may not exist yet, or may lag the
//! project's aggregate status) into something renderable. It is pure and
//! infallible: every stage always derives to exactly one state.

use serde::{Deserialize, Serialize};

use crate::db::models::Job;
use crate::types::{JobStatus, PipelineStage, ProjectStatus};

/// Render state of one pipeline stage in the project stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Completed,
    Active,
    Failed,
    Pending,
}

/// One derived stepper entry.
///
/// `progress` and `error_message` come from the stage's job row when one
/// exists, so the UI can show a percentage or failure detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub stage: PipelineStage,
    pub state: StageState,
    pub progress: Option<i64>,
    pub error_message: Option<String>,
}

/// Derive the render state of every pipeline stage.
///
/// Per stage, in order:
/// 1. The stage's own job row wins: `completed`/`processing`/`failed` map to
///    Completed/Active/Failed. When retries left multiple rows for one stage,
///    the most recently created row wins (ties resolve to the row scanned
///    last). A `pending` job row carries no information beyond the project
///    status and falls through.
/// 2. A terminal project status projects onto every remaining stage.
/// 3. The stage whose status-match equals the project status is Active.
/// 4. Stages whose status-match is strictly earlier in the status order than
///    the project's position are Completed.
/// 5. Everything else is Pending.
///
/// Each stage's state depends only on the project status and its own job
/// rows, never on sibling stages.
pub fn derive_stage_states(status: ProjectStatus, jobs: &[Job]) -> Vec<StageView> {
    PipelineStage::all()
        .iter()
        .map(|&stage| derive_stage(stage, status, jobs))
        .collect()
}

fn derive_stage(stage: PipelineStage, status: ProjectStatus, jobs: &[Job]) -> StageView {
    // Most recently created job row for this stage; max_by keeps the last of
    // equal elements, which resolves created_at ties to scan order.
    let job = jobs
        .iter()
        .filter(|j| j.stage == stage)
        .max_by(|a, b| a.created_at.cmp(&b.created_at));

    let state = job
        .and_then(|j| match j.status {
            JobStatus::Completed => Some(StageState::Completed),
            JobStatus::Processing => Some(StageState::Active),
            JobStatus::Failed => Some(StageState::Failed),
            JobStatus::Pending => None,
        })
        .unwrap_or_else(|| derive_from_project_status(stage, status));

    StageView {
        stage,
        state,
        progress: job.map(|j| j.progress),
        error_message: job.and_then(|j| j.error_message.clone()),
    }
}

fn derive_from_project_status(stage: PipelineStage, status: ProjectStatus) -> StageState {
    match status {
        ProjectStatus::Completed => return StageState::Completed,
        ProjectStatus::Failed => return StageState::Failed,
        _ => {}
    }

    let Some(matched) = stage.status_match() else {
        // No project-level status for this stage (frame extraction): without
        // a job row or a terminal project it stays pending.
        return StageState::Pending;
    };

    if matched == status {
        return StageState::Active;
    }

    match (status.ordinal(), matched.ordinal()) {
        (Some(current), Some(own)) if current > own => StageState::Completed,
        _ => StageState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn job(stage: PipelineStage, status: JobStatus) -> Job {
        Job {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: "p1".to_string(),
            stage,
            status,
            progress: 0,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    fn state_of(views: &[StageView], stage: PipelineStage) -> StageState {
        views.iter().find(|v| v.stage == stage).unwrap().state
    }

    #[test]
    fn output_is_total_over_all_stages() {
        let views = derive_stage_states(ProjectStatus::Pending, &[]);
        assert_eq!(views.len(), PipelineStage::all().len());
        for (view, stage) in views.iter().zip(PipelineStage::all()) {
            assert_eq!(view.stage, stage);
            assert_eq!(view.state, StageState::Pending);
        }
    }

    #[test]
    fn completed_project_completes_every_stage_without_a_failed_job() {
        let views = derive_stage_states(ProjectStatus::Completed, &[]);
        assert!(views.iter().all(|v| v.state == StageState::Completed));
    }

    #[test]
    fn failed_project_fails_stages_without_job_rows() {
        let jobs = vec![job(PipelineStage::Download, JobStatus::Completed)];
        let views = derive_stage_states(ProjectStatus::Failed, &jobs);
        assert_eq!(state_of(&views, PipelineStage::Download), StageState::Completed);
        for stage in &PipelineStage::all()[1..] {
            assert_eq!(state_of(&views, *stage), StageState::Failed);
        }
    }

    #[test]
    fn failed_job_overrides_completed_project() {
        let jobs = vec![job(PipelineStage::Transcribe, JobStatus::Failed)];
        let views = derive_stage_states(ProjectStatus::Completed, &jobs);
        assert_eq!(state_of(&views, PipelineStage::Transcribe), StageState::Failed);
        assert_eq!(state_of(&views, PipelineStage::Download), StageState::Completed);
    }

    #[test]
    fn ordinal_fallback_while_analyzing() {
        let views = derive_stage_states(ProjectStatus::Analyzing, &[]);
        assert_eq!(state_of(&views, PipelineStage::Download), StageState::Completed);
        assert_eq!(state_of(&views, PipelineStage::ExtractAudio), StageState::Completed);
        assert_eq!(state_of(&views, PipelineStage::Transcribe), StageState::Completed);
        assert_eq!(state_of(&views, PipelineStage::Analyze), StageState::Active);
        assert_eq!(state_of(&views, PipelineStage::Clip), StageState::Pending);
        assert_eq!(state_of(&views, PipelineStage::ExtractFrames), StageState::Pending);
        assert_eq!(state_of(&views, PipelineStage::GenerateSops), StageState::Pending);
    }

    #[test]
    fn processing_job_marks_stage_active() {
        let mut j = job(PipelineStage::ExtractFrames, JobStatus::Processing);
        j.progress = 40;
        let views = derive_stage_states(ProjectStatus::Clipping, &[j]);
        let view = views
            .iter()
            .find(|v| v.stage == PipelineStage::ExtractFrames)
            .unwrap();
        assert_eq!(view.state, StageState::Active);
        assert_eq!(view.progress, Some(40));
    }

    #[test]
    fn pending_job_row_falls_through_to_project_status() {
        let jobs = vec![job(PipelineStage::Download, JobStatus::Pending)];
        let views = derive_stage_states(ProjectStatus::Transcribing, &jobs);
        // Project already moved past downloading; the stale pending row is
        // ignored in favor of the ordinal fallback.
        assert_eq!(state_of(&views, PipelineStage::Download), StageState::Completed);
    }

    #[test]
    fn most_recent_job_row_wins_on_retry() {
        let mut failed = job(PipelineStage::Analyze, JobStatus::Failed);
        failed.created_at = Utc::now() - Duration::seconds(60);
        let retry = job(PipelineStage::Analyze, JobStatus::Processing);
        // Scan order deliberately reversed from creation order.
        let views = derive_stage_states(ProjectStatus::Analyzing, &[retry.clone(), failed]);
        assert_eq!(state_of(&views, PipelineStage::Analyze), StageState::Active);
    }

    #[test]
    fn created_at_ties_resolve_to_scan_order() {
        let now = Utc::now();
        let mut first = job(PipelineStage::Clip, JobStatus::Failed);
        first.created_at = now;
        let mut second = job(PipelineStage::Clip, JobStatus::Completed);
        second.created_at = now;
        let views = derive_stage_states(ProjectStatus::Clipping, &[first, second]);
        assert_eq!(state_of(&views, PipelineStage::Clip), StageState::Completed);
    }
}
