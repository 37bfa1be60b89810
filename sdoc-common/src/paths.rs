//! Storage path layout
//!
//! The filesystem contract shared with the pipeline workers:
//!
//! ```text
//! {root}/projects/{projectId}/
//!     video.<ext>
//!     audio.mp3
//!     transcript.json
//!     analysis.json
//!     lessons/{lessonId}/
//!         clip.mp4
//!         frames/
//!         sop.json
//!         sop.html
//! ```
//!
//! Paths recorded in the database are absolute server paths; clients see the
//! same tree read-only under the `/storage` static prefix.

use std::path::{Path, PathBuf};

use crate::Result;

/// Path layout rooted at the configured storage directory.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join("projects").join(project_id)
    }

    pub fn video_path(&self, project_id: &str, ext: &str) -> PathBuf {
        self.project_dir(project_id).join(format!("video.{ext}"))
    }

    pub fn audio_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("audio.mp3")
    }

    pub fn transcript_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("transcript.json")
    }

    pub fn analysis_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("analysis.json")
    }

    pub fn lesson_dir(&self, project_id: &str, lesson_id: &str) -> PathBuf {
        self.project_dir(project_id).join("lessons").join(lesson_id)
    }

    pub fn clip_path(&self, project_id: &str, lesson_id: &str) -> PathBuf {
        self.lesson_dir(project_id, lesson_id).join("clip.mp4")
    }

    pub fn frames_dir(&self, project_id: &str, lesson_id: &str) -> PathBuf {
        self.lesson_dir(project_id, lesson_id).join("frames")
    }

    pub fn sop_json_path(&self, project_id: &str, lesson_id: &str) -> PathBuf {
        self.lesson_dir(project_id, lesson_id).join("sop.json")
    }

    pub fn sop_html_path(&self, project_id: &str, lesson_id: &str) -> PathBuf {
        self.lesson_dir(project_id, lesson_id).join("sop.html")
    }

    /// Create the project's storage directory (and parents) if missing.
    pub fn provision_project_dir(&self, project_id: &str) -> Result<PathBuf> {
        let dir = self.project_dir(project_id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Recursively remove the project's storage directory.
    ///
    /// A missing directory is not an error (nothing was ever written).
    pub fn remove_project_dir(&self, project_id: &str) -> std::io::Result<()> {
        let dir = self.project_dir(project_id);
        match std::fs::remove_dir_all(&dir) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_worker_contract() {
        let layout = StorageLayout::new("/srv/sdoc/storage");
        assert_eq!(
            layout.video_path("p1", "mp4"),
            PathBuf::from("/srv/sdoc/storage/projects/p1/video.mp4")
        );
        assert_eq!(
            layout.audio_path("p1"),
            PathBuf::from("/srv/sdoc/storage/projects/p1/audio.mp3")
        );
        assert_eq!(
            layout.sop_html_path("p1", "l1"),
            PathBuf::from("/srv/sdoc/storage/projects/p1/lessons/l1/sop.html")
        );
        assert_eq!(
            layout.frames_dir("p1", "l1"),
            PathBuf::from("/srv/sdoc/storage/projects/p1/lessons/l1/frames")
        );
    }

    #[test]
    fn provision_and_remove_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(tmp.path());

        let dir = layout.provision_project_dir("p1").unwrap();
        assert!(dir.is_dir());
        // Idempotent
        layout.provision_project_dir("p1").unwrap();

        layout.remove_project_dir("p1").unwrap();
        assert!(!dir.exists());
        // Removing a missing directory is fine
        layout.remove_project_dir("p1").unwrap();
    }
}
