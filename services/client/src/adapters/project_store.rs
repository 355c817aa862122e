//! services/client/src/adapters/project_store.rs
//!
//! This module contains the file-backed implementation of the `ProjectStore`
//! port. The whole project list is kept as one JSON blob under a fixed key,
//! with no schema versioning or migration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use openhands_client_core::domain::{NovelChapter, NovelProject};
use openhands_client_core::ports::{PortError, PortResult, ProjectStore};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key the project list is stored under.
pub const STORAGE_KEY: &str = "novel_projects";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Stores the project list in `<dir>/novel_projects.json`.
#[derive(Clone, Debug)]
pub struct JsonFileProjectStore {
    path: PathBuf,
}

impl JsonFileProjectStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//=========================================================================================
// Stored Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterRecord {
    id: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    word_count: usize,
    created_at: DateTime<Utc>,
}
impl ChapterRecord {
    fn from_domain(chapter: &NovelChapter) -> Self {
        Self {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            content: chapter.content.clone(),
            word_count: chapter.word_count,
            created_at: chapter.created_at,
        }
    }

    fn to_domain(self) -> NovelChapter {
        NovelChapter {
            id: self.id,
            title: self.title,
            content: self.content,
            word_count: self.word_count,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    id: String,
    title: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    chapters: Vec<ChapterRecord>,
    #[serde(default)]
    total_words: usize,
    created_at: DateTime<Utc>,
}
impl ProjectRecord {
    fn from_domain(project: &NovelProject) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            genre: project.genre.clone(),
            description: project.description.clone(),
            chapters: project.chapters.iter().map(ChapterRecord::from_domain).collect(),
            total_words: project.total_words,
            created_at: project.created_at,
        }
    }

    fn to_domain(self) -> NovelProject {
        NovelProject {
            id: self.id,
            title: self.title,
            genre: self.genre,
            description: self.description,
            chapters: self.chapters.into_iter().map(ChapterRecord::to_domain).collect(),
            total_words: self.total_words,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ProjectStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProjectStore for JsonFileProjectStore {
    async fn load_projects(&self) -> PortResult<Vec<NovelProject>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No saved projects at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };

        let records: Vec<ProjectRecord> = serde_json::from_str(&raw).map_err(|e| {
            PortError::Storage(format!("corrupt {STORAGE_KEY} blob: {e}"))
        })?;
        Ok(records.into_iter().map(ProjectRecord::to_domain).collect())
    }

    async fn save_projects(&self, projects: &[NovelProject]) -> PortResult<()> {
        let records: Vec<ProjectRecord> = projects.iter().map(ProjectRecord::from_domain).collect();
        let blob =
            serde_json::to_string(&records).map_err(|e| PortError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?;
        }

        // Write next to the target and rename, so a crash never leaves half a blob.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;

        debug!("Saved {} projects to {}", projects.len(), self.path.display());
        Ok(())
    }
}
