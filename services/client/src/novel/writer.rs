//! services/client/src/novel/writer.rs
//!
//! The novel writer: a list of projects with chapters, persisted through the
//! `ProjectStore` port, with optional AI drafting through the backend.

use openhands_client_core::{
    domain::{NovelChapter, NovelProject},
    ports::{BackendApi, PortError, PortResult, ProjectStore},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::adapters::http::endpoints;

/// Shown when the backend answered without any generated content.
pub const GENERATION_PLACEHOLDER: &str = "AI generated content will appear here...";

/// Shown when the generation request failed.
pub const GENERATION_UNAVAILABLE: &str =
    "Sorry, AI generation is currently unavailable. Please try again later.";

/// Wraps a user prompt into the drafting instruction sent to the backend.
pub fn generation_message(prompt: &str) -> String {
    format!(
        "Write a creative novel chapter or story segment based on this prompt: {prompt}. \
         Make it engaging, descriptive, and around 500-800 words."
    )
}

pub struct NovelWriter {
    store: Arc<dyn ProjectStore>,
    backend: Arc<dyn BackendApi>,
    projects: Vec<NovelProject>,
    current: Option<String>,
}

impl NovelWriter {
    pub fn new(store: Arc<dyn ProjectStore>, backend: Arc<dyn BackendApi>) -> Self {
        Self {
            store,
            backend,
            projects: Vec::new(),
            current: None,
        }
    }

    /// Replaces the in-memory list with what the store holds.
    pub async fn load(&mut self) -> PortResult<usize> {
        self.projects = self.store.load_projects().await?;
        self.current = None;
        info!("Loaded {} novel projects.", self.projects.len());
        Ok(self.projects.len())
    }

    /// Writes the whole list back to the store.
    pub async fn save(&self) -> PortResult<()> {
        self.store.save_projects(&self.projects).await
    }

    pub fn projects(&self) -> &[NovelProject] {
        &self.projects
    }

    pub fn current(&self) -> Option<&NovelProject> {
        let id = self.current.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Adds an untitled project and makes it current.
    pub fn create_project(&mut self) -> &NovelProject {
        let project = NovelProject::new();
        self.current = Some(project.id.clone());
        self.projects.push(project);
        &self.projects[self.projects.len() - 1]
    }

    pub fn open_project(&mut self, project_id: &str) -> PortResult<&NovelProject> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| PortError::NotFound(format!("project {project_id}")))?;
        self.current = Some(project_id.to_string());
        Ok(&self.projects[index])
    }

    pub fn rename_project(&mut self, title: &str) -> PortResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PortError::Validation("title must not be empty".to_string()));
        }
        self.current_mut()?.title = title.to_string();
        Ok(())
    }

    /// Appends a new empty chapter to the current project.
    pub fn add_chapter(&mut self) -> PortResult<NovelChapter> {
        Ok(self.current_mut()?.add_chapter().clone())
    }

    pub fn update_chapter_content(&mut self, chapter_id: &str, content: &str) -> PortResult<()> {
        if self.current_mut()?.update_chapter_content(chapter_id, content) {
            Ok(())
        } else {
            Err(PortError::NotFound(format!("chapter {chapter_id}")))
        }
    }

    /// Asks the backend for a draft. `None` when the prompt is blank.
    ///
    /// Never fails: a missing draft or a failed request come back as the
    /// fixed placeholder texts.
    pub async fn generate_with_ai(&self, prompt: &str) -> Option<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        let body = json!({
            "message": generation_message(prompt),
            "type": "novel_generation",
        });
        match self.backend.post(endpoints::CONVERSATIONS, Some(body)).await {
            Ok(response) => Some(
                response
                    .body
                    .pointer("/data/content")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(GENERATION_PLACEHOLDER)
                    .to_string(),
            ),
            Err(e) => {
                error!("AI generation failed: {}", e);
                Some(GENERATION_UNAVAILABLE.to_string())
            }
        }
    }

    fn current_mut(&mut self) -> PortResult<&mut NovelProject> {
        let id = self
            .current
            .as_deref()
            .ok_or_else(|| PortError::NotFound("no project is open".to_string()))?;
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PortError::NotFound(format!("project {id}")))
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
