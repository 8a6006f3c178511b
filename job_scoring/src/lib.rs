pub mod api;
pub mod config;
pub mod editor;
pub mod files;
pub mod service;
pub mod utils;

use serde::{Deserialize, Serialize};

pub use editor::{EditorError, EditorSnapshot, EditorState, JobEditor, JobFields, Mode};
pub use files::{FileAttachment, FilesField};
pub use service::{
    CandidatesService, DynCandidatesService, DynJobAnalyzer, DynJobsService, JobAnalyzer,
    JobsService, ServiceError,
};

/// A job record as the Jobs API returns it.
///
/// `files` is kept in its stored encoding; use [`FilesField::decode`] to read it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JobCreate {
    pub title: String,
    pub description: Option<String>,
    pub files: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct JobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,
}

/// One page of jobs plus the total count across all pages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JobsPublic {
    pub data: Vec<Job>,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

/// Requirement breakdown extracted from a job description.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct JobAnalysis {
    #[serde(default)]
    pub degree: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub technical_skill: Vec<String>,
    #[serde(default)]
    pub responsibility: Vec<String>,
    #[serde(default)]
    pub certificate: Vec<String>,
    #[serde(default)]
    pub soft_skill: Vec<String>,
}

impl JobAnalysis {
    pub fn sections(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Degree", self.degree.as_slice()),
            ("Experience", self.experience.as_slice()),
            ("Technical skills", self.technical_skill.as_slice()),
            ("Responsibilities", self.responsibility.as_slice()),
            ("Certificates", self.certificate.as_slice()),
            ("Soft skills", self.soft_skill.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.sections().iter().all(|(_, items)| items.is_empty())
    }
}

/// A file picked for upload that has not reached the server yet.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            content_type: None,
        }
    }

    /// Zero-byte stand-in for a file the server already knows by name.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}
