//! The `files` column of a job and the attachments decoded from it.
//!
//! The Jobs API stores attached file names as a JSON array of strings. Older
//! records hold a single bare file name instead, so decoding never fails: a
//! value that is not a JSON string array is read as one literal name.

use serde::Serialize;
use tracing::debug;

use crate::FileHandle;

/// Result of reading a stored `files` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesField {
    /// A JSON array of file names, in stored order.
    Array(Vec<String>),
    /// Anything else that is non-empty: kept as one literal file name.
    SingleFallback(String),
    /// Absent, or an empty string.
    Empty,
}

impl FilesField {
    pub fn decode(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return FilesField::Empty,
        };

        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(names) => FilesField::Array(names),
            Err(e) => {
                debug!("files value is not a JSON string array ({e}); using it as one file name");
                FilesField::SingleFallback(raw.to_string())
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            FilesField::Array(names) => names.clone(),
            FilesField::SingleFallback(name) => vec![name.clone()],
            FilesField::Empty => Vec::new(),
        }
    }

    /// Attachments with ids `1..=n` in stored order.
    pub fn into_attachments(self) -> Vec<FileAttachment> {
        self.names()
            .into_iter()
            .zip(1u32..)
            .map(|(name, id)| FileAttachment::known(id, name))
            .collect()
    }
}

/// Encode file names the way the Jobs API stores them.
pub fn encode_names<S: AsRef<str>>(names: &[S]) -> String {
    let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    // A Vec<&str> always serializes.
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

/// One file attached to the job being edited.
///
/// `id` only identifies the entry inside the current editor session and is
/// never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAttachment {
    pub id: u32,
    pub name: String,
    #[serde(skip)]
    pub raw: Option<FileHandle>,
}

impl FileAttachment {
    pub fn known(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            raw: None,
        }
    }

    pub fn pending(id: u32, handle: FileHandle) -> Self {
        Self {
            id,
            name: handle.name.clone(),
            raw: Some(handle),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.raw.is_some()
    }

    /// The payload to upload on save. Names without a local payload are
    /// re-submitted as empty placeholders.
    pub fn upload_handle(&self) -> FileHandle {
        match &self.raw {
            Some(handle) => handle.clone(),
            None => FileHandle::placeholder(self.name.clone()),
        }
    }

    pub fn without_payload(&self) -> Self {
        Self::known(self.id, self.name.clone())
    }
}
