//! Batch requests and the per-file stage machine

use crate::{DocType, DomainError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submitted batch run
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Unique batch identifier (UUIDv7)
    pub batch_id: Uuid,
    /// Container holding the files (a bucket prefix or a directory)
    pub source_location: String,
    /// Label the submitter expects, or `any`
    pub requested_doc_type: String,
}

impl BatchRequest {
    /// Create a request with a fresh batch id
    pub fn new(source_location: impl Into<String>, requested_doc_type: impl Into<String>) -> Self {
        Self {
            batch_id: Uuid::now_v7(),
            source_location: source_location.into(),
            requested_doc_type: requested_doc_type.into(),
        }
    }
}

/// Reference to one object in a storage container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Container the object lives in
    pub container: String,
    /// Path relative to the container, `/` separated
    pub path: String,
    /// Size in bytes as reported by the listing
    pub size: u64,
}

impl FileRef {
    /// Create a reference
    pub fn new(container: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            container: container.into(),
            path: path.into(),
            size,
        }
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of folders between the container root and the file
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Archive this file was extracted from, if it sits in a flattened folder
    ///
    /// Flattening writes entries of `bundle.zip` to `bundle/<entry>`, so a
    /// file one folder deep is attributed to `<folder>.zip`.
    pub fn parent_archive(&self) -> Option<String> {
        let (folder, _) = self.path.rsplit_once('/')?;
        let folder = folder.rsplit('/').next().unwrap_or(folder);
        Some(format!("{}.zip", folder))
    }
}

/// Stage of a [`FileTask`]
///
/// Stages only move forward one step at a time. `Error` is reachable from
/// every non-terminal stage; `Processed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileStatus {
    /// Discovered, waiting for a download slot
    Pending,
    /// Bytes being fetched
    Downloading,
    /// Category being determined
    Classifying,
    /// Fields being extracted (including truncation repair)
    Extracting,
    /// Record being audited and scored
    Scoring,
    /// Finished successfully
    Processed,
    /// Failed; carries no further transitions
    Error,
}

impl FileStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "PENDING",
            FileStatus::Downloading => "DOWNLOADING",
            FileStatus::Classifying => "CLASSIFYING",
            FileStatus::Extracting => "EXTRACTING",
            FileStatus::Scoring => "SCORING",
            FileStatus::Processed => "PROCESSED",
            FileStatus::Error => "ERROR",
        }
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Processed | FileStatus::Error)
    }

    fn rank(&self) -> Option<u8> {
        match self {
            FileStatus::Pending => Some(0),
            FileStatus::Downloading => Some(1),
            FileStatus::Classifying => Some(2),
            FileStatus::Extracting => Some(3),
            FileStatus::Scoring => Some(4),
            FileStatus::Processed => Some(5),
            FileStatus::Error => None,
        }
    }

    /// Whether `next` is a legal successor of this status
    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(current), Some(target)) => target == current + 1,
            (None, Some(_)) => false,
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work for one discovered file
///
/// Owned by exactly one orchestrator task; never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTask {
    /// Batch this file belongs to
    pub batch_id: Uuid,
    /// Identifier assigned at discovery
    pub content_id: Uuid,
    /// Archive the file was flattened out of
    pub parent_archive_name: Option<String>,
    /// Where to download the file from
    pub file: FileRef,
    /// Category, once classified
    pub doc_type: Option<DocType>,
    status: FileStatus,
}

impl FileTask {
    /// Create a pending task for a listed file
    pub fn new(batch_id: Uuid, file: FileRef) -> Self {
        Self {
            batch_id,
            content_id: Uuid::now_v7(),
            parent_archive_name: file.parent_archive(),
            file,
            doc_type: None,
            status: FileStatus::Pending,
        }
    }

    /// Current stage
    pub fn status(&self) -> FileStatus {
        self.status
    }

    /// Display name of the file
    pub fn file_name(&self) -> &str {
        self.file.file_name()
    }

    /// Move to the next stage
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` when `next` is not the
    /// immediate successor or the task is already terminal.
    pub fn advance(&mut self, next: FileStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition(format!(
                "{} -> {} for {}",
                self.status,
                next,
                self.file.path
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Move to `Error`; a no-op on tasks that are already terminal
    pub fn fail(&mut self) {
        if !self.status.is_terminal() {
            self.status = FileStatus::Error;
        }
    }
}
