//! Turning a container listing into tasks

use crate::OrchestratorConfig;
use docket_domain::{FileRef, FileTask};
use tracing::warn;
use uuid::Uuid;

/// Tasks for one run plus what was left out
#[derive(Debug, Default)]
pub struct Listing {
    /// One PENDING task per accepted file, in listing order
    pub tasks: Vec<FileTask>,
    /// Paths that did not become tasks
    pub skipped: Vec<String>,
}

/// Pick the files of a listing that become tasks
///
/// Files deeper than one folder, files with an unsupported extension and
/// files past `max_files_per_batch` are skipped with a warning. Oversized
/// files still become tasks; the pipeline ends them in ERROR so they show up
/// in the results.
pub fn select_files(batch_id: Uuid, files: Vec<FileRef>, config: &OrchestratorConfig) -> Listing {
    let mut listing = Listing::default();

    for file in files {
        if file.depth() > 1 {
            warn!("Skipping {}: nested too deep", file.path);
            listing.skipped.push(file.path);
            continue;
        }
        let supported = file
            .extension()
            .map(|ext| config.allows_extension(&ext))
            .unwrap_or(false);
        if !supported {
            warn!("Skipping {}: unsupported extension", file.path);
            listing.skipped.push(file.path);
            continue;
        }
        if listing.tasks.len() >= config.max_files_per_batch {
            warn!(
                "Skipping {}: batch is capped at {} files",
                file.path, config.max_files_per_batch
            );
            listing.skipped.push(file.path);
            continue;
        }
        listing.tasks.push(FileTask::new(batch_id, file));
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::FileStatus;

    fn files(paths: &[&str]) -> Vec<FileRef> {
        paths.iter().map(|p| FileRef::new("c", *p, 10)).collect()
    }

    #[test]
    fn test_filters_depth_and_extension() {
        let listing = select_files(
            Uuid::now_v7(),
            files(&["a.pdf", "b.docx", "bundle/c.JPG", "x/y/z.pdf", "bundle.zip", "README"]),
            &OrchestratorConfig::default(),
        );
        let kept: Vec<_> = listing.tasks.iter().map(|t| t.file.path.as_str()).collect();
        assert_eq!(kept, vec!["a.pdf", "bundle/c.JPG"]);
        assert_eq!(listing.skipped, vec!["b.docx", "x/y/z.pdf", "bundle.zip", "README"]);

        assert_eq!(listing.tasks[0].parent_archive_name, None);
        assert_eq!(listing.tasks[1].parent_archive_name.as_deref(), Some("bundle.zip"));
        assert!(listing.tasks.iter().all(|t| t.status() == FileStatus::Pending));
    }

    #[test]
    fn test_caps_batch_size() {
        let config = OrchestratorConfig {
            max_files_per_batch: 2,
            ..OrchestratorConfig::default()
        };
        let listing = select_files(Uuid::now_v7(), files(&["1.pdf", "2.pdf", "3.pdf"]), &config);
        assert_eq!(listing.tasks.len(), 2);
        assert_eq!(listing.skipped, vec!["3.pdf"]);
    }

    #[test]
    fn test_oversized_files_still_become_tasks() {
        let config = OrchestratorConfig {
            max_file_size_bytes: 5,
            ..OrchestratorConfig::default()
        };
        let listing = select_files(Uuid::now_v7(), files(&["big.pdf"]), &config);
        assert_eq!(listing.tasks.len(), 1);
    }
}
