//! Archive flattening
//!
//! Runs once per batch, sequentially, before listing. Each `.zip` at the top
//! of the container is unpacked in memory and its supported entries are
//! uploaded next to it under `<stem>/`. The bundle is deleted afterwards so
//! a second run over the same container finds only the extracted files.

use crate::config::ArchiveLimits;
use crate::OrchestratorConfig;
use docket_domain::{DocumentStore, FileRef, StoreError};
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};

/// What flattening did to the container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenReport {
    /// Bundles expanded and deleted
    pub archives_flattened: usize,
    /// Entries uploaded as loose files
    pub files_extracted: usize,
    /// Entries dropped and bundles left untouched, one line each
    pub warnings: Vec<String>,
}

/// Entries kept from one bundle
#[derive(Debug, Default)]
struct Unpacked {
    entries: Vec<(String, Vec<u8>)>,
    dropped: Vec<String>,
}

fn is_archive(file: &FileRef) -> bool {
    file.depth() == 0 && file.extension().as_deref() == Some("zip")
}

fn archive_stem(file: &FileRef) -> &str {
    let name = file.file_name();
    &name[..name.len() - ".zip".len()]
}

/// Expand every top-level `.zip` in `container`
///
/// Only the initial listing can fail the batch; a bundle that cannot be
/// downloaded, read or uploaded is reported and left in place.
pub async fn flatten_archives<S>(
    store: &S,
    container: &str,
    config: &OrchestratorConfig,
) -> Result<FlattenReport, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let mut report = FlattenReport::default();
    let archives: Vec<FileRef> = store
        .list_files(container)
        .await?
        .into_iter()
        .filter(is_archive)
        .collect();

    for archive in archives {
        match flatten_one(store, &archive, config).await {
            Ok((extracted, warnings)) => {
                report.archives_flattened += 1;
                report.files_extracted += extracted;
                report.warnings.extend(warnings);
            }
            Err(e) => {
                warn!("Leaving {} untouched: {}", archive.path, e);
                report.warnings.push(format!("{}: {}", archive.path, e));
            }
        }
    }

    if report.archives_flattened > 0 {
        info!(
            "Flattened {} archives into {} files",
            report.archives_flattened, report.files_extracted
        );
    }
    Ok(report)
}

async fn flatten_one<S>(
    store: &S,
    archive: &FileRef,
    config: &OrchestratorConfig,
) -> Result<(usize, Vec<String>), StoreError>
where
    S: DocumentStore + ?Sized,
{
    let bytes = store.download(archive).await?;
    let limits = config.archive.clone();
    let allowed = config.allowed_extensions.clone();
    let unpacked = tokio::task::spawn_blocking(move || unpack(bytes, &limits, &allowed))
        .await
        .map_err(|e| StoreError::Archive(e.to_string()))??;

    let stem = archive_stem(archive);
    let mut warnings = Vec::with_capacity(unpacked.dropped.len());
    for reason in unpacked.dropped {
        warn!("Dropped from {}: {}", archive.path, reason);
        warnings.push(format!("{}: {}", archive.path, reason));
    }

    let count = unpacked.entries.len();
    for (name, data) in unpacked.entries {
        let target = format!("{}/{}", stem, name);
        debug!("Extracting {} ({} bytes)", target, data.len());
        store.upload(&archive.container, &target, data).await?;
    }
    store.delete(archive).await?;
    Ok((count, warnings))
}

/// Read the kept entries of a bundle into memory
fn unpack(
    bytes: Vec<u8>,
    limits: &ArchiveLimits,
    allowed: &[String],
) -> Result<Unpacked, StoreError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| StoreError::Archive(e.to_string()))?;

    if zip.len() > limits.max_entries {
        return Err(StoreError::Archive(format!(
            "{} entries exceeds the limit of {}",
            zip.len(),
            limits.max_entries
        )));
    }

    let mut unpacked = Unpacked::default();
    let mut total: u64 = 0;
    for i in 0..zip.len() {
        let entry = zip
            .by_index(i)
            .map_err(|e| StoreError::Archive(e.to_string()))?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            unpacked.dropped.push(format!("folder entry {}", name));
            continue;
        }
        if name.contains('/') || name.contains('\\') {
            unpacked.dropped.push(format!("nested entry {}", name));
            continue;
        }
        let supported = FileRef::new("", name.as_str(), 0)
            .extension()
            .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
            .unwrap_or(false);
        if !supported {
            unpacked.dropped.push(format!("unsupported entry {}", name));
            continue;
        }
        if entry.size() > limits.max_entry_bytes {
            unpacked.dropped.push(format!("oversized entry {} ({} bytes)", name, entry.size()));
            continue;
        }

        // The declared size can lie; never read past the limit.
        let mut data = Vec::new();
        entry
            .take(limits.max_entry_bytes + 1)
            .read_to_end(&mut data)
            .map_err(|e| StoreError::Archive(format!("{}: {}", name, e)))?;
        if data.len() as u64 > limits.max_entry_bytes {
            unpacked.dropped.push(format!("oversized entry {}", name));
            continue;
        }

        total += data.len() as u64;
        if total > limits.max_total_bytes {
            return Err(StoreError::Archive(format!(
                "uncompressed size exceeds the limit of {} bytes",
                limits.max_total_bytes
            )));
        }
        unpacked.entries.push((name, data));
    }
    Ok(unpacked)
}
