//! Removal planning and execution for download payloads.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};
use downpour_core::lexical_clean;

const CONTROL_SUFFIX: &str = ".aria2";
const DESCRIPTOR_SUFFIX: &str = ".torrent";

/// Inputs describing one download whose payload should be removed.
#[derive(Debug, Clone, Copy)]
pub struct RemovalRequest<'a> {
    /// Identifier of the download, used for logging only.
    pub id: Uuid,
    /// Declared target directory; nothing outside it is ever touched.
    pub target_path: &'a str,
    /// Display name, when known.
    pub name: Option<&'a str>,
    /// Basenames recorded for the payload files.
    pub file_basenames: &'a [String],
    /// Authoritative absolute payload paths captured from the engine before
    /// it forgot the transfer, when available.
    pub engine_files: Option<&'a [PathBuf]>,
    /// Whether the source describes torrent content (magnet or `.torrent`).
    pub torrent_like: bool,
}

/// Summary of what a removal actually did.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Paths removed from disk (payload and sidecars that existed).
    pub removed: Vec<PathBuf>,
    /// Number of directories pruned after file removal.
    pub pruned: usize,
}

/// Repeatedly strip a leading `[...]` group and any whitespace that follows
/// it; stops at the first non-bracket character.
#[must_use]
pub fn strip_leading_tags(name: &str) -> &str {
    let mut rest = name;
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else { break };
        rest = inner[end + 1..].trim_start();
    }
    rest
}

/// Remove a download's payload, engine control files, and source
/// descriptors, then prune directories left empty.
///
/// Every candidate path is containment-checked against the target directory
/// before any filesystem mutation; a single violation aborts the whole
/// operation. Already-missing paths are tolerated so a partial delete can be
/// retried.
///
/// # Errors
///
/// Returns [`FsOpsError::OutsideBase`] when a candidate escapes the target
/// directory, or [`FsOpsError::Io`] on the first non-`NotFound` removal
/// failure.
pub fn remove_download(request: &RemovalRequest<'_>) -> FsOpsResult<RemovalReport> {
    let base = lexical_clean(Path::new(request.target_path.trim()));
    let name = request.name.map(str::trim).filter(|name| !name.is_empty());

    let payload = resolve_payload_paths(request, &base, name);
    let root = resolve_root(&payload, &base);

    let trimmed_root = owned_trimmed_root(&base, name, request.file_basenames)?;

    // Candidate files: payload union the exact-name path, plus the trimmed
    // variant when ownership was proved.
    let mut removals = payload.clone();
    if let Some(name) = name {
        removals.push(lexical_clean(&base.join(name)));
    }
    if let Some(trimmed) = &trimmed_root {
        removals.push(trimmed.clone());
    }

    let mut sidecars = Vec::new();
    for path in &payload {
        sidecars.push(with_suffix(path, CONTROL_SUFFIX));
    }
    if let Some(name) = name {
        let exact = lexical_clean(&base.join(name));
        sidecars.push(with_suffix(&exact, CONTROL_SUFFIX));
        if request.torrent_like {
            sidecars.push(with_suffix(&exact, DESCRIPTOR_SUFFIX));
        }
        if root == exact {
            sidecars.push(with_suffix(&root, CONTROL_SUFFIX));
            if request.torrent_like {
                sidecars.push(with_suffix(&root, DESCRIPTOR_SUFFIX));
            }
        }
    }
    if let Some(trimmed) = &trimmed_root {
        sidecars.push(with_suffix(trimmed, CONTROL_SUFFIX));
        if request.torrent_like {
            sidecars.push(with_suffix(trimmed, DESCRIPTOR_SUFFIX));
        }
    }

    let removals = dedupe(removals);
    let sidecars = dedupe(sidecars);

    for path in removals.iter().chain(sidecars.iter()) {
        ensure_contained(path, &base)?;
    }
    if root != base {
        ensure_contained(&root, &base)?;
    }

    let mut report = RemovalReport::default();
    for path in &removals {
        if remove_path(path)? {
            debug!(download_id = %request.id, path = %path.display(), "removed payload path");
            report.removed.push(path.clone());
        }
    }
    for path in &sidecars {
        if remove_sidecar(path)? {
            debug!(download_id = %request.id, path = %path.display(), "removed sidecar");
            report.removed.push(path.clone());
        }
    }

    report.pruned = prune_directories(&report.removed, &root, &base);
    if root != base {
        // Leftover control file beside the logical root, best effort.
        let _ = fs::remove_file(with_suffix(&root, CONTROL_SUFFIX));
    }

    Ok(report)
}

fn resolve_payload_paths(
    request: &RemovalRequest<'_>,
    base: &Path,
    name: Option<&str>,
) -> Vec<PathBuf> {
    if let Some(files) = request.engine_files
        && !files.is_empty()
    {
        return files.iter().map(|path| lexical_clean(path)).collect();
    }
    if !request.file_basenames.is_empty() {
        return request
            .file_basenames
            .iter()
            .filter(|basename| !basename.is_empty())
            .map(|basename| lexical_clean(&base.join(basename)))
            .collect();
    }
    name.map(|name| vec![lexical_clean(&base.join(name))])
        .unwrap_or_default()
}

/// The logical root is `base/<segment>` when every payload path shares the
/// same first segment under `base`, otherwise `base` itself.
fn resolve_root(payload: &[PathBuf], base: &Path) -> PathBuf {
    let mut shared: Option<OsString> = None;
    for path in payload {
        let Some(first) = path
            .strip_prefix(base)
            .ok()
            .and_then(|rel| rel.components().next())
        else {
            return base.to_path_buf();
        };
        let segment = first.as_os_str().to_os_string();
        match &shared {
            None => shared = Some(segment),
            Some(existing) if *existing == segment => {}
            Some(_) => return base.to_path_buf(),
        }
    }
    shared.map_or_else(|| base.to_path_buf(), |segment| base.join(segment))
}

/// Resolve `base/stripLeadingTags(name)` when ownership of that directory
/// can be proved: either its control sidecar exists, or at least two
/// distinct recorded basenames are found inside it. One match is not enough;
/// filler files (readmes, tracker notices) collide too easily.
fn owned_trimmed_root(
    base: &Path,
    name: Option<&str>,
    file_basenames: &[String],
) -> FsOpsResult<Option<PathBuf>> {
    let Some(name) = name else { return Ok(None) };
    let trimmed = strip_leading_tags(name);
    if trimmed.is_empty() || trimmed == name {
        return Ok(None);
    }

    let candidate = lexical_clean(&base.join(trimmed));
    // Containment is checked before probing: a crafted name must not steer
    // even the read-only ownership scan outside the base.
    ensure_contained(&candidate, base)?;

    if with_suffix(&candidate, CONTROL_SUFFIX).exists() {
        return Ok(Some(candidate));
    }

    if !candidate.is_dir() {
        return Ok(None);
    }
    let wanted: HashSet<&str> = file_basenames
        .iter()
        .map(String::as_str)
        .filter(|basename| !basename.is_empty())
        .collect();
    let mut found: HashSet<String> = HashSet::new();
    for entry in WalkDir::new(&candidate)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if let Some(basename) = entry.file_name().to_str()
            && wanted.contains(basename)
        {
            found.insert(basename.to_string());
            if found.len() >= 2 {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

fn dedupe(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn ensure_contained(path: &Path, base: &Path) -> FsOpsResult<()> {
    if path != base && path.starts_with(base) {
        Ok(())
    } else {
        Err(FsOpsError::OutsideBase {
            path: path.to_path_buf(),
            base: base.to_path_buf(),
        })
    }
}

/// Remove a payload path. Directories are removed recursively; symlinks are
/// removed as links without traversing into their targets. Returns whether
/// anything was removed.
fn remove_path(path: &Path) -> FsOpsResult<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(FsOpsError::io("inspect_payload", path, err)),
    };
    // symlink_metadata never reports a symlink as a directory, so links are
    // unlinked here and their targets stay untouched.
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(FsOpsError::io("remove_payload", path, err)),
    }
}

fn remove_sidecar(path: &Path) -> FsOpsResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(FsOpsError::io("remove_sidecar", path, err)),
    }
}

/// Attempt to remove every ancestor directory of the removed paths, deepest
/// first, plus the logical root. Missing and non-empty directories are left
/// alone.
fn prune_directories(removed: &[PathBuf], root: &Path, base: &Path) -> usize {
    let mut dirs: HashSet<PathBuf> = HashSet::new();
    for path in removed {
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            if dir == base || !dir.starts_with(base) {
                break;
            }
            dirs.insert(dir.to_path_buf());
            ancestor = dir.parent();
        }
    }
    if root != base {
        dirs.insert(root.to_path_buf());
    }

    let mut ordered: Vec<PathBuf> = dirs.into_iter().collect();
    ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

    let mut pruned = 0;
    for dir in ordered {
        match fs::remove_dir(&dir) {
            Ok(()) => pruned += 1,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                ) => {}
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to prune directory");
            }
        }
    }
    pruned
}
