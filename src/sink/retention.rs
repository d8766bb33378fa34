//! Backup naming, discovery and pruning
//!
//! A backup of `logs/app.log` rotated at 2024-01-02 15:04:05.123 UTC is named
//! `logs/app-2024-01-02T15-04-05.123.log`, or `...log.gz` once compressed.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Timestamp layout embedded in backup file names
pub const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Suffix appended to compressed backups
pub(crate) const COMPRESSED_SUFFIX: &str = ".gz";

/// A rotated-out log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Directory holding `path`, `.` for bare file names
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `(stem, extension)` of the active log file, extension including its dot
fn name_parts(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

/// Path of the backup for `path` stamped with `at`
pub fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let (stem, ext) = name_parts(path);
    parent_dir(path).join(format!("{}-{}{}", stem, at.format(BACKUP_TIME_FORMAT), ext))
}

/// Parse a backup file name belonging to `path`, returning its timestamp
pub(crate) fn parse_backup_name(path: &Path, file_name: &str) -> Option<DateTime<Utc>> {
    let (stem, ext) = name_parts(path);
    let rest = file_name.strip_prefix(&stem)?.strip_prefix('-')?;
    let rest = rest.strip_suffix(COMPRESSED_SUFFIX).unwrap_or(rest);
    let stamp = if ext.is_empty() {
        rest
    } else {
        rest.strip_suffix(ext.as_str())?
    };
    let naive = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Find existing backups of `path`, newest first
pub(crate) fn discover(path: &Path) -> io::Result<Vec<Backup>> {
    let dir = parent_dir(path);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        let Some(created_at) = file_name
            .to_str()
            .and_then(|name| parse_backup_name(path, name))
        else {
            continue;
        };
        backups.push(Backup {
            path: entry.path(),
            created_at,
        });
    }

    sort_newest_first(&mut backups);
    Ok(backups)
}

pub(crate) fn sort_newest_first(backups: &mut [Backup]) {
    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Drop backups beyond `max_backups` or older than `cutoff`
///
/// `max_backups == 0` keeps any number. Returns the removed entries; the
/// caller deletes the files.
pub(crate) fn prune(
    backups: &mut Vec<Backup>,
    max_backups: usize,
    cutoff: Option<DateTime<Utc>>,
) -> Vec<Backup> {
    sort_newest_first(backups);

    let mut removed = Vec::new();
    if max_backups > 0 && backups.len() > max_backups {
        removed.extend(backups.drain(max_backups..));
    }

    if let Some(cutoff) = cutoff {
        let (kept, expired): (Vec<Backup>, Vec<Backup>) =
            backups.drain(..).partition(|b| b.created_at >= cutoff);
        *backups = kept;
        removed.extend(expired);
    }

    removed
}

/// Whether `path` names a compressed backup
pub(crate) fn is_compressed(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(&COMPRESSED_SUFFIX[1..]))
}
