//! Size-based rotating file sink
//!
//! Appends records to a single file. Once the file reaches the configured
//! size it is renamed to a timestamped backup (optionally gzipped), a fresh
//! file is opened at the original path, and old backups are pruned by count
//! and age.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::compress;
use super::retention::{self, Backup};
use super::Sink;
use crate::error::{LogError, Result};

/// Source of rotation timestamps
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Receives non-fatal rotation problems (rename, compression, backup removal, reopen)
pub type ErrorHandler = Arc<dyn Fn(&LogError) + Send + Sync>;

/// When to rotate and what to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// Rotate once the file reaches this many bytes; 0 disables rotation
    pub max_size_bytes: u64,

    /// Backups to keep; 0 keeps all
    pub max_backups: usize,

    /// Delete backups older than this many days; 0 disables age pruning
    pub max_age_days: u64,

    /// Gzip rotated backups
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: 50 * 1024 * 1024,
            max_backups: 15,
            max_age_days: 7,
            compress: true,
        }
    }
}

impl RotationPolicy {
    /// Never rotate; the sink behaves as a plain append-only file
    pub fn disabled() -> Self {
        Self {
            max_size_bytes: 0,
            ..Self::default()
        }
    }

    pub fn rotates(&self) -> bool {
        self.max_size_bytes > 0
    }
}

/// Mutable state, only touched under the sink mutex
#[derive(Debug, Default)]
struct SinkState {
    file: Option<File>,
    size: u64,
    /// Newest first
    backups: Vec<Backup>,
    scanned: bool,
    last_stamp: Option<DateTime<Utc>>,
}

/// What happened during one rotation, reported after the lock is released
#[derive(Debug, Default)]
struct RotationReport {
    /// Kept backup path; `None` when the rename failed
    backup: Option<PathBuf>,
    removed: Vec<PathBuf>,
    errors: Vec<LogError>,
}

/// Oldest creation time a backup may have; `None` disables age pruning
fn age_cutoff(now: DateTime<Utc>, max_age_days: u64) -> Option<DateTime<Utc>> {
    if max_age_days == 0 {
        return None;
    }
    let days = i64::try_from(max_age_days).ok()?;
    now.checked_sub_signed(chrono::Duration::try_days(days)?)
}

/// File sink with size-based rotation and backup retention
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<SinkState>,
    clock: Clock,
    on_error: Option<ErrorHandler>,
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RotatingFileSink {
    /// Create a sink for `path`; nothing touches the disk until the first write
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            state: Mutex::new(SinkState::default()),
            clock: Arc::new(Utc::now),
            on_error: None,
        }
    }

    /// Replace the clock used for backup names and age pruning
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Route non-fatal rotation errors to `handler` instead of `tracing`
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the active file (0 before the first write)
    pub fn current_size(&self) -> u64 {
        self.lock().size
    }

    /// Known backups, newest first
    pub fn backups(&self) -> Vec<Backup> {
        self.lock().backups.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_file(&self) -> Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LogError::io(
                    format!("failed to create log directory {}", parent.display()),
                    e,
                )
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::io(format!("failed to open {}", self.path.display()), e))
    }

    /// Open the active file if needed, seeding size and backups on first use
    fn ensure_open<'a>(&self, state: &'a mut SinkState) -> Result<&'a mut File> {
        if state.file.is_none() {
            let file = self.open_file()?;
            state.size = file
                .metadata()
                .map_err(|e| LogError::io(format!("failed to stat {}", self.path.display()), e))?
                .len();
            if !state.scanned {
                state.backups = retention::discover(&self.path).map_err(|e| {
                    LogError::io(
                        format!("failed to scan backups of {}", self.path.display()),
                        e,
                    )
                })?;
                state.last_stamp = state.backups.first().map(|b| b.created_at);
                state.scanned = true;
            }
            state.file = Some(file);
        }
        state.file.as_mut().ok_or_else(|| {
            LogError::io(
                format!("log file {} is not open", self.path.display()),
                io::Error::new(io::ErrorKind::NotConnected, "file closed"),
            )
        })
    }

    /// Next backup timestamp, strictly after the previous one
    fn next_stamp(&self, state: &mut SinkState) -> DateTime<Utc> {
        let now = (self.clock)().trunc_subsecs(3);
        let stamp = match state.last_stamp {
            Some(last) if now <= last => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        state.last_stamp = Some(stamp);
        stamp
    }

    /// Rename the full file to a backup, prune, and reopen
    ///
    /// Runs after the triggering bytes are on disk, so every failure here is
    /// collected into the report instead of failing the write.
    fn rotate(&self, state: &mut SinkState) -> RotationReport {
        let mut report = RotationReport::default();

        // Close before renaming
        state.file = None;

        let stamp = self.next_stamp(state);
        let backup = retention::backup_path(&self.path, stamp);
        if let Err(e) = fs::rename(&self.path, &backup) {
            // The active file stays in place and is reopened by the next write
            report.errors.push(LogError::io(
                format!(
                    "failed to rename {} to {}",
                    self.path.display(),
                    backup.display()
                ),
                e,
            ));
            return report;
        }
        state.size = 0;

        let mut kept = backup;
        if self.policy.compress {
            match compress::gzip(&kept) {
                Ok(gz) => kept = gz,
                Err(e) => report.errors.push(e),
            }
        }
        state.backups.insert(
            0,
            Backup {
                path: kept.clone(),
                created_at: stamp,
            },
        );
        report.backup = Some(kept);

        let cutoff = age_cutoff((self.clock)(), self.policy.max_age_days);
        for expired in retention::prune(&mut state.backups, self.policy.max_backups, cutoff) {
            match fs::remove_file(&expired.path) {
                Ok(()) => report.removed.push(expired.path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => report.errors.push(LogError::io(
                    format!("failed to remove backup {}", expired.path.display()),
                    e,
                )),
            }
        }

        match self.open_file() {
            Ok(file) => state.file = Some(file),
            Err(e) => report.errors.push(e),
        }

        report
    }

    fn report(&self, report: RotationReport) {
        if let Some(backup) = &report.backup {
            tracing::debug!(
                file = %self.path.display(),
                backup = %backup.display(),
                compressed = retention::is_compressed(backup),
                "rotated log file"
            );
        }
        for path in &report.removed {
            tracing::debug!(backup = %path.display(), "removed old log backup");
        }
        for error in &report.errors {
            match &self.on_error {
                Some(handler) => handler(error),
                None => tracing::warn!(error = %error, "log rotation problem"),
            }
        }
    }
}

impl Sink for RotatingFileSink {
    /// Append `buf`, rotating afterwards if the size limit is reached
    ///
    /// An error means `buf` was not written. Rotation problems (rename,
    /// compression, pruning, reopening) happen after the bytes are on disk
    /// and go to the error handler instead.
    fn write(&self, buf: &[u8]) -> Result<()> {
        let report = {
            let mut state = self.lock();
            let file = self.ensure_open(&mut state)?;
            file.write_all(buf)
                .and_then(|_| file.flush())
                .map_err(|e| LogError::io(format!("failed to write {}", self.path.display()), e))?;
            state.size += buf.len() as u64;

            if self.policy.rotates() && state.size >= self.policy.max_size_bytes {
                Some(self.rotate(&mut state))
            } else {
                None
            }
        };

        if let Some(report) = report {
            self.report(report);
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        let mut state = self.lock();
        match state.file.as_mut() {
            Some(file) => file
                .flush()
                .and_then(|_| file.sync_data())
                .map_err(|e| LogError::io(format!("failed to sync {}", self.path.display()), e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    fn fixed_clock() -> (DateTime<Utc>, Clock) {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        (now, Arc::new(move || now))
    }

    fn plain_policy(max_size_bytes: u64, max_backups: usize) -> RotationPolicy {
        RotationPolicy {
            max_size_bytes,
            max_backups,
            max_age_days: 0,
            compress: false,
        }
    }

    #[test]
    fn test_no_file_before_first_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("app.log");
        let sink = RotatingFileSink::new(&path, RotationPolicy::default());
        assert_eq!(sink.current_size(), 0);
        assert!(!path.exists());

        sink.write(b"hello\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
        assert_eq!(sink.current_size(), 6);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, b"old\n").unwrap();

        let sink = RotatingFileSink::new(&path, plain_policy(1024, 3));
        sink.write(b"new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
        assert_eq!(sink.current_size(), 8);
    }

    #[test]
    fn test_single_crossing_rotates_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();
        let sink = RotatingFileSink::new(&path, plain_policy(10, 5)).with_clock(clock);

        sink.write(b"aaaa\n").unwrap();
        sink.write(b"bbbb\n").unwrap();
        assert_eq!(sink.current_size(), 0);
        assert_eq!(fs::read(&path).unwrap().len(), 0);

        let backups = sink.backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].path, retention::backup_path(&path, now));
        assert_eq!(
            fs::read_to_string(&backups[0].path).unwrap(),
            "aaaa\nbbbb\n"
        );

        sink.write(b"cc\n").unwrap();
        assert_eq!(sink.backups().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "cc\n");
    }

    #[test]
    fn test_zero_size_never_rotates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let sink = RotatingFileSink::new(&path, RotationPolicy::disabled());

        for _ in 0..100 {
            sink.write(b"0123456789\n").unwrap();
        }
        assert!(sink.backups().is_empty());
        assert_eq!(fs::read(&path).unwrap().len(), 1100);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_count_is_bounded_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (_, clock) = fixed_clock();
        let sink = RotatingFileSink::new(&path, plain_policy(4, 3)).with_clock(clock);

        for i in 0..5 {
            sink.write(format!("{:03}\n", i).as_bytes()).unwrap();
        }

        let backups = sink.backups();
        assert_eq!(backups.len(), 3);
        let contents: Vec<String> = backups
            .iter()
            .map(|b| fs::read_to_string(&b.path).unwrap())
            .collect();
        assert_eq!(contents, vec!["004\n", "003\n", "002\n"]);
        assert!(backups
            .windows(2)
            .all(|pair| pair[0].created_at > pair[1].created_at));

        // active file plus three backups
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_fewer_rotations_than_limit_keeps_all() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let sink = RotatingFileSink::new(&path, plain_policy(4, 10));

        for i in 0..2 {
            sink.write(format!("{:03}\n", i).as_bytes()).unwrap();
        }
        assert_eq!(sink.backups().len(), 2);
    }

    #[test]
    fn test_expired_backups_removed_after_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();

        let stale = retention::backup_path(&path, now - chrono::Duration::days(9));
        let recent = retention::backup_path(&path, now - chrono::Duration::days(2));
        fs::write(&stale, b"stale").unwrap();
        fs::write(&recent, b"recent").unwrap();

        let policy = RotationPolicy {
            max_size_bytes: 4,
            max_backups: 15,
            max_age_days: 7,
            compress: false,
        };
        let sink = RotatingFileSink::new(&path, policy).with_clock(clock);

        // Discovery alone does not prune
        sink.write(b"a").unwrap();
        assert!(stale.exists());

        sink.write(b"bcd").unwrap();
        assert!(!stale.exists());
        assert!(recent.exists());

        let backups = sink.backups();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].path, retention::backup_path(&path, now));
        assert_eq!(backups[1].path, recent);
    }

    #[test]
    fn test_compressed_backup_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();
        let policy = RotationPolicy {
            max_size_bytes: 8,
            ..RotationPolicy::default()
        };
        let sink = RotatingFileSink::new(&path, policy).with_clock(clock);

        sink.write(b"payload\n").unwrap();

        let backups = sink.backups();
        assert_eq!(backups.len(), 1);
        assert!(retention::is_compressed(&backups[0].path));
        assert!(!retention::backup_path(&path, now).exists());

        let mut decoded = String::new();
        GzDecoder::new(File::open(&backups[0].path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "payload\n");
    }

    #[test]
    fn test_compression_failure_is_not_a_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();
        let backup = retention::backup_path(&path, now);
        fs::create_dir(compress::compressed_path(&backup)).unwrap();

        let seen: Arc<StdMutex<Vec<String>>> = Arc::default();
        let seen_clone = Arc::clone(&seen);
        let policy = RotationPolicy {
            max_size_bytes: 8,
            ..RotationPolicy::default()
        };
        let sink = RotatingFileSink::new(&path, policy)
            .with_clock(clock)
            .with_error_handler(Arc::new(move |e: &LogError| {
                seen_clone.lock().unwrap().push(e.to_string());
            }));

        sink.write(b"payload\n").unwrap();

        assert_eq!(fs::read_to_string(&backup).unwrap(), "payload\n");
        assert_eq!(sink.backups()[0].path, backup);
        assert_eq!(sink.current_size(), 0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("failed to compress"));
    }

    #[test]
    fn test_rotation_timestamps_never_collide() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();
        let sink = RotatingFileSink::new(&path, plain_policy(1, 0)).with_clock(clock);

        sink.write(b"1").unwrap();
        sink.write(b"2").unwrap();
        sink.write(b"3").unwrap();

        let backups = sink.backups();
        assert_eq!(backups.len(), 3);
        assert_eq!(
            backups[0].created_at,
            now + chrono::Duration::milliseconds(2)
        );
        assert_eq!(fs::read_to_string(&backups[2].path).unwrap(), "1");
    }

    #[test]
    fn test_invalid_path_fails_write() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file.txt");
        fs::write(&blocker, b"not a dir").unwrap();

        let sink = RotatingFileSink::new(blocker.join("app.log"), RotationPolicy::default());
        let err = sink.write(b"x").unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
        // The lock is released on the error path
        assert_eq!(sink.current_size(), 0);
    }

    #[test]
    fn test_concurrent_writes_are_not_interleaved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let sink = Arc::new(RotatingFileSink::new(&path, RotationPolicy::disabled()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.write(format!("thread-{}-line-{:03}\n", t, i).as_bytes())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("thread-") && l.len() == "thread-0-line-000".len()));
        sink.sync().unwrap();
    }

    #[test]
    fn test_age_cutoff_saturates_to_no_pruning() {
        let (now, _) = fixed_clock();
        assert_eq!(age_cutoff(now, 0), None);
        assert_eq!(age_cutoff(now, 7), Some(now - chrono::Duration::days(7)));
        assert_eq!(age_cutoff(now, 1_000_000_000), None);
        assert_eq!(age_cutoff(now, u64::MAX), None);
    }

    #[test]
    fn test_huge_max_age_keeps_fresh_backup() {
        for max_age_days in [u64::MAX, 1_000_000_000] {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("app.log");
            let (_, clock) = fixed_clock();
            let policy = RotationPolicy {
                max_size_bytes: 4,
                max_backups: 0,
                max_age_days,
                compress: false,
            };
            let sink = RotatingFileSink::new(&path, policy).with_clock(clock);

            sink.write(b"abcd").unwrap();

            let backups = sink.backups();
            assert_eq!(backups.len(), 1, "max_age_days = {}", max_age_days);
            assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "abcd");
        }
    }

    #[test]
    fn test_failed_rename_keeps_record_and_retries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, clock) = fixed_clock();

        // A non-empty directory at the first backup name blocks the rename
        let blocked = retention::backup_path(&path, now);
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"x").unwrap();

        let seen: Arc<StdMutex<Vec<String>>> = Arc::default();
        let seen_clone = Arc::clone(&seen);
        let sink = RotatingFileSink::new(&path, plain_policy(4, 0))
            .with_clock(clock)
            .with_error_handler(Arc::new(move |e: &LogError| {
                seen_clone.lock().unwrap().push(e.to_string());
            }));

        sink.write(b"abcd").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "abcd");
        assert!(sink.backups().is_empty());
        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert!(seen[0].contains("failed to rename"));
        }

        // The next write reopens the same file and rotates under a later stamp
        sink.write(b"e").unwrap();
        let backups = sink.backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            backups[0].path,
            retention::backup_path(&path, now + chrono::Duration::milliseconds(1))
        );
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "abcde");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_reopen_still_prunes_and_keeps_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let (now, _) = fixed_clock();

        let stale = retention::backup_path(&path, now - chrono::Duration::days(9));
        fs::write(&stale, b"stale").unwrap();

        // Once the active file has been renamed away, the clock's pruning
        // call puts a directory in its place so the reopen fails
        let active = path.clone();
        let clock: Clock = Arc::new(move || {
            let _ = fs::create_dir(&active);
            now
        });

        let seen: Arc<StdMutex<Vec<String>>> = Arc::default();
        let seen_clone = Arc::clone(&seen);
        let policy = RotationPolicy {
            max_size_bytes: 4,
            max_backups: 15,
            max_age_days: 7,
            compress: false,
        };
        let sink = RotatingFileSink::new(&path, policy)
            .with_clock(clock)
            .with_error_handler(Arc::new(move |e: &LogError| {
                seen_clone.lock().unwrap().push(e.to_string());
            }));

        sink.write(b"abcd").unwrap();

        assert!(!stale.exists());
        let backups = sink.backups();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "abcd");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("failed to open"));
    }
}
