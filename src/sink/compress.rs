//! Gzip compression of rotated backups

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::retention::COMPRESSED_SUFFIX;
use crate::error::{LogError, Result};

/// Path of the compressed form of `path`
pub(crate) fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// Gzip `path` to `<path>.gz` and remove the original
///
/// On failure any partial output is removed and the original is left intact.
pub(crate) fn gzip(path: &Path) -> Result<PathBuf> {
    let gz_path = compressed_path(path);
    match write_gzip(path, &gz_path) {
        Ok(()) => Ok(gz_path),
        Err(source) => {
            // Only ever a regular file we created
            if gz_path.is_file() {
                let _ = fs::remove_file(&gz_path);
            }
            Err(LogError::Compression {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn write_gzip(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = BufReader::new(File::open(src)?);
    let output = File::create(dst)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    let output = encoder.finish()?;
    output.sync_all()?;
    drop(input);
    fs::remove_file(src)
}
