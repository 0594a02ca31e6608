use std::{
    fs,
    io::{self, Write as _},
    path::Path,
    time::{Duration, SystemTime},
};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt as _;

use crate::{Error, MAX_FILE_BYTES, Result};

const STABLE_READ_RETRIES: usize = 3;
const STABLE_READ_RETRY_SLEEP: Duration = Duration::from_millis(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DiskRevision {
    modified: SystemTime,
    len: u64,
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    inode: u64,
}

fn disk_revision(path: &Path) -> io::Result<DiskRevision> {
    let meta = fs::metadata(path)?;
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    Ok(DiskRevision {
        modified,
        len: meta.len(),
        #[cfg(unix)]
        dev: meta.dev(),
        #[cfg(unix)]
        inode: meta.ino(),
    })
}

/// Read a whole text file, retrying briefly if it changes under us.
///
/// Watch notifications tend to arrive while the other writer is still busy,
/// so a read is only accepted when the metadata is identical before and after.
pub fn read_document(path: &Path) -> Result<String> {
    let read_err = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut last_err = None;
    for _ in 0..STABLE_READ_RETRIES {
        let before = disk_revision(path).map_err(read_err)?;
        if before.len > MAX_FILE_BYTES {
            return Err(Error::TooLarge {
                path: path.to_path_buf(),
                size: before.len,
                max: MAX_FILE_BYTES,
            });
        }

        let text = match fs::read(path) {
            Ok(bytes) => decode_text(bytes),
            Err(err) => {
                last_err = Some(err);
                std::thread::sleep(STABLE_READ_RETRY_SLEEP);
                continue;
            }
        };

        let after = match disk_revision(path) {
            Ok(rev) => rev,
            Err(err) => {
                last_err = Some(err);
                std::thread::sleep(STABLE_READ_RETRY_SLEEP);
                continue;
            }
        };

        if before == after {
            return Ok(text);
        }

        std::thread::sleep(STABLE_READ_RETRY_SLEEP);
    }

    Err(read_err(
        last_err.unwrap_or_else(|| io::Error::other("file changed while reading")),
    ))
}

/// Invalid UTF-8 sequences become U+FFFD rather than failing the read.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Create or overwrite `path` with `contents`, via a temp file and a rename.
pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    atomic_write_utf8(path, contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn atomic_write_utf8(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path is missing a file name")
    })?;

    let file_name = file_name.to_string_lossy();
    let pid = u128::from(std::process::id());
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());

    for attempt in 0..10u128 {
        let suffix = pid ^ nanos ^ attempt;
        let tmp_path = dir.join(format!(".mdpad-tmp-{file_name}-{suffix}"));

        let open = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path);
        let mut file = match open {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        };

        let result = file
            .write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .and_then(|()| replace_file(dir, &tmp_path, path, &file_name, suffix));

        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        return Ok(());
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "failed to create a temporary file",
    ))
}

fn replace_file(
    dir: &Path,
    tmp_path: &Path,
    path: &Path,
    file_name: &str,
    suffix: u128,
) -> io::Result<()> {
    if fs::rename(tmp_path, path).is_ok() {
        return Ok(());
    }
    if !path.exists() {
        return fs::rename(tmp_path, path);
    }

    // Some filesystems refuse to rename over an existing file; move the
    // original aside so it can be restored if the second rename fails.
    let backup_path = dir.join(format!(".mdpad-backup-{file_name}-{suffix}"));
    fs::rename(path, &backup_path)?;
    match fs::rename(tmp_path, path) {
        Ok(()) => {
            let _ = fs::remove_file(&backup_path);
            Ok(())
        }
        Err(err) => {
            let _ = fs::rename(&backup_path, path);
            Err(err)
        }
    }
}
