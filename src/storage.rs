//! File access used by the key-store and file-cipher paths.
//!
//! Everything that lands on disk goes through [`Storage::save`], which writes
//! to a temporary sibling and atomically replaces the target.

use crate::error::{CryptoError, Result};
use getrandom::fill;
use std::fs::{self, OpenOptions};
#[cfg(not(target_os = "windows"))]
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A single file on disk, read whole and written atomically.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns `true` if the file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the entire file into memory.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::NotFound`] if the file is missing and
    /// [`CryptoError::Io`] if it cannot be read.
    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CryptoError::NotFound(self.path.clone()),
            _ => CryptoError::Io(e),
        })
    }

    /// Saves data to the file using an atomic write.
    ///
    /// 1. Writing data to a temporary file with random name
    /// 2. Syncing the temporary file to disk
    /// 3. Atomically replacing the old file with the new one
    /// 4. Syncing the parent directory so the rename is persisted
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        self.sync_parent()
    }

    /// Returns the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    #[cfg(not(target_os = "windows"))]
    fn sync_parent(&self) -> Result<()> {
        if let Some(parent) = self.parent() {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }

    // ReplaceFileW already writes through.
    #[cfg(target_os = "windows")]
    fn sync_parent(&self) -> Result<()> {
        Ok(())
    }

    /// Generates a unique temporary file path in the same directory.
    ///
    /// Format: `filename.tmp.<randomhex>`
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf).map_err(|e| CryptoError::crypto(format!("OS random generator: {e}")))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| CryptoError::invalid("path has no file name"))?
            .to_string_lossy();

        let tmp_name = format!("{}.tmp.{}", file_name, hex::encode(buf));

        Ok(self.path.with_file_name(tmp_name))
    }

    /// Atomically replaces the target file with the temporary file.
    ///
    /// Uses `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` when the target
    /// already exists; a plain rename otherwise.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(())
    }

    /// On Unix, `rename()` is atomic when both paths are on the same filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

/// Reads a UTF-8 text file and splits it into lines (without terminators).
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let data = Storage::new(path.as_ref()).load()?;
    let text = String::from_utf8(data)
        .map_err(|_| CryptoError::invalid(format!("{} is not UTF-8 text", path.as_ref().display())))?;
    Ok(text.lines().map(str::to_owned).collect())
}

/// Writes each line followed by `\n`, replacing the file atomically.
pub fn write_lines<S: AsRef<str>>(lines: &[S], path: impl AsRef<Path>) -> Result<()> {
    if lines.is_empty() {
        return Err(CryptoError::invalid("no lines to write"));
    }

    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }

    Storage::new(path.as_ref()).save(text.as_bytes())
}

/// Directory containing an existing file.
pub fn directory_of(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = existing_file(path.as_ref())?;
    Ok(path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// File name (with extension) of an existing file.
pub fn file_name_of(path: impl AsRef<Path>) -> Result<String> {
    let path = existing_file(path.as_ref())?;
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CryptoError::NotFound(path.to_path_buf()))
}

fn existing_file(path: &Path) -> Result<&Path> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(CryptoError::NotFound(path.to_path_buf()))
    }
}
