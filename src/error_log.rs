//! Best-effort error records for operations that degrade to `None`.

use chrono::Local;
use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a timestamped, human-readable record of `error` into `dir`.
///
/// Never fails: the directory is created if absent and any I/O problem is
/// only reported through `tracing`. Returns the path of the record when one
/// was written.
pub fn write_error_log(dir: &Path, error: &dyn Error, context: &str) -> Option<PathBuf> {
    tracing::error!(dir = %dir.display(), context, "{error}");

    let now = Local::now();
    let path = dir.join(format!("error log({}).txt", now.format("%Y-%m-%d %H-%M-%S%.3f")));

    let mut text = String::new();
    let _ = writeln!(text, "{context}");
    let _ = writeln!(text, "Error occurred at - {}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"));
    let _ = writeln!(text);
    let _ = writeln!(text, "Error message: {error}");

    let mut source = error.source();
    while let Some(cause) = source {
        let _ = writeln!(text, "Caused by: {cause}");
        source = cause.source();
    }

    if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&path, text)) {
        tracing::warn!(path = %path.display(), "could not write error log: {e}");
        return None;
    }

    Some(path)
}
