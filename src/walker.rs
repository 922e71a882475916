use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::scanner::patterns::{EXCLUDE_DIRS, SUPPORTED_EXTENSIONS};

/// Enumerates the files to scan. A target that is itself a file is scanned
/// as-is; a directory is walked recursively, skipping excluded directories
/// and keeping only supported extensions. A missing or unreadable target is
/// an error (fatal upstream).
pub fn collect_files(target: &Path) -> io::Result<Vec<PathBuf>> {
    let target = target.canonicalize()?;
    if target.is_file() {
        return Ok(vec![target]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&target)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("{}", format!("[WARNING] Error walking: {err}").yellow());
                continue;
            }
        };
        if entry.file_type().is_file() && has_supported_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDE_DIRS.contains(&name))
            .unwrap_or(false)
}

fn has_supported_extension(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if SUPPORTED_EXTENSIONS.contains(format!(".{ext}").as_str()) {
            return true;
        }
    }
    // dotfiles like ".env" carry no extension; match the whole name
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| SUPPORTED_EXTENSIONS.contains(name))
        .unwrap_or(false)
}
