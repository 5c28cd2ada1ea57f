//! Filesystem moves for staged images
//!
//! Moves never overwrite: a name collision at the destination is an error
//! and the staged file stays where it is.

use crate::error::{IntakeError, Result};
use crate::scanner;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Create `path` and any missing parents; returns false if it already existed
pub fn create_folder(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    info!("Created folder: {}", path.display());
    Ok(true)
}

fn collision(target: &Path) -> IntakeError {
    IntakeError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("{} already exists", target.display()),
    ))
}

/// Move one file or folder to exactly `target`
pub fn move_entry(source: &Path, target: &Path) -> Result<()> {
    if target.exists() {
        return Err(collision(target));
    }

    if fs::rename(source, target).is_ok() {
        return Ok(());
    }

    // rename fails across filesystems; fall back to copy + remove
    if source.is_dir() {
        copy_tree(source, target)?;
        fs::remove_dir_all(source)?;
    } else {
        fs::copy(source, target)?;
        fs::remove_file(source)?;
    }
    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| IntakeError::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| IntakeError::Io(std::io::Error::other(e.to_string())))?;
        let dest = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Move everything directly inside `source` into `destination`
pub fn move_files(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    info!("Moving files from {} to {}", source.display(), destination.display());
    let mut moved = Vec::new();
    for entry in scanner::folder_entries(source)? {
        let Some(name) = entry.file_name() else { continue };
        let target = destination.join(name);
        move_entry(&entry, &target)?;
        debug!("moved {}", target.display());
        moved.push(target);
    }
    Ok(moved)
}

/// Copy the regular files directly inside `source` into `destination`
pub fn copy_files(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    info!("Copying files from {} to {}", source.display(), destination.display());
    let mut copied = Vec::new();
    for file in scanner::folder_files(source)? {
        let Some(name) = file.file_name() else { continue };
        let target = destination.join(name);
        if target.exists() {
            return Err(collision(&target));
        }
        fs::copy(&file, &target)?;
        copied.push(target);
    }
    Ok(copied)
}

/// Remove `path` if it exists and is empty; returns whether it was removed
pub fn delete_folder_if_empty(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        warn!("Folder {} does not exist.", path.display());
        return Ok(false);
    }
    if fs::read_dir(path)?.next().is_some() {
        warn!("Folder {} is not empty, skipping deletion.", path.display());
        return Ok(false);
    }
    fs::remove_dir(path)?;
    info!("Deleted folder: {}", path.display());
    Ok(true)
}

/// `{stem}_pilsbry{.ext}`
pub fn pilsbry_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_pilsbry.{}", stem, ext),
        _ => format!("{}_pilsbry", file_name),
    }
}
