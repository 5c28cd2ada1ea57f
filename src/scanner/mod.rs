use crate::error::{IntakeError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subfolder holding images destined for the catalog system
pub const PILSBRY_FOLDER: &str = "pilsbry";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "JPG", "JPEG", "PNG", "TIF", "TIFF"];

fn entries(folder: &Path) -> Result<Vec<walkdir::DirEntry>> {
    if !folder.is_dir() {
        return Err(IntakeError::FolderNotFound(folder.display().to_string()));
    }

    let mut entries: Vec<_> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // direct children only
        .into_iter()
        .filter_map(|e| e.ok())
        .collect();

    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    Ok(entries)
}

/// Everything directly inside `folder`, sorted by name
pub fn folder_entries(folder: &Path) -> Result<Vec<PathBuf>> {
    Ok(entries(folder)?
        .into_iter()
        .map(|e| e.into_path())
        .collect())
}

/// Regular files directly inside `folder`, sorted by name
pub fn folder_files(folder: &Path) -> Result<Vec<PathBuf>> {
    Ok(entries(folder)?
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect())
}

/// Number of subfolders directly inside `folder`
pub fn count_subfolders(folder: &Path) -> Result<usize> {
    Ok(entries(folder)?
        .iter()
        .filter(|e| e.file_type().is_dir())
        .count())
}

/// Files waiting in the staging folder's `pilsbry` subfolder
pub fn pilsbry_files(staging_folder: &Path) -> Result<Vec<PathBuf>> {
    let pilsbry = staging_folder.join(PILSBRY_FOLDER);
    if !pilsbry.is_dir() {
        return Ok(Vec::new());
    }
    folder_files(&pilsbry)
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
        .unwrap_or(false)
}
