//! Input file discovery.

use std::path::{Path, PathBuf};

use bgt_common::normalize_text;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Extensions accepted as spreadsheet inputs (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

/// Input container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Workbook,
    Csv,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }
}

/// Office lock files such as `~$budget.xlsx`.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

fn is_ignored(path: &Path, ignore_files: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let name = normalize_text(name);
    ignore_files
        .iter()
        .any(|ignored| normalize_text(ignored) == name)
}

/// Lists supported spreadsheet files in a directory (non-recursive).
///
/// Returns files sorted by filename. Lock files and names listed in
/// `ignore_files` are skipped.
pub fn list_input_files(dir: &Path, ignore_files: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if !path.is_file() || InputKind::from_path(&path).is_none() {
            continue;
        }
        if is_lock_file(&path) || is_ignored(&path, ignore_files) {
            debug!(path = %path.display(), "skipping input file");
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Expands a mix of files and folders into the ordered list of inputs.
///
/// Folders are scanned with [`list_input_files`]; explicit files are kept in
/// the order given but must exist and have a supported extension. Duplicates
/// are dropped.
pub fn discover_inputs(paths: &[PathBuf], ignore_files: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    for path in paths {
        let found = if path.is_dir() {
            list_input_files(path, ignore_files)?
        } else if path.is_file() {
            if InputKind::from_path(path).is_none() {
                return Err(IngestError::UnsupportedFormat { path: path.clone() });
            }
            vec![path.clone()]
        } else {
            return Err(IngestError::FileNotFound { path: path.clone() });
        };
        for file in found {
            if !inputs.contains(&file) {
                inputs.push(file);
            }
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_list_input_files() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.xlsx")).unwrap();
        File::create(dir.path().join("a.csv")).unwrap();
        File::create(dir.path().join("~$b.xlsx")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(dir.path().join("C.XLS")).unwrap();
        File::create(dir.path().join("skip.xlsx")).unwrap();

        let files = list_input_files(dir.path(), &["skip.xlsx".to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["C.XLS", "a.csv", "b.xlsx"]);
    }

    #[test]
    fn test_list_input_files_not_found() {
        let result = list_input_files(Path::new("/nonexistent/budget"), &[]);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_discover_inputs_mixes_files_and_folders() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("batch");
        std::fs::create_dir(&nested).unwrap();
        File::create(nested.join("x.xlsx")).unwrap();
        let single = dir.path().join("single.csv");
        File::create(&single).unwrap();

        let inputs =
            discover_inputs(&[single.clone(), nested.clone(), single.clone()], &[]).unwrap();
        assert_eq!(inputs, vec![single, nested.join("x.xlsx")]);
    }

    #[test]
    fn test_discover_inputs_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        File::create(&path).unwrap();
        let result = discover_inputs(&[path], &[]);
        assert!(matches!(result, Err(IngestError::UnsupportedFormat { .. })));
    }
}
