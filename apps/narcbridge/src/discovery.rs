//! Project scan building the tracked file set.
//!
//! Every regular file under the configured main and test directories is
//! tracked; files whose name ends with a Groovy suffix get the `grvy` tag.
//! Directories are walked in parallel and the result is put back in a
//! stable order: directories as configured, then paths sorted within each.

use crate::error::AnalysisError;
use crate::files::{FileKind, FileSystemView, InputFile, GROOVY_KEY};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
/// Files of one project, as seen by the analysis.
pub struct ProjectFileSystem {
    pub files: Vec<InputFile>,
}

impl FileSystemView for ProjectFileSystem {
    fn input_files(&self) -> &[InputFile] {
        &self.files
    }
}

impl ProjectFileSystem {
    /// Scan `main_dirs` and `test_dirs` (relative to `base_dir` unless
    /// absolute). Missing directories are skipped.
    pub fn scan(
        base_dir: &Path,
        main_dirs: &[PathBuf],
        test_dirs: &[PathBuf],
        suffixes: &[String],
    ) -> Result<Self, AnalysisError> {
        let roots: Vec<(PathBuf, FileKind)> = main_dirs
            .iter()
            .map(|d| (base_dir.join(d), FileKind::Main))
            .chain(test_dirs.iter().map(|d| (base_dir.join(d), FileKind::Test)))
            .collect();

        let per_root: Vec<Vec<InputFile>> = roots
            .par_iter()
            .map(|(root, kind)| scan_root(root, *kind, suffixes))
            .collect::<Result<_, _>>()?;

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let files: Vec<InputFile> = per_root
            .into_iter()
            .flatten()
            .filter(|f| seen.insert(f.absolute_path.clone()))
            .collect();
        tracing::debug!(
            files = files.len(),
            groovy = files.iter().filter(|f| f.is_groovy()).count(),
            "scanned project files"
        );
        Ok(Self { files })
    }
}

fn scan_root(root: &Path, kind: FileKind, suffixes: &[String]) -> Result<Vec<InputFile>, AnalysisError> {
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "source directory not found; skipping");
        return Ok(Vec::new());
    }
    let pattern = root.join("**").join("*").to_string_lossy().to_string();
    let entries = glob::glob(&pattern)
        .map_err(|e| AnalysisError::config(format!("bad source directory {}: {}", root.display(), e)))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|p| to_input_file(root, p, kind, suffixes))
        .collect())
}

fn to_input_file(root: &Path, path: PathBuf, kind: FileKind, suffixes: &[String]) -> InputFile {
    let relative = pathdiff::diff_paths(&path, root)
        .unwrap_or_else(|| path.clone())
        .to_string_lossy()
        .replace('\\', "/");
    let mut file = InputFile::new(relative)
        .with_absolute_path(path)
        .with_kind(kind);
    if has_suffix(&file.relative_path, suffixes) {
        file = file.with_language(GROOVY_KEY);
    }
    file
}

fn has_suffix(path: &str, suffixes: &[String]) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
    suffixes
        .iter()
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .any(|s| {
            let dotted = if s.starts_with('.') { s } else { format!(".{}", s) };
            name.ends_with(&dotted)
        })
}
