//! Tracked source files and the Groovy view over them.
//!
//! `FileSystemView` is the host's list of files; `GroovyFiles` narrows it
//! to Groovy main sources and maps paths written by CodeNarc back to a
//! tracked file.

use std::path::{Path, PathBuf};

/// Language key for Groovy in the host catalog.
pub const GROOVY_KEY: &str = "grvy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileKind {
    Main,
    Test,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A file known to the host.
pub struct InputFile {
    /// Path relative to the source root, `/`-separated.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub language: Option<String>,
    pub kind: FileKind,
}

impl InputFile {
    pub fn new(relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        Self {
            absolute_path: PathBuf::from(&relative_path),
            relative_path,
            language: None,
            kind: FileKind::Main,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_absolute_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.absolute_path = path.into();
        self
    }

    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_groovy(&self) -> bool {
        self.language.as_deref() == Some(GROOVY_KEY)
    }
}

/// Host view of the tracked files of a project.
pub trait FileSystemView {
    fn input_files(&self) -> &[InputFile];
}

impl FileSystemView for Vec<InputFile> {
    fn input_files(&self) -> &[InputFile] {
        self
    }
}

/// Groovy-only view over a `FileSystemView`.
pub struct GroovyFiles<'a> {
    fs: &'a dyn FileSystemView,
}

impl<'a> GroovyFiles<'a> {
    pub fn new(fs: &'a dyn FileSystemView) -> Self {
        Self { fs }
    }

    /// True when any tracked file, main or test, is Groovy.
    pub fn has_groovy_files(&self) -> bool {
        self.fs.input_files().iter().any(InputFile::is_groovy)
    }

    /// Groovy main sources, in host order.
    pub fn source_files(&self) -> Vec<&'a InputFile> {
        self.fs
            .input_files()
            .iter()
            .filter(|f| f.is_groovy() && f.kind == FileKind::Main)
            .collect()
    }

    pub fn source_input_file_from_relative_path(&self, path: Option<&str>) -> Option<&'a InputFile> {
        path.and_then(|p| match_suffix(&self.source_files(), &normalize(p)))
    }

    /// Map a path reported by the linter to a tracked Groovy source.
    ///
    /// An absolute path first tries an exact match on `absolute_path`.
    /// Anything left over goes through suffix matching on component
    /// boundaries, so reports written against another root still resolve.
    pub fn resolve(&self, reported: &str) -> Option<&'a InputFile> {
        let sources = self.source_files();
        let wanted = Path::new(reported);
        let exact = if wanted.is_absolute() {
            sources
                .iter()
                .copied()
                .find(|f| f.absolute_path.as_path() == wanted)
        } else {
            None
        };
        let found = exact.or_else(|| match_suffix(&sources, &normalize(reported)));
        if found.is_none() {
            tracing::debug!(path = reported, "no tracked source file for violation");
        }
        found
    }
}

/// Suffix resolution of a normalized reported path.
///
/// First pass: the reported path ends a file's relative or absolute path;
/// the shortest relative path wins, then the lexicographically smallest.
/// Second pass, only when the first finds nothing: a file's relative path
/// ends the reported path (the report carries a longer prefix); the
/// longest relative path wins, being the most specific.
fn match_suffix<'a>(sources: &[&'a InputFile], wanted: &str) -> Option<&'a InputFile> {
    if wanted.is_empty() {
        return None;
    }
    let mut inner: Vec<&'a InputFile> = sources
        .iter()
        .copied()
        .filter(|f| {
            has_path_suffix(&f.relative_path, wanted)
                || has_path_suffix(&f.absolute_path.to_string_lossy(), wanted)
        })
        .collect();
    if !inner.is_empty() {
        if inner.len() > 1 {
            tracing::debug!(
                path = wanted,
                candidates = inner.len(),
                "ambiguous path; taking the shortest match"
            );
        }
        inner.sort_by(|a, b| {
            a.relative_path
                .len()
                .cmp(&b.relative_path.len())
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        return inner.into_iter().next();
    }
    sources
        .iter()
        .copied()
        .filter(|f| !f.relative_path.is_empty() && has_path_suffix(wanted, &normalize(&f.relative_path)))
        .min_by(|a, b| {
            b.relative_path
                .len()
                .cmp(&a.relative_path.len())
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        })
}

fn normalize(p: &str) -> String {
    let p = p.replace('\\', "/");
    let mut s = p.as_str();
    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }
    s.trim_start_matches('/').to_string()
}

fn has_path_suffix(path: &str, suffix: &str) -> bool {
    let path = normalize(path);
    path == suffix
        || path
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('/'))
}
