//! CodeNarc XML report parser.
//!
//! Reads the `CodeNarc > Package > File > Violation` tree into a flat list
//! of `Violation` records in document order. Structural problems in the
//! XML fail the whole parse; an incomplete violation does not:
//! - no `ruleName`, or no enclosing `File`: the violation is dropped;
//! - no usable `lineNumber`: `line` is `None`;
//! - no `Message`: the message is empty.

use crate::error::AnalysisError;
use crate::models::Violation;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("document ended inside <{0}>")]
    Truncated(String),

    #[error("document has no root element")]
    Empty,

    #[error("second root element <{0}>")]
    ExtraRoot(String),
}

/// Parse the report at `path`.
///
/// A report that does not exist means the linter found nothing to say and
/// yields no violations.
pub fn parse_report(path: &Path) -> Result<Vec<Violation>, AnalysisError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "CodeNarc report not found; no violations");
            return Ok(Vec::new());
        }
        Err(e) => return Err(AnalysisError::io(path, e)),
    };
    let violations =
        parse_reader(BufReader::new(file)).map_err(|source| AnalysisError::MalformedReport {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), count = violations.len(), "parsed report");
    Ok(violations)
}

/// Parse a report from any buffered source.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<Violation>, ReportError> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);
    let mut buf = Vec::new();
    let mut state = ParseState::default();
    let mut open: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = element_name(&e);
                if open.is_empty() && seen_root {
                    return Err(ReportError::ExtraRoot(name));
                }
                seen_root = true;
                state.open(&name, &e)?;
                open.push(name);
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                if open.is_empty() && seen_root {
                    return Err(ReportError::ExtraRoot(name));
                }
                seen_root = true;
                state.open(&name, &e)?;
                state.close(&name);
            }
            Event::End(_) => {
                // End names are checked against start names by the reader.
                if let Some(name) = open.pop() {
                    state.close(&name);
                }
            }
            Event::Text(t) => state.text(&t.unescape()?),
            Event::CData(c) => state.text(&String::from_utf8_lossy(&c.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(name) = open.pop() {
        return Err(ReportError::Truncated(name));
    }
    if !seen_root {
        return Err(ReportError::Empty);
    }
    Ok(state.violations)
}

/// Convenience for in-memory reports.
pub fn parse_str(s: &str) -> Result<Vec<Violation>, ReportError> {
    parse_reader(s.as_bytes())
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attr(e: &BytesStart, key: &str) -> Result<Option<String>, ReportError> {
    for a in e.attributes() {
        let a = a.map_err(quick_xml::Error::from)?;
        if a.key.as_ref() == key.as_bytes() {
            return Ok(Some(a.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[derive(Default)]
struct PendingViolation {
    rule_key: Option<String>,
    line: Option<u32>,
    message: String,
}

#[derive(Default)]
struct ParseState {
    package: String,
    file: Option<String>,
    pending: Option<PendingViolation>,
    in_message: bool,
    violations: Vec<Violation>,
}

impl ParseState {
    fn open(&mut self, name: &str, e: &BytesStart) -> Result<(), ReportError> {
        match name {
            "Package" => {
                self.package = attr(e, "path")?.unwrap_or_default();
            }
            "File" => {
                let file_name = attr(e, "name")?.unwrap_or_default();
                self.file = Some(join_package(&self.package, &file_name));
            }
            "Violation" => {
                self.pending = Some(PendingViolation {
                    rule_key: attr(e, "ruleName")?.filter(|s| !s.trim().is_empty()),
                    line: attr(e, "lineNumber")?.and_then(|s| parse_line(&s)),
                    ..PendingViolation::default()
                });
            }
            "Message" if self.pending.is_some() => self.in_message = true,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        match name {
            "Package" => self.package.clear(),
            "File" => self.file = None,
            "Violation" => {
                if let Some(p) = self.pending.take() {
                    self.finish(p);
                }
            }
            "Message" => self.in_message = false,
            _ => {}
        }
    }

    fn text(&mut self, s: &str) {
        if let (Some(p), true) = (self.pending.as_mut(), self.in_message) {
            p.message.push_str(s);
        }
    }

    fn finish(&mut self, p: PendingViolation) {
        let Some(rule_key) = p.rule_key else {
            tracing::warn!(file = ?self.file, "skipping violation without ruleName");
            return;
        };
        let Some(file) = self.file.clone() else {
            tracing::warn!(rule = %rule_key, "skipping violation outside of a File element");
            return;
        };
        self.violations.push(Violation {
            rule_key,
            file,
            line: p.line,
            message: p.message.trim().to_string(),
        });
    }
}

fn join_package(package: &str, file_name: &str) -> String {
    let package = package.trim_matches('/');
    if package.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", package, file_name)
    }
}

fn parse_line(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_parse_sample_in_document_order() {
        let v = parse_report(&fixture("sample.xml")).unwrap();
        assert_eq!(v.len(), 4);
        assert_eq!(v[0].rule_key, "EmptyClass");
        assert_eq!(v[0].file, "Bootstrap.groovy");
        assert_eq!(v[0].line, Some(1));
        assert_eq!(v[1].rule_key, "UnusedImport");
        assert_eq!(v[1].file, "org/example/domain/Account.groovy");
        assert_eq!(
            v[1].message,
            "The [java.util.regex.Matcher] import is never referenced"
        );
        assert_eq!(v[2].rule_key, "EmptyIfStatement");
        assert_eq!(v[2].message, "");
        assert_eq!(v[3].rule_key, "ClassSize");
        assert_eq!(v[3].line, None);
        assert!(v[3].message.contains("412 lines & exceeds"));
    }

    #[test]
    fn test_missing_report_is_empty() {
        let v = parse_report(&fixture("does-not-exist.xml")).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_incomplete_violations() {
        let v = parse_str(
            r#"<CodeNarc>
  <Package path='a'>
    <File name='A.groovy'>
      <Violation priority='2' lineNumber='3'><Message>no rule</Message></Violation>
      <Violation ruleName='  ' lineNumber='3'/>
      <Violation ruleName='BadLine' lineNumber='abc'/>
      <Violation ruleName='ZeroLine' lineNumber='0'/>
      <Violation ruleName='NoLine'><Message>text</Message></Violation>
    </File>
  </Package>
  <Violation ruleName='Orphan' lineNumber='1'/>
</CodeNarc>"#,
        )
        .unwrap();
        let keys: Vec<&str> = v.iter().map(|x| x.rule_key.as_str()).collect();
        assert_eq!(keys, vec!["BadLine", "ZeroLine", "NoLine"]);
        assert!(v.iter().all(|x| x.line.is_none()));
        assert!(v.iter().all(|x| x.file == "a/A.groovy"));
        assert_eq!(v[2].message, "text");
    }

    #[test]
    fn test_file_path_resets_between_packages() {
        let v = parse_str(
            r#"<CodeNarc>
  <Package path='org/a/'><File name='A.groovy'><Violation ruleName='R' lineNumber='1'/></File></Package>
  <Package><File name='B.groovy'><Violation ruleName='R' lineNumber='2'/></File></Package>
</CodeNarc>"#,
        )
        .unwrap();
        assert_eq!(v[0].file, "org/a/A.groovy");
        assert_eq!(v[1].file, "B.groovy");
    }

    #[test]
    fn test_report_without_violations() {
        let v = parse_str("<CodeNarc><PackageSummary totalFiles='0'/></CodeNarc>").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let err = parse_str("<CodeNarc><Package path='a'></File></CodeNarc>").unwrap_err();
        assert!(matches!(err, ReportError::Xml(_)));
    }

    #[test]
    fn test_second_root_element_fails() {
        let err = parse_str("<CodeNarc/><CodeNarc><Package path='a'/></CodeNarc>").unwrap_err();
        assert!(matches!(err, ReportError::ExtraRoot(ref n) if n == "CodeNarc"));
        let err = parse_str("<CodeNarc></CodeNarc><Other/>").unwrap_err();
        assert!(matches!(err, ReportError::ExtraRoot(ref n) if n == "Other"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_report_is_fatal() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codenarc.xml");
        std::fs::write(&path, "<CodeNarc/>").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores file modes
        if File::open(&path).is_ok() {
            return;
        }
        let err = parse_report(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_report_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_report(dir.path()).is_err());
    }

    #[test]
    fn test_truncated_document_fails() {
        let err = parse_str("<CodeNarc><Package path='a'><File name='A.groovy'>").unwrap_err();
        assert!(matches!(err, ReportError::Truncated(ref n) if n == "File"));
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(matches!(parse_str("").unwrap_err(), ReportError::Empty));
        assert!(matches!(
            parse_str("<?xml version='1.0'?>").unwrap_err(),
            ReportError::Empty
        ));
    }

    #[test]
    fn test_truncated_report_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        std::fs::write(&path, "<CodeNarc><Package>").unwrap();
        let err = parse_report(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedReport { .. }));
    }
}
