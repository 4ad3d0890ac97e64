//! Export of the active rules as a CodeNarc ruleset file.
//!
//! CodeNarc only runs the rules named in its ruleset, so the sensor writes
//! one per run before invoking the linter.

use crate::error::AnalysisError;
use crate::rules::ActiveRule;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

const RULESET_NS: &str = "http://codenarc.org/ruleset/1.0";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://codenarc.org/ruleset/1.0 http://codenarc.org/ruleset-schema.xsd";

/// Render the ruleset XML for `rules`, keeping their order.
pub fn export_ruleset(rules: &[&ActiveRule]) -> Result<String, AnalysisError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let root = BytesStart::new("ruleset").with_attributes([
        ("xmlns", RULESET_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
    ]);
    w.write_event(Event::Start(root))?;
    for r in rules {
        let el = BytesStart::new("rule").with_attributes([("class", r.config_key.as_str())]);
        if r.params.is_empty() {
            w.write_event(Event::Empty(el))?;
            continue;
        }
        w.write_event(Event::Start(el))?;
        for (name, value) in &r.params {
            let prop = BytesStart::new("property")
                .with_attributes([("name", name.as_str()), ("value", value.as_str())]);
            w.write_event(Event::Empty(prop))?;
        }
        w.write_event(Event::End(BytesEnd::new("rule")))?;
    }
    w.write_event(Event::End(BytesEnd::new("ruleset")))?;
    Ok(String::from_utf8_lossy(&w.into_inner()).into_owned())
}

/// Write the ruleset for `rules` to `path`.
pub fn write_ruleset(path: &Path, rules: &[&ActiveRule]) -> Result<(), AnalysisError> {
    let xml = export_ruleset(rules)?;
    fs::write(path, xml).map_err(|e| AnalysisError::io(path, e))?;
    tracing::debug!(path = %path.display(), rules = rules.len(), "wrote CodeNarc ruleset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleRef;

    #[test]
    fn test_export_rules_and_params() {
        let plain = ActiveRule::new(
            RuleRef::new("codenarc", "EmptyClass"),
            "org.codenarc.rule.basic.EmptyClassRule",
        );
        let mut sized = ActiveRule::new(
            RuleRef::new("codenarc", "MethodSize"),
            "org.codenarc.rule.size.MethodSizeRule",
        );
        sized.params.insert("maxLines".into(), "50".into());
        sized.params.insert("doNotApplyToClassNames".into(), "A<B>".into());

        let xml = export_ruleset(&[&plain, &sized]).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"<rule class="org.codenarc.rule.basic.EmptyClassRule"/>"#));
        assert!(xml.contains(r#"<rule class="org.codenarc.rule.size.MethodSizeRule">"#));
        assert!(xml.contains(r#"<property name="maxLines" value="50"/>"#));
        // Values are escaped
        assert!(xml.contains("A&lt;B&gt;"));
        let first = xml.find("EmptyClassRule").unwrap();
        let second = xml.find("MethodSizeRule").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_export_empty_ruleset() {
        let xml = export_ruleset(&[]).unwrap();
        assert!(xml.contains("<ruleset"));
        assert!(xml.contains("</ruleset>"));
    }
}
