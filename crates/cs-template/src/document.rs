//! Parsed template documents.
//!
//! Syntax:
//! - A section starts with a line `<!-- section: NAME -->` and ends with a
//!   line `<!-- endsection -->`. Markers must stand alone on their line.
//! - Text outside of sections is ignored.
//! - Placeholders are `{{name}}` with `name` matching `[A-Za-z_][A-Za-z0-9_]*`.
//!
//! Section markup is the text between the two marker lines, joined with `\n`
//! and without a trailing newline.

use crate::error::{Result, TemplateError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

static RE_SECTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<!--\s*section:\s*(\S*)\s*-->\s*$").expect("static regex"));

static RE_SECTION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<!--\s*endsection\s*-->\s*$").expect("static regex"));

static RE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

/// Matches one placeholder token; group 1 is the name.
pub(crate) static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("static regex"));

/// One named section of a template document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    markup: String,
    placeholders: BTreeSet<String>,
    /// 1-based line of the start marker.
    line: usize,
}

impl Section {
    fn new(name: String, markup: String, line: usize) -> Self {
        let placeholders = RE_PLACEHOLDER
            .captures_iter(&markup)
            .map(|caps| caps[1].to_string())
            .collect();
        Self {
            name,
            markup,
            placeholders,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw markup with unsubstituted placeholders.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Distinct placeholder names used by this section.
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders.contains(name)
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// An immutable, parsed template document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDocument {
    sections: BTreeMap<String, Section>,
    /// Section names in document order.
    order: Vec<String>,
}

impl TemplateDocument {
    /// Read and parse a template file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse template text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = TemplateDocument::default();
        // (name, start line, body lines)
        let mut open: Option<(String, usize, Vec<&str>)> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if let Some(caps) = RE_SECTION_START.captures(line) {
                if let Some((outer, outer_line, _)) = &open {
                    return Err(malformed(
                        line_no,
                        format!(
                            "section '{}' opened inside section '{}' (line {})",
                            &caps[1], outer, outer_line
                        ),
                    ));
                }
                let name = caps[1].to_string();
                if !RE_NAME.is_match(&name) {
                    return Err(malformed(line_no, format!("invalid section name '{}'", name)));
                }
                if doc.sections.contains_key(&name) {
                    return Err(malformed(line_no, format!("duplicate section '{}'", name)));
                }
                open = Some((name, line_no, Vec::new()));
            } else if RE_SECTION_END.is_match(line) {
                match open.take() {
                    Some((name, start, body)) => {
                        let section = Section::new(name.clone(), body.join("\n"), start);
                        doc.order.push(name.clone());
                        doc.sections.insert(name, section);
                    }
                    None => {
                        return Err(malformed(line_no, "endsection without open section"));
                    }
                }
            } else if let Some((_, _, body)) = open.as_mut() {
                body.push(line);
            }
        }

        if let Some((name, start, _)) = open {
            return Err(malformed(
                start,
                format!("section '{}' is never closed", name),
            ));
        }
        Ok(doc)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Names from `required` that this document lacks.
    pub fn missing_sections<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect()
    }
}

fn malformed(line: usize, message: impl Into<String>) -> TemplateError {
    TemplateError::Malformed {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
<!DOCTYPE html>
<!-- section: script -->
<script src=\"{{path}}\"></script>
<!-- endsection -->
ignored text
<!-- section: graph -->
<div id=\"{{plotId}}\"></div>
<script>Plotly.newPlot('{{plotId}}', {{dates}});</script>
<!-- endsection -->
";

    #[test]
    fn test_parse_sections_and_placeholders() {
        let doc = TemplateDocument::parse(DOC).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["script", "graph"]);

        let script = doc.section("script").unwrap();
        assert_eq!(script.markup(), "<script src=\"{{path}}\"></script>");
        assert_eq!(script.line(), 2);

        let graph = doc.section("graph").unwrap();
        let names: Vec<&str> = graph.placeholders().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["dates", "plotId"]);
        assert!(!doc.contains("ignored"));
    }

    #[test]
    fn test_multiline_markup_keeps_inner_newlines() {
        let doc =
            TemplateDocument::parse("<!-- section: a -->\nline1\n\nline3\n<!-- endsection -->")
                .unwrap();
        assert_eq!(doc.section("a").unwrap().markup(), "line1\n\nline3");
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc =
            TemplateDocument::parse("<!-- section: a -->\r\n<p>{{x}}</p>\r\n<!-- endsection -->\r\n")
                .unwrap();
        assert_eq!(doc.section("a").unwrap().markup(), "<p>{{x}}</p>");
    }

    #[test]
    fn test_empty_section() {
        let doc = TemplateDocument::parse("<!-- section: empty -->\n<!-- endsection -->").unwrap();
        assert_eq!(doc.section("empty").unwrap().markup(), "");
        assert!(doc.section("empty").unwrap().placeholders().is_empty());
    }

    #[test]
    fn test_invalid_placeholder_syntax_is_plain_text() {
        let doc =
            TemplateDocument::parse("<!-- section: a -->\n{{ x }} {{1x}} {x}\n<!-- endsection -->")
                .unwrap();
        assert!(doc.section("a").unwrap().placeholders().is_empty());
    }

    fn malformed_line(text: &str) -> usize {
        match TemplateDocument::parse(text) {
            Err(TemplateError::Malformed { line, .. }) => line,
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_section_rejected() {
        let text = "<!-- section: a -->\n<!-- section: b -->\n<!-- endsection -->\n<!-- endsection -->";
        assert_eq!(malformed_line(text), 2);
    }

    #[test]
    fn test_stray_endsection_rejected() {
        assert_eq!(malformed_line("text\n<!-- endsection -->"), 2);
    }

    #[test]
    fn test_unterminated_section_rejected() {
        assert_eq!(malformed_line("\n\n<!-- section: a -->\nbody"), 3);
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let text = "<!-- section: a -->\n<!-- endsection -->\n<!-- section: a -->\n<!-- endsection -->";
        assert_eq!(malformed_line(text), 3);
    }

    #[test]
    fn test_invalid_section_name_rejected() {
        assert_eq!(malformed_line("<!-- section: 1abc -->\n<!-- endsection -->"), 1);
        assert_eq!(malformed_line("<!-- section: -->\n<!-- endsection -->"), 1);
    }

    #[test]
    fn test_missing_sections() {
        let doc = TemplateDocument::parse(DOC).unwrap();
        assert_eq!(doc.missing_sections(&["script", "full", "graph", "index"]), vec!["full", "index"]);
    }

    #[test]
    fn test_missing_file() {
        let err = TemplateDocument::from_file(Path::new("/no/such/main.tpl")).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
        assert_eq!(err.kind(), cs_common::ErrorKind::TemplateLoad);
    }
}
