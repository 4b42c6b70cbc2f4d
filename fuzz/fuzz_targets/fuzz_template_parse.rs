//! Fuzz target for template document parsing.
//!
//! Parsing must never panic; malformed input is reported as an error with a
//! line number inside the document.

#![no_main]

use cs_template::{TemplateDocument, TemplateError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    match TemplateDocument::parse(text) {
        Ok(doc) => {
            for name in doc.section_names() {
                assert!(doc.section(name).is_some());
            }
        }
        Err(TemplateError::Malformed { line, .. }) => {
            assert!(line >= 1 && line <= text.lines().count().max(1));
        }
        Err(_) => {}
    }
});
