//! Fuzz target for section rendering.
//!
//! Renders every section of an arbitrary document with arbitrary values.

#![no_main]

use arbitrary::Arbitrary;
use cs_template::{TemplateEngine, UnknownPlaceholderPolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    template: String,
    values: Vec<(String, String)>,
    escape: bool,
}

fuzz_target!(|input: Input| {
    let mut engine = TemplateEngine::new().with_policy(UnknownPlaceholderPolicy::Ignore);
    if engine.load_document_str(&input.template).is_err() {
        return;
    }
    let names: Vec<String> = match engine.document() {
        Some(doc) => doc.section_names().map(str::to_string).collect(),
        None => return,
    };
    for name in names {
        engine.load_section(&name).expect("listed section loads");
        for (key, value) in &input.values {
            let _ = if input.escape {
                engine.tag(key, value)
            } else {
                engine.integrate(key, value)
            };
        }
        let first = engine.generate().expect("active section renders");
        let second = engine.generate().expect("active section renders");
        assert_eq!(first, second);
    }
});
