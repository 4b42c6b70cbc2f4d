//! Section-based template engine for the corona site pages.
//!
//! A template document holds named sections:
//!
//! ```text
//! <!-- section: graph -->
//! <div id="{{plotId}}"></div>
//! <script>Plotly.newPlot('{{plotId}}', [{ x: {{dates}}, y: {{infections}} }]);</script>
//! <!-- endsection -->
//! ```
//!
//! The engine renders one section at a time. Fragments are composed bottom-up
//! by the caller: render an inner section, then [`TemplateEngine::integrate`]
//! its output into a placeholder of the outer one.
//!
//! # Example
//!
//! ```
//! use cs_template::{TemplateDocument, TemplateEngine};
//! use std::sync::Arc;
//!
//! let doc = TemplateDocument::parse(
//!     "<!-- section: link -->\n<a href=\"{{url}}\">{{text}}</a>\n<!-- endsection -->",
//! )
//! .unwrap();
//! let mut tpl = TemplateEngine::with_document(Arc::new(doc));
//! tpl.load_section("link").unwrap();
//! tpl.tag("url", "./de.html").unwrap();
//! tpl.tag("text", "Germany (DE)").unwrap();
//! assert_eq!(tpl.generate().unwrap(), "<a href=\"./de.html\">Germany (DE)</a>");
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod html;

pub use document::{Section, TemplateDocument};
pub use engine::{EngineState, TemplateEngine, UnknownPlaceholderPolicy};
pub use error::{Result, TemplateError};
pub use html::escape;
