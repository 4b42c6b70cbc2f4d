//! Template engine state machine.
//!
//! ```text
//! Unloaded --load_document--> DocumentLoaded --load_section--> SectionActive
//!                                                  SectionActive --load_section--> SectionActive
//! ```
//!
//! `tag`, `integrate` and `generate` are only valid in `SectionActive`.
//! Loading a section always starts from an empty substitution set.

use crate::document::{Section, TemplateDocument, RE_PLACEHOLDER};
use crate::error::{Result, TemplateError};
use crate::html;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do with `tag`/`integrate` calls for names the active section does not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPlaceholderPolicy {
    /// Store the value; it has no effect on the output.
    #[default]
    Ignore,
    /// Fail with [`TemplateError::UnknownPlaceholder`].
    Reject,
}

impl std::str::FromStr for UnknownPlaceholderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(UnknownPlaceholderPolicy::Ignore),
            "reject" => Ok(UnknownPlaceholderPolicy::Reject),
            _ => Err(format!("unknown placeholder policy: {}", s)),
        }
    }
}

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    DocumentLoaded,
    SectionActive,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Unloaded => write!(f, "unloaded"),
            EngineState::DocumentLoaded => write!(f, "document loaded"),
            EngineState::SectionActive => write!(f, "section active"),
        }
    }
}

/// Active section plus its substitutions.
#[derive(Debug)]
struct RenderContext {
    section: String,
    values: HashMap<String, String>,
}

#[derive(Debug)]
enum Phase {
    Unloaded,
    DocumentLoaded(Arc<TemplateDocument>),
    SectionActive(Arc<TemplateDocument>, RenderContext),
}

/// Renders sections of one template document.
#[derive(Debug)]
pub struct TemplateEngine {
    phase: Phase,
    policy: UnknownPlaceholderPolicy,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Engine without a document.
    pub fn new() -> Self {
        Self {
            phase: Phase::Unloaded,
            policy: UnknownPlaceholderPolicy::default(),
        }
    }

    /// Engine over an already parsed, shared document.
    pub fn with_document(document: Arc<TemplateDocument>) -> Self {
        Self {
            phase: Phase::DocumentLoaded(document),
            policy: UnknownPlaceholderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownPlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnknownPlaceholderPolicy {
        self.policy
    }

    pub fn state(&self) -> EngineState {
        match self.phase {
            Phase::Unloaded => EngineState::Unloaded,
            Phase::DocumentLoaded(_) => EngineState::DocumentLoaded,
            Phase::SectionActive(..) => EngineState::SectionActive,
        }
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&Arc<TemplateDocument>> {
        match &self.phase {
            Phase::Unloaded => None,
            Phase::DocumentLoaded(doc) | Phase::SectionActive(doc, _) => Some(doc),
        }
    }

    /// Name of the active section, if any.
    pub fn active_section(&self) -> Option<&str> {
        match &self.phase {
            Phase::SectionActive(_, ctx) => Some(&ctx.section),
            _ => None,
        }
    }

    /// Read and parse a template file. Only valid while unloaded.
    ///
    /// On failure the engine stays unloaded.
    pub fn load_document(&mut self, path: &Path) -> Result<()> {
        self.expect_unloaded("load a document")?;
        let doc = TemplateDocument::from_file(path)?;
        debug!(path = %path.display(), sections = doc.len(), "Loaded template document");
        self.phase = Phase::DocumentLoaded(Arc::new(doc));
        Ok(())
    }

    /// Parse template text. Only valid while unloaded.
    pub fn load_document_str(&mut self, text: &str) -> Result<()> {
        self.expect_unloaded("load a document")?;
        let doc = TemplateDocument::parse(text)?;
        self.phase = Phase::DocumentLoaded(Arc::new(doc));
        Ok(())
    }

    fn expect_unloaded(&self, operation: &'static str) -> Result<()> {
        match self.phase {
            Phase::Unloaded => Ok(()),
            _ => Err(TemplateError::InvalidState {
                operation,
                state: self.state(),
            }),
        }
    }

    /// Make `name` the active section with an empty substitution set.
    ///
    /// If the section does not exist, the engine keeps its previous state,
    /// including an active section and its substitutions.
    pub fn load_section(&mut self, name: &str) -> Result<()> {
        let doc = match &self.phase {
            Phase::Unloaded => {
                return Err(TemplateError::InvalidState {
                    operation: "load a section",
                    state: EngineState::Unloaded,
                })
            }
            Phase::DocumentLoaded(doc) | Phase::SectionActive(doc, _) => Arc::clone(doc),
        };
        if !doc.contains(name) {
            return Err(TemplateError::SectionNotFound(name.to_string()));
        }
        self.phase = Phase::SectionActive(
            doc,
            RenderContext {
                section: name.to_string(),
                values: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Set `name` to the HTML-escaped `value`.
    pub fn tag(&mut self, name: &str, value: &str) -> Result<()> {
        let escaped = html::escape(value).into_owned();
        self.set(name, escaped, "tag")
    }

    /// Set `name` to `content` without escaping.
    ///
    /// Used for rendered fragments and JSON literals.
    pub fn integrate(&mut self, name: &str, content: &str) -> Result<()> {
        self.set(name, content.to_string(), "integrate")
    }

    fn set(&mut self, name: &str, value: String, operation: &'static str) -> Result<()> {
        let state = self.state();
        let policy = self.policy;
        let (doc, ctx) = match &mut self.phase {
            Phase::SectionActive(doc, ctx) => (doc, ctx),
            _ => return Err(TemplateError::InvalidState { operation, state }),
        };
        let known = doc
            .section(&ctx.section)
            .is_some_and(|s| s.has_placeholder(name));
        if !known {
            match policy {
                UnknownPlaceholderPolicy::Reject => {
                    return Err(TemplateError::UnknownPlaceholder {
                        section: ctx.section.clone(),
                        name: name.to_string(),
                    });
                }
                UnknownPlaceholderPolicy::Ignore => {
                    debug!(section = %ctx.section, placeholder = name, "Value for unused placeholder");
                }
            }
        }
        ctx.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Render the active section.
    ///
    /// Substitution is a single pass over the section markup, so inserted
    /// values are never scanned for placeholders. Placeholders without a value
    /// stay in the output as written.
    pub fn generate(&self) -> Result<String> {
        let (doc, ctx) = match &self.phase {
            Phase::SectionActive(doc, ctx) => (doc, ctx),
            _ => {
                return Err(TemplateError::InvalidState {
                    operation: "generate",
                    state: self.state(),
                })
            }
        };
        let section = doc
            .section(&ctx.section)
            .ok_or_else(|| TemplateError::SectionNotFound(ctx.section.clone()))?;
        Ok(render(section, &ctx.values))
    }
}

fn render(section: &Section, values: &HashMap<String, String>) -> String {
    let mut unassigned = BTreeSet::new();
    let out = RE_PLACEHOLDER.replace_all(section.markup(), |caps: &Captures<'_>| {
        match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                unassigned.insert(caps[1].to_string());
                caps[0].to_string()
            }
        }
    });
    for name in &unassigned {
        warn!(section = section.name(), placeholder = %name, "Placeholder has no value");
    }
    out.into_owned()
}
