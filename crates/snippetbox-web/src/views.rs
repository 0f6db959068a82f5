//! View data handed to page templates.

use chrono::{Datelike, Utc};
use serde::Serialize;
use snippetbox_store::Snippet;

use crate::forms::SnippetCreateForm;

/// Everything a page template may read. Built fresh for each response.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub snippet: Option<Snippet>,
    pub snippets: Option<Vec<Snippet>>,
    pub form: Option<SnippetCreateForm>,
}

impl TemplateData {
    /// Envelope with only the defaults (the current year) filled in.
    pub fn new() -> Self {
        Self {
            current_year: Utc::now().year(),
            snippet: None,
            snippets: None,
            form: None,
        }
    }

    pub fn with_snippet(mut self, snippet: Snippet) -> Self {
        self.snippet = Some(snippet);
        self
    }

    pub fn with_snippets(mut self, snippets: Vec<Snippet>) -> Self {
        self.snippets = Some(snippets);
        self
    }

    pub fn with_form(mut self, form: SnippetCreateForm) -> Self {
        self.form = Some(form);
        self
    }
}

impl Default for TemplateData {
    fn default() -> Self {
        Self::new()
    }
}
