//! Page template cache.
//!
//! Built once at startup from an HTML directory laid out as:
//!
//! ```text
//! html/
//!   base.html           shared layout
//!   partials/*.html     shared fragments, included as "partials/<file>"
//!   pages/*.html        one entry per page, keyed by file name
//! ```
//!
//! Each page gets its own `Tera` instance holding the base, every partial,
//! and that one page, so page blocks never collide. Rendering always
//! produces a complete `String`; nothing is written to the response until
//! it succeeds.

use std::collections::HashMap;
use std::error::Error as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera, Value};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors from building or rendering the template cache.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to discover templates in {dir}: {message}")]
    Discover { dir: PathBuf, message: String },

    #[error("failed to parse template set {name}: {message}")]
    Parse { name: String, message: String },

    #[error("the template {0} does not exist")]
    NotFound(String),

    #[error("failed to build template context: {0}")]
    Context(String),

    #[error("failed to render {name}: {message}")]
    Render { name: String, message: String },
}

/// Signature of a template filter.
pub type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// Filters registered on every template set.
#[derive(Clone)]
pub struct TemplateFunctions {
    filters: Vec<(&'static str, FilterFn)>,
}

impl TemplateFunctions {
    /// No filters at all.
    pub fn empty() -> Self {
        Self { filters: Vec::new() }
    }

    pub fn with_filter(mut self, name: &'static str, filter: FilterFn) -> Self {
        self.filters.push((name, filter));
        self
    }

    fn register(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, *filter);
        }
    }
}

impl Default for TemplateFunctions {
    fn default() -> Self {
        Self::empty().with_filter("human_date", human_date)
    }
}

/// Format an RFC 3339 timestamp as `02 Jan 2006 at 15:04` (UTC).
///
/// Null and empty input render as an empty string; anything else that does
/// not parse is passed through untouched.
pub fn human_date(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let Some(raw) = value.as_str() else {
        return Ok(if value.is_null() {
            Value::String(String::new())
        } else {
            value.clone()
        });
    };
    if raw.is_empty() {
        return Ok(Value::String(String::new()));
    }
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Ok(Value::String(
            t.with_timezone(&chrono::Utc)
                .format("%d %b %Y at %H:%M")
                .to_string(),
        )),
        Err(_) => Ok(value.clone()),
    }
}

/// Compiled page templates keyed by page file name.
pub struct TemplateCache {
    pages: HashMap<String, Tera>,
}

impl TemplateCache {
    /// Discover and compile every page under `html_dir/pages`.
    pub fn build(html_dir: &Path, functions: &TemplateFunctions) -> TemplateResult<Self> {
        let base = html_dir.join("base.html");
        let partials_dir = html_dir.join("partials");
        let partials = if partials_dir.is_dir() {
            discover(&partials_dir)?
        } else {
            Vec::new()
        };

        let mut pages = HashMap::new();
        for page in discover(&html_dir.join("pages"))? {
            let name = file_name(&page);

            let mut files: Vec<(PathBuf, Option<String>)> =
                vec![(base.clone(), Some("base.html".to_string()))];
            for partial in &partials {
                files.push((partial.clone(), Some(format!("partials/{}", file_name(partial)))));
            }
            files.push((page.clone(), Some(name.clone())));

            let mut tera = Tera::default();
            functions.register(&mut tera);
            tera.add_template_files(files).map_err(|e| TemplateError::Parse {
                name: name.clone(),
                message: error_chain(&e),
            })?;

            debug!(page = %name, "template set compiled");
            pages.insert(name, tera);
        }

        Ok(Self { pages })
    }

    /// Render `page` with `data` into a buffer.
    pub fn render<T: Serialize>(&self, page: &str, data: &T) -> TemplateResult<String> {
        let tera = self
            .pages
            .get(page)
            .ok_or_else(|| TemplateError::NotFound(page.to_string()))?;

        let value = serde_json::to_value(data).map_err(|e| TemplateError::Context(e.to_string()))?;
        let context = Context::from_value(value).map_err(|e| TemplateError::Context(error_chain(&e)))?;

        tera.render(page, &context).map_err(|e| TemplateError::Render {
            name: page.to_string(),
            message: error_chain(&e),
        })
    }

    /// Cached page names, sorted.
    pub fn pages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// `*.html` files directly inside `dir`, sorted by name.
fn discover(dir: &Path) -> TemplateResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| TemplateError::Discover {
            dir: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "html") {
            found.push(path.to_path_buf());
        }
    }
    Ok(found)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Tera keeps the useful part of an error in its source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
