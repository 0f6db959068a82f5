//! snippetbox-web: server-rendered web UI for Snippetbox.
//!
//! Provides the axum router, page handlers, form validation, the page
//! template cache and the middleware chain.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | Latest snippets |
//! | GET | `/snippet/view/{id}` | Snippet detail |
//! | GET | `/snippet/create` | Create form |
//! | POST | `/snippet/create` | Create submit |
//! | GET | `/static/*` | Static assets |

pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod templates;
pub mod views;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::get;
use snippetbox_store::SnippetStore;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub use error::{AppError, AppResult};
pub use templates::{TemplateCache, TemplateError, TemplateFunctions};

/// Shared state for page handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SnippetStore,
    pub templates: Arc<TemplateCache>,
}

/// Where the UI lives on disk and which template filters to install.
#[derive(Clone)]
pub struct WebConfig {
    pub html_dir: PathBuf,
    pub static_dir: PathBuf,
    pub functions: TemplateFunctions,
}

impl WebConfig {
    /// Standard layout: `<ui>/html` and `<ui>/static`.
    pub fn from_ui_dir(ui_dir: &Path) -> Self {
        Self {
            html_dir: ui_dir.join("html"),
            static_dir: ui_dir.join("static"),
            functions: TemplateFunctions::default(),
        }
    }
}

/// Build the template cache and the full router.
pub fn build_app(store: SnippetStore, config: &WebConfig) -> Result<Router, TemplateError> {
    let templates = TemplateCache::build(&config.html_dir, &config.functions)?;
    info!(pages = ?templates.pages(), "template cache built");

    let state = AppState {
        store,
        templates: Arc::new(templates),
    };
    Ok(build_router(state, &config.static_dir))
}

/// Build the router with the standard middleware chain.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::home))
        .route("/snippet/view/{id}", get(handlers::snippet_view))
        .route(
            "/snippet/create",
            get(handlers::snippet_create).post(handlers::snippet_create_post),
        )
        .nest_service(middleware::STATIC_PREFIX, static_files(static_dir))
        .fallback(handlers::not_found)
        .with_state(state);

    with_middleware(routes)
}

/// `ServeDir` sees paths with the mount prefix stripped, so its
/// trailing-slash redirects have to be put back under the mount.
fn static_files(static_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum_mw::map_response(middleware::remount_redirect))
}

/// Wrap `router` in panic recovery, access logging and security headers
/// (outermost first).
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(axum_mw::map_response(middleware::secure_headers))
        .layer(axum_mw::from_fn(middleware::log_request))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
}
