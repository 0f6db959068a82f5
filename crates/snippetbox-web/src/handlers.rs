//! Page handlers.
//!
//! Each handler reads the request, calls the snippet store, builds a
//! `TemplateData` and renders a page from the template cache, or redirects
//! after a successful write.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use snippetbox_store::{DEFAULT_LATEST_LIMIT, SnippetId};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::forms::{SnippetCreateForm, SnippetCreateInput};
use crate::views::TemplateData;

/// Render `page` fully, then attach the status.
fn render(
    state: &AppState,
    status: StatusCode,
    page: &str,
    data: &TemplateData,
) -> AppResult<Response> {
    let body = state.templates.render(page, data)?;
    Ok((status, Html(body)).into_response())
}

/// Snippet ids are positive integers; anything else is treated as missing.
fn parse_id(raw: &str) -> Option<SnippetId> {
    raw.parse::<SnippetId>().ok().filter(|id| *id >= 1)
}

// ── Home ────────────────────────────────────────────────────────

pub async fn home(State(state): State<AppState>) -> AppResult<Response> {
    let snippets = state.store.latest(DEFAULT_LATEST_LIMIT).await?;
    let data = TemplateData::new().with_snippets(snippets);
    render(&state, StatusCode::OK, "home.html", &data)
}

// ── View ────────────────────────────────────────────────────────

pub async fn snippet_view(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&raw_id).ok_or(AppError::NotFound)?;
    let snippet = state.store.get(id).await?;
    let data = TemplateData::new().with_snippet(snippet);
    render(&state, StatusCode::OK, "view.html", &data)
}

// ── Create ──────────────────────────────────────────────────────

pub async fn snippet_create(State(state): State<AppState>) -> AppResult<Response> {
    let data = TemplateData::new().with_form(SnippetCreateForm::default());
    render(&state, StatusCode::OK, "create.html", &data)
}

pub async fn snippet_create_post(
    State(state): State<AppState>,
    input: Result<Form<SnippetCreateInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(input) = input.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut form = SnippetCreateForm::from(input);
    if !form.validate() {
        let data = TemplateData::new().with_form(form);
        return render(&state, StatusCode::UNPROCESSABLE_ENTITY, "create.html", &data);
    }

    let id = state
        .store
        .insert(&form.title, &form.content, form.expires)
        .await?;
    tracing::info!(id, "snippet created");

    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}

// ── Fallback ────────────────────────────────────────────────────

pub async fn not_found() -> AppError {
    AppError::NotFound
}
