use crate::models::ContactForm;
use crate::services::{categories, documents, messages, posts, settings};
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

fn make_context(state: &AppState) -> AppResult<Context> {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx.insert("settings", &settings::settings_map(&state.db)?);
    Ok(ctx)
}

fn render_404(state: &AppState) -> AppResult<Response> {
    let ctx = make_context(state)?;
    let html = state.templates.render("public/404.html", &ctx)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

pub async fn not_found(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    render_404(&state)
}

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let recent_posts = posts::list_published(&state.db, None, state.config.content.recent_posts, 0)?;

    let mut ctx = make_context(&state)?;
    ctx.insert("recent_posts", &recent_posts);

    let html = state.templates.render("public/index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn about(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let ctx = make_context(&state)?;
    let html = state.templates.render("public/about.html", &ctx)?;
    Ok(Html(html))
}

pub async fn privacy(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let ctx = make_context(&state)?;
    let html = state.templates.render("public/privacy.html", &ctx)?;
    Ok(Html(html))
}

const MAX_PAGE: usize = 10000;

#[derive(Deserialize)]
pub struct BlogQuery {
    #[serde(default = "default_page")]
    page: usize,
    category: Option<i64>,
}

fn default_page() -> usize {
    1
}

pub async fn blog_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
) -> AppResult<Html<String>> {
    let per_page = state.config.content.posts_per_page;
    let page = query.page.clamp(1, MAX_PAGE);
    let offset = (page - 1) * per_page;

    let post_list = posts::list_published(&state.db, query.category, per_page, offset)?;
    let total = posts::count_published(&state.db, query.category)?;
    let total_pages = (total as usize + per_page - 1) / per_page;
    let category_list = categories::list_active(&state.db)?;

    let mut ctx = make_context(&state)?;
    ctx.insert("posts", &post_list);
    ctx.insert("categories", &category_list);
    ctx.insert("page", &page);
    ctx.insert("total_pages", &total_pages);
    ctx.insert("current_category", &query.category);

    let html = state.templates.render("public/blog.html", &ctx)?;
    Ok(Html(html))
}

pub async fn blog_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let post = posts::get_post_by_slug(&state.db, &slug)?;

    let post = match post {
        Some(p) if p.post.is_published => p,
        _ => return render_404(&state),
    };

    posts::increment_view_count(&state.db, post.post.id)?;

    let related = posts::related_posts(&state.db, post.post.category_id, post.post.id, 3)?;
    let docs = documents::list_for_post(&state.db, post.post.id)?;
    let category_list = categories::list_active(&state.db)?;

    let mut ctx = make_context(&state)?;
    ctx.insert("post", &post);
    ctx.insert("related_posts", &related);
    ctx.insert("documents", &docs);
    ctx.insert("categories", &category_list);

    let html = state.templates.render("public/post.html", &ctx)?;
    Ok(Html(html).into_response())
}

#[derive(Deserialize)]
pub struct ContactQuery {
    #[serde(default)]
    sent: bool,
}

pub async fn contact_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> AppResult<Html<String>> {
    let mut ctx = make_context(&state)?;
    ctx.insert("sent", &query.sent);
    ctx.insert("form", &ContactForm::default());

    let html = state.templates.render("public/contact.html", &ctx)?;
    Ok(Html(html))
}

pub async fn contact_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ContactForm>,
) -> AppResult<Response> {
    if let Err(e) = messages::validate_contact(&form) {
        let mut ctx = make_context(&state)?;
        ctx.insert("error", &e.to_string());
        ctx.insert("form", &form);
        let html = state.templates.render("public/contact.html", &ctx)?;
        return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
    }

    let message = match messages::create_message(&state.db, &form) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("Error saving contact message: {:?}", e);
            let mut ctx = make_context(&state)?;
            ctx.insert(
                "error",
                "Your message could not be sent. Please try again.",
            );
            ctx.insert("form", &form);
            let html = state.templates.render("public/contact.html", &ctx)?;
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response());
        }
    };

    // Notification mail must never block the request that stored the message.
    if let Err(e) = state.mailer.send_contact_notification(&message) {
        tracing::error!("Failed to send contact form email: {:?}", e);
    }

    Ok(Redirect::to("/contact?sent=true").into_response())
}

pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> AppResult<Response> {
    // Prevent path traversal attacks
    if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let image_dir = state.image_dir();
    let file_path = image_dir.join(&file_name);

    // Ensure the resolved path is still within the image directory
    let canonical_dir = image_dir.canonicalize().unwrap_or_default();
    let canonical_file = match file_path.canonicalize() {
        Ok(p) => p,
        Err(_) => return Ok(StatusCode::NOT_FOUND.into_response()),
    };

    if !canonical_file.starts_with(&canonical_dir) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let content = tokio::fs::read(&file_path).await?;
    let mime = mime_guess::from_path(&file_name).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.as_ref())], content).into_response())
}

/// Serve a stored attachment. The download counter moves before the bytes
/// do, so an interrupted transfer still counts.
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let document = match documents::get_document(&state.db, id)? {
        Some(d) => d,
        None => return render_404(&state),
    };

    // Attachments of unpublished posts stay private.
    let owner = posts::get_post_by_id(&state.db, document.post_id)?;
    if !owner.map(|p| p.post.is_published).unwrap_or(false) {
        return render_404(&state);
    }

    let file_path =
        match crate::services::uploads::resolve_public_path(&state.uploads_root, &document.file_path)
        {
            Some(p) => p,
            None => return render_404(&state),
        };

    if !file_path.exists() {
        return render_404(&state);
    }

    documents::increment_download_count(&state.db, id)?;

    let content = tokio::fs::read(&file_path).await?;
    let content_type = documents::content_type_for(&document.file_type);
    let download_name = document
        .display_name
        .clone()
        .unwrap_or_else(|| document.file_name.clone());

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name.replace('"', "")),
            ),
        ],
        content,
    )
        .into_response())
}

pub async fn site_css(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let css = state.templates.render("css/bundle.css", &Context::new())?;
    Ok(([(header::CONTENT_TYPE, "text/css")], css).into_response())
}

pub async fn admin_css(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let css = state.templates.render("css/bundle-admin.css", &Context::new())?;
    Ok(([(header::CONTENT_TYPE, "text/css")], css).into_response())
}
