use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

// Enough for one featured image plus a handful of attachments per submit.
const POST_FORM_BODY_LIMIT: usize = 64 * 1024 * 1024;
const DOCUMENT_BODY_LIMIT: usize = 12 * 1024 * 1024;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::public::index))
        .route("/about", get(handlers::public::about))
        .route("/privacy", get(handlers::public::privacy))
        .route("/blog", get(handlers::public::blog_index))
        .route("/blog/:slug", get(handlers::public::blog_post))
        .route("/contact", get(handlers::public::contact_form))
        .route("/contact", post(handlers::public::contact_submit))
        .route("/uploads/blog/:file_name", get(handlers::public::serve_image))
        .route(
            "/documents/:id/download",
            get(handlers::public::download_document),
        )
        .route("/static/style.css", get(handlers::public::site_css))
        .route("/static/admin.css", get(handlers::public::admin_css))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/login", get(handlers::auth::login_form))
        .route("/admin/login", post(handlers::auth::login))
        .route("/admin/logout", post(handlers::auth::logout))
        .route("/admin/setup", get(handlers::auth::setup_form))
        .route("/admin/setup", post(handlers::auth::setup))
        .route("/admin", get(handlers::admin::dashboard))
        .route("/admin/posts", get(handlers::admin::posts_index))
        .route("/admin/posts/new", get(handlers::admin::new_post))
        .route(
            "/admin/posts",
            post(handlers::admin::create_post)
                .layer(DefaultBodyLimit::max(POST_FORM_BODY_LIMIT)),
        )
        .route("/admin/posts/:id/edit", get(handlers::admin::edit_post))
        .route(
            "/admin/posts/:id",
            post(handlers::admin::update_post)
                .layer(DefaultBodyLimit::max(POST_FORM_BODY_LIMIT)),
        )
        .route(
            "/admin/posts/:id/delete",
            post(handlers::admin::delete_post),
        )
        .route(
            "/admin/posts/:id/documents",
            post(handlers::admin::upload_document)
                .layer(DefaultBodyLimit::max(DOCUMENT_BODY_LIMIT)),
        )
        .route(
            "/admin/documents/:id/delete",
            post(handlers::admin::delete_document),
        )
        .route("/admin/categories", get(handlers::admin::categories_index))
        .route(
            "/admin/categories/new",
            get(handlers::admin::new_category),
        )
        .route("/admin/categories", post(handlers::admin::create_category))
        .route(
            "/admin/categories/:id/edit",
            get(handlers::admin::edit_category),
        )
        .route(
            "/admin/categories/:id",
            post(handlers::admin::update_category),
        )
        .route(
            "/admin/categories/:id/delete",
            post(handlers::admin::delete_category),
        )
        .route("/admin/messages", get(handlers::admin::messages_index))
        .route("/admin/messages/:id", get(handlers::admin::message_detail))
        .route(
            "/admin/messages/:id/replied",
            post(handlers::admin::mark_message_replied),
        )
        .route(
            "/admin/messages/:id/delete",
            post(handlers::admin::delete_message),
        )
        .route("/admin/settings", get(handlers::admin::settings_page))
        .route("/admin/settings", post(handlers::admin::update_settings))
}
