use crate::models::{CategoryInput, CreatePost, DocumentUpload, UpdatePost, User};
use crate::services::uploads::AssetKind;
use crate::services::{categories, documents, messages, posts, settings, uploads};
use crate::web::error::AppResult;
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tera::Context;

fn make_admin_context(state: &AppState, user: &User) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &state.config.site);
    ctx.insert("user", user);
    ctx.insert("version", env!("CARGO_PKG_VERSION"));
    ctx
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let total_posts = posts::count_all(&state.db)?;
    let published_posts = posts::count_published(&state.db, None)?;
    let active_categories = categories::count_active(&state.db)?;
    let unread_messages = messages::count_unread(&state.db)?;
    let total_views = posts::total_views(&state.db)?;

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("total_posts", &total_posts);
    ctx.insert("published_posts", &published_posts);
    ctx.insert("active_categories", &active_categories);
    ctx.insert("unread_messages", &unread_messages);
    ctx.insert("total_views", &total_views);

    let html = state.templates.render("admin/dashboard.html", &ctx)?;
    Ok(Html(html))
}

// Posts

pub async fn posts_index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let post_list = posts::list_all(&state.db)?;

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("posts", &post_list);

    let html = state.templates.render("admin/posts/index.html", &ctx)?;
    Ok(Html(html))
}

struct FilePart {
    name: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct PostForm {
    title: String,
    summary: String,
    body_markdown: String,
    category_id: Option<i64>,
    is_published: bool,
    meta_title: String,
    meta_description: String,
    meta_keywords: String,
    featured_image: Option<FilePart>,
    documents: Vec<DocumentUpload>,
}

/// Submitted values echoed back into the form template when a save fails.
#[derive(Serialize, Default)]
struct PostFormValues {
    title: String,
    summary: String,
    body_markdown: String,
    category_id: Option<i64>,
    is_published: bool,
    meta_title: String,
    meta_description: String,
    meta_keywords: String,
}

impl PostFormValues {
    fn from_form(form: &PostForm) -> Self {
        Self {
            title: form.title.clone(),
            summary: form.summary.clone(),
            body_markdown: form.body_markdown.clone(),
            category_id: form.category_id,
            is_published: form.is_published,
            meta_title: form.meta_title.clone(),
            meta_description: form.meta_description.clone(),
            meta_keywords: form.meta_keywords.clone(),
        }
    }
}

fn none_if_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn checkbox(value: &str) -> bool {
    matches!(value, "on" | "true" | "1")
}

async fn read_post_form(mut multipart: Multipart) -> anyhow::Result<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "summary" => form.summary = field.text().await?,
            "body_markdown" => form.body_markdown = field.text().await?,
            "category_id" => form.category_id = field.text().await?.parse().ok(),
            "is_published" => form.is_published = checkbox(&field.text().await?),
            "meta_title" => form.meta_title = field.text().await?,
            "meta_description" => form.meta_description = field.text().await?,
            "meta_keywords" => form.meta_keywords = field.text().await?,
            "featured_image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                if !file_name.is_empty() && !data.is_empty() {
                    form.featured_image = Some(FilePart {
                        name: file_name,
                        data: data.to_vec(),
                    });
                }
            }
            "documents" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                if !file_name.is_empty() && !data.is_empty() {
                    form.documents.push(DocumentUpload {
                        original_name: file_name,
                        display_name: None,
                        description: None,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn render_post_form(
    state: &AppState,
    user: &User,
    post_id: Option<i64>,
    values: Option<&PostFormValues>,
    error: Option<&str>,
) -> AppResult<Response> {
    let category_list = categories::list_active(&state.db)?;
    let empty = PostFormValues::default();
    let values = values.unwrap_or(&empty);

    let mut ctx = make_admin_context(state, user);
    ctx.insert("categories", &category_list);
    ctx.insert("is_new", &post_id.is_none());
    ctx.insert("post_id", &post_id);
    ctx.insert("form", values);
    ctx.insert("selected_category", &values.category_id.unwrap_or(0));
    if let Some(id) = post_id {
        let docs = documents::list_for_post(&state.db, id)?;
        ctx.insert("documents", &docs);
        if let Some(post) = posts::get_post_by_id(&state.db, id)? {
            ctx.insert("current_image", &post.post.featured_image);
        }
    }
    if let Some(error) = error {
        ctx.insert("error", error);
    }

    let html = state.templates.render("admin/posts/form.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn new_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Response> {
    render_post_form(&state, &user, None, None, None)
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = read_post_form(multipart).await?;
    let values = PostFormValues::from_form(&form);

    let mut featured_image = None;
    if let Some(file) = &form.featured_image {
        match state
            .uploads
            .save(AssetKind::Image, &state.image_dir(), &file.name, &file.data)
        {
            Ok(stored) => featured_image = Some(format!("/uploads/blog/{}", stored.file_name)),
            Err(e) => {
                return render_post_form(&state, &user, None, Some(&values), Some(&e.to_string()))
            }
        }
    }

    let input = CreatePost {
        title: form.title.clone(),
        summary: none_if_empty(&form.summary),
        body_markdown: form.body_markdown.clone(),
        category_id: form.category_id,
        featured_image,
        is_published: form.is_published,
        meta_title: none_if_empty(&form.meta_title),
        meta_description: none_if_empty(&form.meta_description),
        meta_keywords: none_if_empty(&form.meta_keywords),
    };

    let post_id = match posts::create_post(&state.db, input) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Error creating post: {:?}", e);
            return render_post_form(
                &state,
                &user,
                None,
                Some(&values),
                Some("The post could not be saved. A post with the same title may already exist."),
            );
        }
    };

    // Failures are already logged per file; the created post stands either way.
    documents::attach_many(
        &state.db,
        &state.uploads,
        &state.document_dir(),
        post_id,
        &form.documents,
    );

    Ok(Redirect::to("/admin/posts").into_response())
}

#[derive(Deserialize)]
pub struct EditQuery {
    doc: Option<String>,
}

pub async fn edit_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<EditQuery>,
) -> AppResult<Response> {
    let post = match posts::get_post_by_id(&state.db, id)? {
        Some(p) => p,
        None => return Ok(StatusCode::NOT_FOUND.into_response()),
    };

    let docs = documents::list_for_post(&state.db, id)?;
    let category_list = categories::list_active(&state.db)?;

    let values = PostFormValues {
        title: post.post.title.clone(),
        summary: post.post.summary.clone().unwrap_or_default(),
        body_markdown: post.post.body_markdown.clone(),
        category_id: post.post.category_id,
        is_published: post.post.is_published,
        meta_title: post.post.meta_title.clone().unwrap_or_default(),
        meta_description: post.post.meta_description.clone().unwrap_or_default(),
        meta_keywords: post.post.meta_keywords.clone().unwrap_or_default(),
    };

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("categories", &category_list);
    ctx.insert("is_new", &false);
    ctx.insert("post_id", &id);
    ctx.insert("form", &values);
    ctx.insert("selected_category", &values.category_id.unwrap_or(0));
    ctx.insert("current_image", &post.post.featured_image);
    ctx.insert("documents", &docs);
    if let Some(doc) = &query.doc {
        ctx.insert("doc_status", doc);
    }

    let html = state.templates.render("admin/posts/form.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Response> {
    let current = match posts::get_post_by_id(&state.db, id)? {
        Some(p) => p,
        None => return Ok(StatusCode::NOT_FOUND.into_response()),
    };

    let form = read_post_form(multipart).await?;
    let values = PostFormValues::from_form(&form);

    // A fresh image supersedes the old file before the new path is recorded.
    let mut featured_image = None;
    if let Some(file) = &form.featured_image {
        if let Some(old) = current
            .post
            .featured_image
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            uploads::delete_public_file(&state.uploads, &state.uploads_root, old);
        }

        match state
            .uploads
            .save(AssetKind::Image, &state.image_dir(), &file.name, &file.data)
        {
            Ok(stored) => featured_image = Some(format!("/uploads/blog/{}", stored.file_name)),
            Err(e) => {
                return render_post_form(
                    &state,
                    &user,
                    Some(id),
                    Some(&values),
                    Some(&e.to_string()),
                )
            }
        }
    }

    let input = UpdatePost {
        title: form.title.clone(),
        summary: none_if_empty(&form.summary),
        body_markdown: form.body_markdown.clone(),
        category_id: form.category_id,
        featured_image,
        is_published: form.is_published,
        meta_title: none_if_empty(&form.meta_title),
        meta_description: none_if_empty(&form.meta_description),
        meta_keywords: none_if_empty(&form.meta_keywords),
    };

    if let Err(e) = posts::update_post(&state.db, id, input) {
        tracing::error!("Error updating post: {:?}", e);
        return render_post_form(
            &state,
            &user,
            Some(id),
            Some(&values),
            Some("The post could not be saved. A post with the same title may already exist."),
        );
    }

    Ok(Redirect::to("/admin/posts").into_response())
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if let Err(e) = posts::delete_post(&state.db, &state.uploads, &state.uploads_root, id) {
        tracing::error!("Error deleting post {}: {:?}", id, e);
    }
    Ok(Redirect::to("/admin/posts").into_response())
}

// Documents

async fn read_document_form(
    mut multipart: Multipart,
) -> anyhow::Result<(Option<FilePart>, Option<String>, Option<String>)> {
    let mut file = None;
    let mut display_name = None;
    let mut description = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "document" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                if !file_name.is_empty() && !data.is_empty() {
                    file = Some(FilePart {
                        name: file_name,
                        data: data.to_vec(),
                    });
                }
            }
            "display_name" => display_name = none_if_empty(&field.text().await?),
            "description" => description = none_if_empty(&field.text().await?),
            _ => {}
        }
    }

    Ok((file, display_name, description))
}

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Response> {
    if posts::get_post_by_id(&state.db, id)?.is_none() {
        return Ok(Redirect::to("/admin/posts").into_response());
    }

    let (file, display_name, description) = read_document_form(multipart).await?;

    let file = match file {
        Some(f) => f,
        None => return Ok(Redirect::to(&format!("/admin/posts/{}/edit?doc=invalid", id)).into_response()),
    };

    if uploads::validate(AssetKind::Document, &file.name, file.data.len() as u64).is_err() {
        return Ok(Redirect::to(&format!("/admin/posts/{}/edit?doc=invalid", id)).into_response());
    }

    let upload = DocumentUpload {
        original_name: file.name,
        display_name,
        description,
        data: file.data,
    };

    match documents::attach(&state.db, &state.uploads, &state.document_dir(), id, &upload) {
        Ok(_) => Ok(Redirect::to(&format!("/admin/posts/{}/edit?doc=ok", id)).into_response()),
        Err(e) => {
            tracing::error!("Error uploading document: {:?}", e);
            Ok(Redirect::to(&format!("/admin/posts/{}/edit?doc=failed", id)).into_response())
        }
    }
}

#[derive(Deserialize)]
pub struct DeleteDocumentForm {
    post_id: i64,
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<DeleteDocumentForm>,
) -> AppResult<Response> {
    if let Err(e) = documents::delete_document(&state.db, &state.uploads, &state.uploads_root, id)
    {
        tracing::error!("Error deleting document {}: {:?}", id, e);
    }
    Ok(Redirect::to(&format!("/admin/posts/{}/edit", form.post_id)).into_response())
}

// Categories

pub async fn categories_index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let category_list = categories::list_all(&state.db)?;

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("categories", &category_list);

    let html = state.templates.render("admin/categories/index.html", &ctx)?;
    Ok(Html(html))
}

#[derive(Deserialize)]
pub struct CategoryForm {
    name: String,
    description: Option<String>,
    display_order: Option<i64>,
    is_active: Option<String>,
}

impl CategoryForm {
    fn into_input(self) -> CategoryInput {
        CategoryInput {
            name: self.name,
            description: self.description.filter(|s| !s.is_empty()),
            display_order: self.display_order.unwrap_or(0),
            is_active: self.is_active.as_deref().map(checkbox).unwrap_or(false),
        }
    }
}

/// Category fields echoed into the form template; new categories start
/// active.
#[derive(Serialize)]
struct CategoryFormValues {
    id: i64,
    name: String,
    description: String,
    display_order: i64,
    is_active: bool,
}

impl CategoryFormValues {
    fn from_category(category: Option<&crate::models::Category>) -> Self {
        match category {
            Some(c) => Self {
                id: c.id,
                name: c.name.clone(),
                description: c.description.clone().unwrap_or_default(),
                display_order: c.display_order,
                is_active: c.is_active,
            },
            None => Self {
                id: 0,
                name: String::new(),
                description: String::new(),
                display_order: 0,
                is_active: true,
            },
        }
    }
}

fn render_category_form(
    state: &AppState,
    user: &User,
    category: Option<&crate::models::Category>,
    error: Option<&str>,
) -> AppResult<Response> {
    let mut ctx = make_admin_context(state, user);
    ctx.insert("is_new", &category.is_none());
    ctx.insert("category", &CategoryFormValues::from_category(category));
    if let Some(error) = error {
        ctx.insert("error", error);
    }

    let html = state.templates.render("admin/categories/form.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn new_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Response> {
    render_category_form(&state, &user, None, None)
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    match categories::create_category(&state.db, form.into_input()) {
        Ok(_) => Ok(Redirect::to("/admin/categories").into_response()),
        Err(e) => {
            tracing::error!("Error creating category: {:?}", e);
            render_category_form(
                &state,
                &user,
                None,
                Some("The category could not be saved. A category with the same name may already exist."),
            )
        }
    }
}

pub async fn edit_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    match categories::get_category(&state.db, id)? {
        Some(category) => render_category_form(&state, &user, Some(&category), None),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> AppResult<Response> {
    match categories::update_category(&state.db, id, form.into_input()) {
        Ok(()) => Ok(Redirect::to("/admin/categories").into_response()),
        Err(e) => {
            tracing::error!("Error updating category {}: {:?}", id, e);
            let category = categories::get_category(&state.db, id)?;
            render_category_form(
                &state,
                &user,
                category.as_ref(),
                Some("The category could not be saved."),
            )
        }
    }
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    if let Err(e) = categories::delete_category(&state.db, id) {
        tracing::error!("Error deleting category {}: {:?}", id, e);
    }
    Ok(Redirect::to("/admin/categories").into_response())
}

// Messages

pub async fn messages_index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let message_list = messages::list_messages(&state.db)?;

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("messages", &message_list);

    let html = state.templates.render("admin/messages/index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn message_detail(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let message = match messages::get_message(&state.db, id)? {
        Some(m) => m,
        None => return Ok(StatusCode::NOT_FOUND.into_response()),
    };

    if !message.is_read {
        messages::mark_read(&state.db, id)?;
    }

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("message", &message);

    let html = state.templates.render("admin/messages/detail.html", &ctx)?;
    Ok(Html(html).into_response())
}

pub async fn mark_message_replied(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    messages::mark_replied(&state.db, id)?;
    Ok(Redirect::to("/admin/messages").into_response())
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    messages::delete_message(&state.db, id)?;
    Ok(Redirect::to("/admin/messages").into_response())
}

// Settings

pub async fn settings_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Html<String>> {
    let setting_list = settings::list_settings(&state.db)?;

    let mut ctx = make_admin_context(&state, &user);
    ctx.insert("settings", &setting_list);

    let html = state.templates.render("admin/settings.html", &ctx)?;
    Ok(Html(html))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    for (key, value) in &form {
        settings::set_setting(&state.db, key, value)?;
    }
    Ok(Redirect::to("/admin/settings").into_response())
}
