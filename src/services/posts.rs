use crate::models::{CreatePost, PostWithCategory, UpdatePost};
use crate::services::markdown::MarkdownRenderer;
use crate::services::slug::{generate_slug, validate_slug};
use crate::services::uploads::{delete_public_file, UploadManager};
use crate::services::documents;
use crate::Database;
use anyhow::{bail, Result};
use std::path::Path;

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.summary, p.body_markdown, p.body_html, \
     p.category_id, p.featured_image, p.view_count, p.is_published, p.published_at, \
     p.meta_title, p.meta_description, p.meta_keywords, p.created_at, p.updated_at, \
     c.name, c.slug";

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<PostWithCategory> {
    Ok(PostWithCategory {
        post: crate::models::Post {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            summary: row.get(3)?,
            body_markdown: row.get(4)?,
            body_html: row.get(5)?,
            category_id: row.get(6)?,
            featured_image: row.get(7)?,
            view_count: row.get(8)?,
            is_published: row.get(9)?,
            published_at: row.get(10)?,
            meta_title: row.get(11)?,
            meta_description: row.get(12)?,
            meta_keywords: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        },
        category_name: row.get(16)?,
        category_slug: row.get(17)?,
    })
}

/// Create a post. The slug is always derived from the title; a second title
/// normalizing to an existing slug fails on the unique column constraint and
/// surfaces as an error here.
pub fn create_post(db: &Database, input: CreatePost) -> Result<i64> {
    let slug = generate_slug(&input.title);
    if !validate_slug(&slug) {
        bail!("Title does not produce a usable slug");
    }

    let renderer = MarkdownRenderer::new();
    let body_html = renderer.render(&input.body_markdown);

    let published_at = if input.is_published {
        Some(chrono::Utc::now().to_rfc3339())
    } else {
        None
    };

    let meta_title = input
        .meta_title
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| input.title.clone());
    let meta_description = input
        .meta_description
        .filter(|s| !s.is_empty())
        .or_else(|| input.summary.clone());

    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO posts (title, slug, summary, body_markdown, body_html, category_id, featured_image, is_published, published_at, meta_title, meta_description, meta_keywords)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        (
            &input.title,
            &slug,
            &input.summary,
            &input.body_markdown,
            &body_html,
            input.category_id,
            &input.featured_image,
            input.is_published,
            &published_at,
            &meta_title,
            &meta_description,
            &input.meta_keywords,
        ),
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!("Post created: {} ({})", input.title, slug);
    Ok(id)
}

pub fn update_post(db: &Database, id: i64, input: UpdatePost) -> Result<()> {
    let current = match get_post_by_id(db, id)? {
        Some(p) => p.post,
        None => bail!("Post not found"),
    };

    let slug = generate_slug(&input.title);
    if !validate_slug(&slug) {
        bail!("Title does not produce a usable slug");
    }

    let renderer = MarkdownRenderer::new();
    let body_html = renderer.render(&input.body_markdown);

    // First publish stamps the timestamp; unpublishing clears it.
    let published_at = if !input.is_published {
        None
    } else if current.published_at.is_none() {
        Some(chrono::Utc::now().to_rfc3339())
    } else {
        current.published_at
    };

    let featured_image = input.featured_image.or(current.featured_image);

    let meta_title = input
        .meta_title
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| input.title.clone());
    let meta_description = input
        .meta_description
        .filter(|s| !s.is_empty())
        .or_else(|| input.summary.clone());

    let conn = db.get()?;
    conn.execute(
        r#"
        UPDATE posts SET title = ?, slug = ?, summary = ?, body_markdown = ?, body_html = ?, category_id = ?, featured_image = ?, is_published = ?, published_at = ?, meta_title = ?, meta_description = ?, meta_keywords = ?, updated_at = ?
        WHERE id = ?
        "#,
        rusqlite::params![
            &input.title,
            &slug,
            &input.summary,
            &input.body_markdown,
            &body_html,
            input.category_id,
            &featured_image,
            input.is_published,
            &published_at,
            &meta_title,
            &meta_description,
            &input.meta_keywords,
            chrono::Utc::now().to_rfc3339(),
            id,
        ],
    )?;

    tracing::info!("Post updated: {} ({})", input.title, slug);
    Ok(())
}

/// Delete a post together with its physical assets. File removal is
/// best-effort per file; the row delete cascades to the attachment rows.
pub fn delete_post(
    db: &Database,
    uploads: &UploadManager,
    uploads_root: &Path,
    id: i64,
) -> Result<()> {
    let post = match get_post_by_id(db, id)? {
        Some(p) => p.post,
        None => return Ok(()),
    };

    if let Some(image) = post.featured_image.as_deref().filter(|p| !p.is_empty()) {
        delete_public_file(uploads, uploads_root, image);
    }

    for doc in documents::list_for_post(db, id)? {
        delete_public_file(uploads, uploads_root, &doc.file_path);
    }

    let conn = db.get()?;
    conn.execute("DELETE FROM posts WHERE id = ?", [id])?;
    tracing::info!("Post deleted: {}", id);
    Ok(())
}

pub fn get_post_by_id(db: &Database, id: i64) -> Result<Option<PostWithCategory>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN categories c ON c.id = p.category_id WHERE p.id = ?"
    );
    let post = conn.query_row(&sql, [id], row_to_post).ok();
    Ok(post)
}

pub fn get_post_by_slug(db: &Database, slug: &str) -> Result<Option<PostWithCategory>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN categories c ON c.id = p.category_id WHERE p.slug = ?"
    );
    let post = conn.query_row(&sql, [slug], row_to_post).ok();
    Ok(post)
}

/// Every post, newest first, for the back-office listing.
pub fn list_all(db: &Database) -> Result<Vec<PostWithCategory>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN categories c ON c.id = p.category_id ORDER BY p.created_at DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map([], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn list_published(
    db: &Database,
    category_id: Option<i64>,
    limit: usize,
    offset: usize,
) -> Result<Vec<PostWithCategory>> {
    let conn = db.get()?;
    let mut sql = format!(
        "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN categories c ON c.id = p.category_id WHERE p.is_published = 1"
    );
    if category_id.is_some() {
        sql.push_str(" AND p.category_id = ?");
    }
    sql.push_str(" ORDER BY p.published_at DESC LIMIT ? OFFSET ?");

    let mut stmt = conn.prepare(&sql)?;
    let posts = match category_id {
        Some(cid) => stmt
            .query_map(rusqlite::params![cid, limit, offset], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(rusqlite::params![limit, offset], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(posts)
}

pub fn count_published(db: &Database, category_id: Option<i64>) -> Result<i64> {
    let conn = db.get()?;
    let count = match category_id {
        Some(cid) => conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE is_published = 1 AND category_id = ?",
            [cid],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE is_published = 1",
            [],
            |row| row.get(0),
        )?,
    };
    Ok(count)
}

pub fn count_all(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count)
}

pub fn total_views(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let total = conn.query_row(
        "SELECT COALESCE(SUM(view_count), 0) FROM posts",
        [],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Published posts from the same category, newest first, excluding the post
/// itself.
pub fn related_posts(
    db: &Database,
    category_id: Option<i64>,
    exclude_id: i64,
    limit: usize,
) -> Result<Vec<PostWithCategory>> {
    let conn = db.get()?;
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts p LEFT JOIN categories c ON c.id = p.category_id \
         WHERE p.is_published = 1 AND p.id != ? AND p.category_id IS ? \
         ORDER BY p.published_at DESC LIMIT ?"
    );
    let mut stmt = conn.prepare(&sql)?;
    let posts = stmt
        .query_map(rusqlite::params![exclude_id, category_id, limit], row_to_post)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(posts)
}

pub fn increment_view_count(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "UPDATE posts SET view_count = view_count + 1 WHERE id = ?",
        [id],
    )?;
    Ok(())
}
