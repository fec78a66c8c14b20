use crate::models::{DocumentUpload, PostDocument};
use crate::services::uploads::{delete_public_file, file_extension, AssetKind, UploadManager};
use crate::Database;
use anyhow::Result;
use std::path::Path;

/// Download content type for a stored extension. Anything unknown falls back
/// to a generic binary type.
pub fn content_type_for(file_type: &str) -> &'static str {
    match file_type.to_lowercase().as_str() {
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".txt" => "text/plain",
        ".zip" => "application/zip",
        ".rar" => "application/x-rar-compressed",
        _ => "application/octet-stream",
    }
}

fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<PostDocument> {
    Ok(PostDocument {
        id: row.get(0)?,
        post_id: row.get(1)?,
        file_name: row.get(2)?,
        file_path: row.get(3)?,
        display_name: row.get(4)?,
        description: row.get(5)?,
        file_size: row.get(6)?,
        file_type: row.get(7)?,
        download_count: row.get(8)?,
        uploaded_at: row.get(9)?,
    })
}

const DOCUMENT_COLUMNS: &str = "id, post_id, file_name, file_path, display_name, description, file_size, file_type, download_count, uploaded_at";

/// Validate, store, and record a single attachment for a post. The stored
/// name is opaque; the client name survives only as the display name.
pub fn attach(
    db: &Database,
    uploads: &UploadManager,
    document_dir: &Path,
    post_id: i64,
    upload: &DocumentUpload,
) -> Result<PostDocument> {
    let stored = uploads.save(
        AssetKind::Document,
        document_dir,
        &upload.original_name,
        &upload.data,
    )?;

    let file_path = format!("/uploads/documents/{}", stored.file_name);
    let display_name = upload
        .display_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| upload.original_name.clone());
    let file_type = file_extension(&upload.original_name);

    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO post_documents (post_id, file_name, file_path, display_name, description, file_size, file_type)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        (
            post_id,
            &stored.file_name,
            &file_path,
            &display_name,
            &upload.description,
            upload.data.len() as i64,
            &file_type,
        ),
    )?;

    let id = conn.last_insert_rowid();
    let document = conn.query_row(
        &format!("SELECT {DOCUMENT_COLUMNS} FROM post_documents WHERE id = ?"),
        [id],
        row_to_document,
    )?;
    Ok(document)
}

/// Attach a batch in caller order. Each file validates and stores on its
/// own; a failure is reported in its slot and never rolls back the files
/// before it.
pub fn attach_many(
    db: &Database,
    uploads: &UploadManager,
    document_dir: &Path,
    post_id: i64,
    batch: &[DocumentUpload],
) -> Vec<Result<PostDocument>> {
    batch
        .iter()
        .map(|upload| {
            let result = attach(db, uploads, document_dir, post_id, upload);
            if let Err(e) = &result {
                tracing::error!("Error uploading document {}: {}", upload.original_name, e);
            }
            result
        })
        .collect()
}

pub fn list_for_post(db: &Database, post_id: i64) -> Result<Vec<PostDocument>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM post_documents WHERE post_id = ? ORDER BY display_name COLLATE NOCASE, uploaded_at DESC"
    ))?;
    let documents = stmt
        .query_map([post_id], row_to_document)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(documents)
}

pub fn get_document(db: &Database, id: i64) -> Result<Option<PostDocument>> {
    let conn = db.get()?;
    let document = conn
        .query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM post_documents WHERE id = ?"),
            [id],
            row_to_document,
        )
        .ok();
    Ok(document)
}

/// Remove an attachment: the physical file best-effort, then the row.
pub fn delete_document(
    db: &Database,
    uploads: &UploadManager,
    uploads_root: &Path,
    id: i64,
) -> Result<()> {
    let document = match get_document(db, id)? {
        Some(d) => d,
        None => return Ok(()),
    };

    delete_public_file(uploads, uploads_root, &document.file_path);

    let conn = db.get()?;
    conn.execute("DELETE FROM post_documents WHERE id = ?", [id])?;
    Ok(())
}

/// Counted before the bytes go out; a serve that dies mid-transfer still
/// counts.
pub fn increment_download_count(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "UPDATE post_documents SET download_count = download_count + 1 WHERE id = ?",
        [id],
    )?;
    Ok(())
}
