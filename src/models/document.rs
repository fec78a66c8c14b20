use serde::Serialize;

/// A binary attachment owned by exactly one post; the row is cascade-deleted
/// with it.
#[derive(Debug, Clone, Serialize)]
pub struct PostDocument {
    pub id: i64,
    pub post_id: i64,
    /// Opaque stored name, uuid + original extension.
    pub file_name: String,
    /// Public path the file is served from.
    pub file_path: String,
    /// Client-supplied name, display only — never used for storage addressing.
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub file_size: i64,
    /// Lowercased extension with leading dot, e.g. ".pdf".
    pub file_type: String,
    pub download_count: i64,
    pub uploaded_at: String,
}

/// Candidate attachment as received from the admin form.
#[derive(Debug)]
pub struct DocumentUpload {
    pub original_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub data: Vec<u8>,
}
