use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];
const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".zip", ".rar",
];
const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Document,
}

impl AssetKind {
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Document => DOCUMENT_EXTENSIONS,
        }
    }

    pub fn max_bytes(self) -> u64 {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Document => MAX_DOCUMENT_BYTES,
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("file type '{extension}' is not allowed")]
    DisallowedExtension { extension: String },
    #[error("storage error: {0}")]
    Io(#[from] io::Error),
}

/// Lowercased extension of a client-supplied filename, with its leading dot.
/// Empty when the name has none.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Policy check only; no I/O. The extension comes verbatim from the client
/// name and is matched case-insensitively against the kind's allow-list.
pub fn validate(kind: AssetKind, original_name: &str, size: u64) -> Result<(), UploadError> {
    if size == 0 {
        return Err(UploadError::Empty);
    }
    let limit = kind.max_bytes();
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    let extension = file_extension(original_name);
    if !kind.allowed_extensions().contains(&extension.as_str()) {
        return Err(UploadError::DisallowedExtension { extension });
    }
    Ok(())
}

/// The narrow slice of a filesystem the upload manager needs. Everything
/// else (object stores, test doubles) can stand in behind it.
pub trait FileStore: Send + Sync {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    fn remove_if_exists(&self, path: &Path) -> io::Result<bool>;
    fn exists(&self, path: &Path) -> bool;
}

pub struct LocalStore;

impl FileStore for LocalStore {
    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(dir)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }

    fn remove_if_exists(&self, path: &Path) -> io::Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Opaque generated name, uuid + original extension.
    pub file_name: String,
    pub path: PathBuf,
}

pub struct UploadManager {
    store: Box<dyn FileStore>,
}

impl Default for UploadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadManager {
    pub fn new() -> Self {
        Self::with_store(Box::new(LocalStore))
    }

    pub fn with_store(store: Box<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Validate and persist an upload under `dir`. The stored name is a fresh
    /// uuid plus the original extension, so identical client names never
    /// collide and the client name never reaches the filesystem.
    pub fn save(
        &self,
        kind: AssetKind,
        dir: &Path,
        original_name: &str,
        data: &[u8],
    ) -> Result<StoredFile, UploadError> {
        validate(kind, original_name, data.len() as u64)?;

        self.store.ensure_dir(dir)?;

        let file_name = format!("{}{}", Uuid::new_v4(), file_extension(original_name));
        let path = dir.join(&file_name);
        self.store.write(&path, data)?;

        Ok(StoredFile { file_name, path })
    }

    /// Remove a stored file. Absence is success; returns whether a file was
    /// actually removed.
    pub fn delete(&self, path: &Path) -> io::Result<bool> {
        self.store.remove_if_exists(path)
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.store.exists(path)
    }
}

/// Map a public upload path ("/uploads/blog/x.jpg") back to its location
/// under the uploads root. Rejects anything that does not sit below
/// "/uploads/" or tries to climb out of it.
pub fn resolve_public_path(root: &Path, public_path: &str) -> Option<PathBuf> {
    let rest = public_path.strip_prefix("/uploads/")?;
    if rest.is_empty() || rest.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return None;
    }
    Some(root.join(rest))
}

/// Best-effort removal of a stored upload addressed by its public path.
/// Failures are logged and swallowed; record-level operations never abort
/// over a missing or stuck file.
pub fn delete_public_file(manager: &UploadManager, root: &Path, public_path: &str) {
    match resolve_public_path(root, public_path) {
        Some(path) => {
            if let Err(e) = manager.delete(&path) {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
        None => tracing::warn!("Refusing to remove suspicious path {}", public_path),
    }
}
