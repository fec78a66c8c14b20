use crate::services::mailer::Mailer;
use crate::services::uploads::UploadManager;
use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub templates: Tera,
    pub uploads: UploadManager,
    pub uploads_root: PathBuf,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let mut templates = Tera::default();

        templates.register_filter("format_date", format_date_filter);
        templates.register_filter("format_size", format_size_filter);
        templates.add_raw_templates(vec![
            ("css/bundle.css", include_str!("../../templates/css/bundle.css")),
            ("css/bundle-admin.css", include_str!("../../templates/css/bundle-admin.css")),
            ("base.html", include_str!("../../templates/base.html")),
            ("public/index.html", include_str!("../../templates/public/index.html")),
            ("public/about.html", include_str!("../../templates/public/about.html")),
            ("public/privacy.html", include_str!("../../templates/public/privacy.html")),
            ("public/blog.html", include_str!("../../templates/public/blog.html")),
            ("public/post.html", include_str!("../../templates/public/post.html")),
            ("public/contact.html", include_str!("../../templates/public/contact.html")),
            ("public/404.html", include_str!("../../templates/public/404.html")),
            ("admin/base.html", include_str!("../../templates/admin/base.html")),
            ("admin/login.html", include_str!("../../templates/admin/login.html")),
            ("admin/setup.html", include_str!("../../templates/admin/setup.html")),
            ("admin/dashboard.html", include_str!("../../templates/admin/dashboard.html")),
            ("admin/posts/index.html", include_str!("../../templates/admin/posts/index.html")),
            ("admin/posts/form.html", include_str!("../../templates/admin/posts/form.html")),
            ("admin/categories/index.html", include_str!("../../templates/admin/categories/index.html")),
            ("admin/categories/form.html", include_str!("../../templates/admin/categories/form.html")),
            ("admin/messages/index.html", include_str!("../../templates/admin/messages/index.html")),
            ("admin/messages/detail.html", include_str!("../../templates/admin/messages/detail.html")),
            ("admin/settings.html", include_str!("../../templates/admin/settings.html")),
        ])?;

        let uploads_root = PathBuf::from(&config.uploads.dir);
        let mailer = Mailer::new(config.mail.clone());

        Ok(Self {
            config,
            db,
            templates,
            uploads: UploadManager::new(),
            uploads_root,
            mailer,
        })
    }

    /// Featured images live here, served from /uploads/blog/.
    pub fn image_dir(&self) -> PathBuf {
        self.uploads_root.join("blog")
    }

    /// Post attachments live here, served through the download endpoint.
    pub fn document_dir(&self) -> PathBuf {
        self.uploads_root.join("documents")
    }
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%B %d, %Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}

fn format_size_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let bytes = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg("format_size requires a number"))?;

    let units = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < units.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    Ok(Value::String(format!("{:.1} {}", size, units[unit])))
}
