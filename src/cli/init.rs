use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "Attorney at Law".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;
    std::fs::create_dir_all(path.join("data/uploads/blog"))?;
    std::fs::create_dir_all(path.join("data/uploads/documents"))?;

    let config = format!(
        r#"[site]
title = "{}"
description = "Professional legal counsel"
url = "http://localhost:3000"
language = "en"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/counsel.db"

[content]
posts_per_page = 10
recent_posts = 3

[uploads]
dir = "./data/uploads"

[auth]
session_days = 7

[mail]
smtp_host = ""
smtp_port = 587
username = ""
password = ""
sender_name = "{}"
sender_email = ""
notify_to = ""
"#,
        site_name, site_name
    );

    std::fs::write(path.join("counsel.toml"), config)?;

    tracing::info!("Created new site at {:?}", path);
    tracing::info!("Run 'counsel migrate' to set up the database");
    tracing::info!("Run 'counsel serve' to start the server");

    Ok(())
}
