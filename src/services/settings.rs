use crate::Database;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct SiteSetting {
    pub id: i64,
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub description: Option<String>,
}

pub fn get_setting(db: &Database, key: &str) -> Result<Option<String>> {
    let conn = db.get()?;
    let value = conn
        .query_row(
            "SELECT setting_value FROM site_settings WHERE setting_key = ?",
            [key],
            |row| row.get::<_, Option<String>>(0),
        )
        .ok()
        .flatten();
    Ok(value)
}

/// Upsert keyed on setting_key; unknown keys are created without a
/// description.
pub fn set_setting(db: &Database, key: &str, value: &str) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        r#"
        INSERT INTO site_settings (setting_key, setting_value) VALUES (?, ?)
        ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value
        "#,
        (key, value),
    )?;
    Ok(())
}

pub fn list_settings(db: &Database) -> Result<Vec<SiteSetting>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, setting_key, setting_value, description FROM site_settings ORDER BY setting_key",
    )?;
    let settings = stmt
        .query_map([], |row| {
            Ok(SiteSetting {
                id: row.get(0)?,
                setting_key: row.get(1)?,
                setting_value: row.get(2)?,
                description: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(settings)
}

/// Key/value view of every setting, for handing to templates.
pub fn settings_map(db: &Database) -> Result<HashMap<String, String>> {
    let map = list_settings(db)?
        .into_iter()
        .map(|s| (s.setting_key, s.setting_value.unwrap_or_default()))
        .collect();
    Ok(map)
}
