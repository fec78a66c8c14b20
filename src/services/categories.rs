use crate::models::{Category, CategoryInput};
use crate::services::slug::{generate_slug, validate_slug};
use crate::Database;
use anyhow::{bail, Result};

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        display_order: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, display_order, is_active, created_at";

pub fn create_category(db: &Database, input: CategoryInput) -> Result<i64> {
    let slug = generate_slug(&input.name);
    if !validate_slug(&slug) {
        bail!("Name does not produce a usable slug");
    }

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO categories (name, slug, description, display_order, is_active) VALUES (?, ?, ?, ?, ?)",
        (
            &input.name,
            &slug,
            &input.description,
            input.display_order,
            input.is_active,
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_category(db: &Database, id: i64, input: CategoryInput) -> Result<()> {
    let slug = generate_slug(&input.name);
    if !validate_slug(&slug) {
        bail!("Name does not produce a usable slug");
    }

    let conn = db.get()?;
    let affected = conn.execute(
        "UPDATE categories SET name = ?, slug = ?, description = ?, display_order = ?, is_active = ? WHERE id = ?",
        (
            &input.name,
            &slug,
            &input.description,
            input.display_order,
            input.is_active,
            id,
        ),
    )?;
    if affected == 0 {
        bail!("Category not found");
    }
    Ok(())
}

/// Posts in the category fall back to no category (FK is SET NULL).
pub fn delete_category(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
    Ok(())
}

pub fn get_category(db: &Database, id: i64) -> Result<Option<Category>> {
    let conn = db.get()?;
    let category = conn
        .query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"),
            [id],
            row_to_category,
        )
        .ok();
    Ok(category)
}

pub fn list_all(db: &Database) -> Result<Vec<Category>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY display_order, name"
    ))?;
    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn list_active(db: &Database) -> Result<Vec<Category>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active = 1 ORDER BY display_order, name"
    ))?;
    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn count_active(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE is_active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
