use crate::models::{ContactForm, ContactMessage};
use crate::Database;
use anyhow::{bail, Result};

const MAX_NAME: usize = 100;
const MAX_EMAIL: usize = 100;
const MAX_PHONE: usize = 20;
const MAX_SUBJECT: usize = 200;
const MAX_MESSAGE: usize = 2000;

pub fn validate_contact(form: &ContactForm) -> Result<()> {
    if form.full_name.trim().is_empty() {
        bail!("Name is required");
    }
    if form.full_name.len() > MAX_NAME {
        bail!("Name must be {} characters or less", MAX_NAME);
    }
    if form.email.trim().is_empty() || !form.email.contains('@') || !form.email.contains('.') {
        bail!("A valid email address is required");
    }
    if form.email.len() > MAX_EMAIL {
        bail!("Email must be {} characters or less", MAX_EMAIL);
    }
    if let Some(phone) = form.phone.as_deref().filter(|p| !p.is_empty()) {
        if phone.len() > MAX_PHONE {
            bail!("Phone must be {} characters or less", MAX_PHONE);
        }
    }
    if let Some(subject) = &form.subject {
        if subject.len() > MAX_SUBJECT {
            bail!("Subject must be {} characters or less", MAX_SUBJECT);
        }
    }
    if form.message.trim().is_empty() {
        bail!("Message is required");
    }
    if form.message.len() > MAX_MESSAGE {
        bail!("Message must be {} characters or less", MAX_MESSAGE);
    }
    Ok(())
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        is_read: row.get(6)?,
        is_replied: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, full_name, email, phone, subject, message, is_read, is_replied, created_at";

pub fn create_message(db: &Database, form: &ContactForm) -> Result<ContactMessage> {
    validate_contact(form)?;

    let phone = form.phone.clone().filter(|p| !p.is_empty());
    let subject = form.subject.clone().filter(|s| !s.is_empty());

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO contact_messages (full_name, email, phone, subject, message) VALUES (?, ?, ?, ?, ?)",
        (&form.full_name, &form.email, &phone, &subject, &form.message),
    )?;

    let id = conn.last_insert_rowid();
    let message = conn.query_row(
        &format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = ?"),
        [id],
        row_to_message,
    )?;
    Ok(message)
}

pub fn list_messages(db: &Database) -> Result<Vec<ContactMessage>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM contact_messages ORDER BY created_at DESC"
    ))?;
    let messages = stmt
        .query_map([], row_to_message)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(messages)
}

pub fn get_message(db: &Database, id: i64) -> Result<Option<ContactMessage>> {
    let conn = db.get()?;
    let message = conn
        .query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = ?"),
            [id],
            row_to_message,
        )
        .ok();
    Ok(message)
}

pub fn mark_read(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "UPDATE contact_messages SET is_read = 1 WHERE id = ?",
        [id],
    )?;
    Ok(())
}

pub fn mark_replied(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "UPDATE contact_messages SET is_replied = 1, is_read = 1 WHERE id = ?",
        [id],
    )?;
    Ok(())
}

pub fn delete_message(db: &Database, id: i64) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM contact_messages WHERE id = ?", [id])?;
    Ok(())
}

pub fn count_unread(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
