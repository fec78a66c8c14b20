use crate::models::User;
use crate::Database;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 100;

fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        anyhow::bail!("Email cannot be empty");
    }
    if email.len() > MAX_EMAIL_LENGTH {
        anyhow::bail!("Email must be {} characters or less", MAX_EMAIL_LENGTH);
    }
    if !email.contains('@') || !email.contains('.') {
        anyhow::bail!("Invalid email format");
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<()> {
    if full_name.trim().is_empty() {
        anyhow::bail!("Name cannot be empty");
    }
    if full_name.len() > MAX_NAME_LENGTH {
        anyhow::bail!("Name must be {} characters or less", MAX_NAME_LENGTH);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        );
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        anyhow::bail!("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        anyhow::bail!("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        anyhow::bail!("Password must contain at least one number");
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$0000000000000000000000000000000000000000000";

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => {
            if let Ok(dummy) = PasswordHash::new(DUMMY_HASH) {
                let _ = Argon2::default().verify_password(password.as_bytes(), &dummy);
            }
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn create_user(db: &Database, email: &str, full_name: &str, password: &str) -> Result<i64> {
    validate_email(email)?;
    validate_full_name(full_name)?;
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO users (email, password_hash, full_name) VALUES (?, ?, ?)",
        (email, &password_hash, full_name),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_password(db: &Database, email: &str, password: &str) -> Result<()> {
    let password_hash = hash_password(password)?;
    let conn = db.get()?;
    conn.execute(
        "UPDATE users SET password_hash = ? WHERE email = ?",
        (&password_hash, email),
    )?;
    Ok(())
}

/// Password login by email. Inactive accounts never match; a missing account
/// still burns a hash comparison.
pub fn authenticate(db: &Database, email: &str, password: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user: Option<User> = conn
        .query_row(
            "SELECT id, email, password_hash, full_name, is_active, created_at FROM users WHERE email = ?",
            [email],
            row_to_user,
        )
        .ok();

    match user {
        Some(u) if u.is_active && verify_password(password, &u.password_hash) => Ok(Some(u)),
        Some(_) => Ok(None),
        None => {
            verify_password(password, "");
            Ok(None)
        }
    }
}

pub fn create_session(db: &Database, user_id: i64, duration_days: i64) -> Result<String> {
    let token = generate_session_token();
    let conn = db.get()?;
    conn.execute(
        "INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, datetime('now', ?||' days'))",
        (user_id, &token, duration_days),
    )?;
    Ok(token)
}

pub fn validate_session(db: &Database, token: &str) -> Result<Option<User>> {
    let conn = db.get()?;
    let user = conn
        .query_row(
            r#"
            SELECT u.id, u.email, u.password_hash, u.full_name, u.is_active, u.created_at
            FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.token = ? AND s.expires_at > datetime('now') AND u.is_active = 1
            "#,
            [token],
            row_to_user,
        )
        .ok();
    Ok(user)
}

pub fn delete_session(db: &Database, token: &str) -> Result<()> {
    let conn = db.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
    Ok(())
}

pub fn cleanup_expired_sessions(db: &Database) -> Result<()> {
    let conn = db.get()?;
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(())
}

pub fn has_users(db: &Database) -> Result<bool> {
    let conn = db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, email, password_hash, full_name, is_active, created_at FROM users ORDER BY created_at DESC",
    )?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn remove_user(db: &Database, email: &str) -> Result<bool> {
    let conn = db.get()?;
    let affected = conn.execute("DELETE FROM users WHERE email = ?", [email])?;
    Ok(affected > 0)
}
