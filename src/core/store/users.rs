use anyhow::Result;
use hmac::{Hmac, Mac};
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};

use super::types::UserRecord;
use super::{Database, ValidationError};

type HmacSha256 = Hmac<Sha256>;

const USER_SELECT: &str = "SELECT u.id, u.username, u.email, u.is_staff, e.id
     FROM users u LEFT JOIN employees e ON e.user_id = u.id";

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_raw_token() -> String {
    let bytes: [u8; 20] = rand::random();
    format!("itk_{}", hex::encode(bytes))
}

fn password_mac(salt: &[u8], password: &str) -> HmacSha256 {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(salt).expect("HMAC can take key of any size");
    mac.update(password.as_bytes());
    mac
}

fn hash_password(password: &str) -> (String, String) {
    let salt: [u8; 16] = rand::random();
    let digest = password_mac(&salt, password).finalize().into_bytes();
    (hex::encode(salt), hex::encode(digest))
}

fn verify_password(password: &str, salt_hex: &str, hash_hex: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    password_mac(&salt, password).verify_slice(&expected).is_ok()
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    let is_staff = row.get::<_, i64>(3)? != 0;
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        is_staff,
        employee_id: if is_staff { None } else { row.get(4)? },
    })
}

fn fetch_user(db: &Connection, id: i64) -> rusqlite::Result<Option<UserRecord>> {
    db.query_row(&format!("{USER_SELECT} WHERE u.id = ?1"), params![id], user_row)
        .optional()
}

impl Database {
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        is_staff: bool,
    ) -> Result<UserRecord> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::new("username and password are required").into());
        }
        let (salt, hash) = hash_password(password);

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO users (username, email, password_salt, password_hash, is_staff)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![username, email.trim(), salt, hash, is_staff as i64],
        )?;
        let id = db.last_insert_rowid();
        fetch_user(&db, id)?.ok_or_else(|| anyhow::anyhow!("user {id} disappeared after insert"))
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let db = self.db.lock().await;
        Ok(fetch_user(&db, id)?)
    }

    /// Check a username/password pair. `None` for unknown users and wrong
    /// passwords alike.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRecord>> {
        let db = self.db.lock().await;
        let stored = db
            .query_row(
                "SELECT id, password_salt, password_hash FROM users WHERE username = ?1",
                params![username.trim()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match stored {
            Some((id, salt, hash)) if verify_password(password, &salt, &hash) => {
                Ok(fetch_user(&db, id)?)
            }
            _ => Ok(None),
        }
    }

    /// Issue a session token. The raw value is returned once; only its hash
    /// is stored.
    pub async fn create_auth_token(&self, user_id: i64) -> Result<String> {
        let raw_token = generate_raw_token();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO auth_tokens (user_id, token_hash) VALUES (?1, ?2)",
            params![user_id, hash_token(&raw_token)],
        )?;
        Ok(raw_token)
    }

    pub async fn user_for_token(&self, raw_token: &str) -> Result<Option<UserRecord>> {
        let db = self.db.lock().await;
        let user_id: Option<i64> = db
            .query_row(
                "SELECT user_id FROM auth_tokens WHERE token_hash = ?1",
                params![hash_token(raw_token)],
                |row| row.get(0),
            )
            .optional()?;
        match user_id {
            Some(id) => Ok(fetch_user(&db, id)?),
            None => Ok(None),
        }
    }

    pub async fn revoke_auth_token(&self, raw_token: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "DELETE FROM auth_tokens WHERE token_hash = ?1",
            params![hash_token(raw_token)],
        )?;
        Ok(rows > 0)
    }
}
