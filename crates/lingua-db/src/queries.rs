use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, ffi};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

impl Database {
    // -- Users --

    /// Inserts a user and returns the assigned id.
    pub fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// True when either the username or the email is already registered.
    pub fn user_exists(&self, username: &str, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                (username, email),
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"), username)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"), id)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        user_id: i64,
        content: &str,
        topic: &str,
        error_analysis: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (user_id, content, topic, error_analysis) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user_id, content, topic, error_analysis],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All messages owned by `user_id`, oldest first.
    pub fn get_messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at, topic, error_analysis, user_id
                 FROM messages
                 WHERE user_id = ?1
                 ORDER BY id ASC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        created_at: row.get(2)?,
                        topic: row.get(3)?,
                        error_analysis: row.get(4)?,
                        user_id: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns false when no message had that id.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

/// Whether a failed write hit a UNIQUE constraint, e.g. two registrations
/// racing for the same username.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, sql: &str, param: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let row = stmt.query_row([param], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn create_and_fetch_user() {
        let (_dir, db) = open_temp();

        let id = db.create_user("ayse", "ayse@example.com", "$argon2id$fake").unwrap();
        let by_id = db.get_user_by_id(id).unwrap().unwrap();
        let by_name = db.get_user_by_username("ayse").unwrap().unwrap();

        assert_eq!(by_id.id, id);
        assert_eq!(by_name.id, id);
        assert_eq!(by_id.email, "ayse@example.com");
        assert_eq!(by_id.password_hash, "$argon2id$fake");
        assert_eq!(by_id.created_at.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn missing_user_is_none() {
        let (_dir, db) = open_temp();
        assert!(db.get_user_by_id(42).unwrap().is_none());
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn user_exists_matches_username_or_email() {
        let (_dir, db) = open_temp();
        db.create_user("ayse", "ayse@example.com", "h").unwrap();

        assert!(db.user_exists("ayse", "other@example.com").unwrap());
        assert!(db.user_exists("other", "ayse@example.com").unwrap());
        assert!(!db.user_exists("other", "other@example.com").unwrap());
    }

    #[test]
    fn duplicate_username_or_email_is_unique_violation() {
        let (_dir, db) = open_temp();
        db.create_user("ayse", "ayse@example.com", "h").unwrap();

        let err = db.create_user("ayse", "new@example.com", "h").unwrap_err();
        assert!(is_unique_violation(&err));

        let err = db.create_user("mehmet", "ayse@example.com", "h").unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn other_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("something else");
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn messages_belong_to_their_user() {
        let (_dir, db) = open_temp();
        let ayse = db.create_user("ayse", "ayse@example.com", "h").unwrap();
        let mehmet = db.create_user("mehmet", "mehmet@example.com", "h").unwrap();

        let first = db.insert_message(ayse, "Ich habe gegessen", "grammar", "").unwrap();
        db.insert_message(ayse, "Ich bin gegangen", "grammar", "ok").unwrap();
        db.insert_message(mehmet, "Bonjour", "greetings", "").unwrap();

        let rows = db.get_messages_for_user(ayse).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[1].error_analysis, "ok");
        assert!(rows.iter().all(|r| r.user_id == ayse));

        assert!(db.delete_message(first).unwrap());
        assert!(!db.delete_message(first).unwrap());
        assert_eq!(db.get_messages_for_user(ayse).unwrap().len(), 1);
    }

    #[test]
    fn message_requires_existing_user() {
        let (_dir, db) = open_temp();
        assert!(db.insert_message(999, "orphan", "", "").is_err());
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let id = Database::open(&path).unwrap().create_user("ayse", "a@example.com", "h").unwrap();
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_user_by_id(id).unwrap().unwrap().username, "ayse");
    }
}
