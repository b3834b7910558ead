//! Database row types. These map directly to SQLite rows and stay
//! independent of the lingua-types wire models.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub topic: String,
    pub error_analysis: String,
    pub user_id: i64,
}
