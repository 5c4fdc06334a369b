//! `users` table access.

use sqlx::PgConnection;

use crate::domain::{NewUser, User};
use crate::persistence::StorageError;
use crate::persistence::models::UserRow;

pub(super) async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<User>, StorageError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(User::from))
}

pub(super) async fn find_by_username(
    conn: &mut PgConnection,
    username: &str,
) -> Result<Option<User>, StorageError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(User::from))
}

/// Inserts a user; returns `None` when the username is already taken.
pub(super) async fn insert(
    conn: &mut PgConnection,
    user: &NewUser,
) -> Result<Option<User>, StorageError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
         ON CONFLICT (username) DO NOTHING \
         RETURNING id, username, password_hash",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(User::from))
}
