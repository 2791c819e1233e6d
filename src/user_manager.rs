use deadpool_postgres::Pool;
use log::info;
use std::error::Error;

/// a user the bot has talked to at least once
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i32,
    pub telegram_user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl StoredUser {
    /// `<a href='tg://user?id=..'>` mention built from stored data; used
    /// when the live chat lookup for a winner fails
    pub fn mention(&self) -> String {
        let name = self
            .first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.telegram_user_id.to_string());
        let handle = self
            .username
            .as_ref()
            .map(|u| format!(" (@{})", u))
            .unwrap_or_default();
        format!(
            "<a href='tg://user?id={}'>{}</a>{}",
            self.telegram_user_id,
            html_escape::encode_text(&name),
            handle
        )
    }
}

pub struct UserManager {
    pool: Pool,
}

impl UserManager {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// records a user on first contact; updates the stored name afterwards
    /// so winner mentions stay current
    pub async fn get_or_create_user(
        &self,
        telegram_user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<StoredUser, Box<dyn Error + Send + Sync>> {
        let client = self.pool.get().await?;

        if let Some(row) = client
            .query_opt(
                "UPDATE users SET username = $2, first_name = $3, updated_at = NOW() \
                 WHERE telegram_user_id = $1 \
                 RETURNING id, telegram_user_id, username, first_name",
                &[&telegram_user_id, &username, &first_name],
            )
            .await?
        {
            return Ok(StoredUser {
                id: row.get(0),
                telegram_user_id: row.get(1),
                username: row.get(2),
                first_name: row.get(3),
            });
        }

        let row = client
            .query_one(
                "INSERT INTO users (telegram_user_id, username, first_name) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, telegram_user_id, username, first_name",
                &[&telegram_user_id, &username, &first_name],
            )
            .await?;

        info!("Created new user {}", telegram_user_id);
        Ok(StoredUser {
            id: row.get(0),
            telegram_user_id: row.get(1),
            username: row.get(2),
            first_name: row.get(3),
        })
    }

    pub async fn get_user(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<StoredUser>, Box<dyn Error + Send + Sync>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, telegram_user_id, username, first_name FROM users \
                 WHERE telegram_user_id = $1",
                &[&telegram_user_id],
            )
            .await?;
        Ok(row.map(|row| StoredUser {
            id: row.get(0),
            telegram_user_id: row.get(1),
            username: row.get(2),
            first_name: row.get(3),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_prefers_first_name_and_escapes() {
        let user = StoredUser {
            id: 1,
            telegram_user_id: 42,
            username: Some("winner".to_string()),
            first_name: Some("A <b>".to_string()),
        };
        let mention = user.mention();
        assert!(mention.contains("tg://user?id=42"));
        assert!(mention.contains("A &lt;b&gt;"));
        assert!(mention.ends_with("(@winner)"));
    }

    #[test]
    fn mention_falls_back_to_id() {
        let user = StoredUser {
            id: 1,
            telegram_user_id: 42,
            username: None,
            first_name: None,
        };
        assert!(user.mention().contains(">42</a>"));
    }
}
