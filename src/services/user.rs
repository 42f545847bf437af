//! User service implementation
//!
//! This service records every user the bot sees, computes roster statistics
//! and exports the roster for admins.

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};
use crate::database::repositories::UserRepository;
use crate::models::user::{UpsertUserRequest, User, UserStats};
use crate::utils::errors::Result;
use crate::utils::helpers::format_timestamp;

/// File name of the roster export
pub const EXPORT_FILE_NAME: &str = "users.json";

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    user_id: i64,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    username: Option<&'a str>,
    joined_at: String,
}

/// User service for managing user operations
#[derive(Clone, Debug)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Record a user; names are refreshed, the join time is kept
    pub async fn touch(&self, request: UpsertUserRequest) -> Result<User> {
        let user_id = request.user_id;
        let user = self.user_repository.upsert(request).await?;
        debug!(user_id = user_id, joined_at = %user.joined_at, "User recorded");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.user_repository.find_by_id(user_id).await
    }

    /// Total users and those who joined in the last day, week and month
    pub async fn stats(&self) -> Result<UserStats> {
        let now = Utc::now();
        let total = self.user_repository.count_since(None).await?;
        let last_day = self.user_repository.count_since(Some(now - Duration::days(1))).await?;
        let last_week = self.user_repository.count_since(Some(now - Duration::days(7))).await?;
        let last_month = self.user_repository.count_since(Some(now - Duration::days(30))).await?;

        Ok(UserStats { total, last_day, last_week, last_month })
    }

    /// Whole roster as pretty JSON
    pub async fn export_json(&self) -> Result<Vec<u8>> {
        let users = self.user_repository.list_all().await?;
        let rows: Vec<ExportRow<'_>> = users
            .iter()
            .map(|u| ExportRow {
                user_id: u.user_id,
                first_name: u.first_name.as_deref(),
                last_name: u.last_name.as_deref(),
                username: u.username.as_deref(),
                joined_at: format_timestamp(u.joined_at),
            })
            .collect();

        let bytes = serde_json::to_vec_pretty(&rows)?;
        info!(users = rows.len(), bytes = bytes.len(), "User roster exported");
        Ok(bytes)
    }
}

/// Stats block shown in the admin users section
pub fn format_stats(stats: &UserStats) -> String {
    format!(
        "👥 Total: {}\n🕐 Last 24h: {}\n📅 Last 7 days: {}\n🗓️ Last 30 days: {}",
        stats.total, stats.last_day, stats.last_week, stats.last_month
    )
}
