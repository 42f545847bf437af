//! Admin roster model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminRecord {
    pub user_id: i64,
    pub name: Option<String>,
    pub is_super: bool,
}

impl AdminRecord {
    pub fn role(&self) -> &'static str {
        if self.is_super { "super" } else { "admin" }
    }
}
