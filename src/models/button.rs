//! Menu button model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A node of the menu tree. Root buttons have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Button {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    /// Dense 1..N rank among siblings
    pub position: i64,
}

/// A button together with its depth, used for flattened pick lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonTreeEntry {
    pub button: Button,
    pub depth: usize,
}

impl ButtonTreeEntry {
    /// Label indented by depth, e.g. `"    #5 Lessons"`
    pub fn indented_label(&self) -> String {
        format!("{}#{} {}", "    ".repeat(self.depth), self.button.id, self.button.title)
    }
}

/// Direction of a reorder step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(MoveDirection::Up),
            "down" => Some(MoveDirection::Down),
            _ => None,
        }
    }
}
