use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Record;
use crate::error::{FinTrackError, Result};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Category {
    const TABLE: &'static str = "categories";

    fn check(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("category {} has an empty name", self.id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CategoryRef: the category columns embedded in expense and budget rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

// ---------------------------------------------------------------------------
// NewCategory: insert payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl NewCategory {
    pub fn new(user_id: Uuid, name: &str) -> Self {
        Self {
            user_id,
            name: name.trim().to_string(),
            color: None,
            icon: None,
        }
    }

    pub fn with_style(mut self, color: &str, icon: &str) -> Self {
        self.color = Some(color.to_string());
        self.icon = Some(icon.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinTrackError::Validation(
                "category name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default categories seeded for new users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

pub const DEFAULT_CATEGORIES: [DefaultCategory; 8] = [
    DefaultCategory {
        name: "Food",
        color: "#EF4444",
        icon: "🍔",
    },
    DefaultCategory {
        name: "Transport",
        color: "#3B82F6",
        icon: "🚗",
    },
    DefaultCategory {
        name: "Housing",
        color: "#8B5CF6",
        icon: "🏠",
    },
    DefaultCategory {
        name: "Leisure",
        color: "#EC4899",
        icon: "🎮",
    },
    DefaultCategory {
        name: "Health",
        color: "#10B981",
        icon: "💊",
    },
    DefaultCategory {
        name: "Shopping",
        color: "#F59E0B",
        icon: "🛍️",
    },
    DefaultCategory {
        name: "Education",
        color: "#6366F1",
        icon: "📚",
    },
    DefaultCategory {
        name: "Other",
        color: "#6B7280",
        icon: "📦",
    },
];

impl DefaultCategory {
    pub fn for_user(&self, user_id: Uuid) -> NewCategory {
        NewCategory::new(user_id, self.name).with_style(self.color, self.icon)
    }
}
