// ============================================================================
// Structure : Task
// ============================================================================
// Tâche rémunérée proposée aux utilisateurs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{amount_from_any, Record};

api_enum! {
    TaskStatus {
        Active => "active",
        Inactive => "inactive",
        Completed => "completed",
    }
}

/// Tâche
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default, deserialize_with = "amount_from_any")]
    pub reward: f64,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Record for Task {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn amount(&self) -> f64 {
        self.reward
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }
}

/// Corps de la requête de création d'une tâche
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub reward: f64,
}

impl NewTask {
    /// Parse une saisie "titre;récompense"
    pub fn parse(input: &str) -> Option<Self> {
        let (title, reward) = input.split_once(';')?;
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            reward: reward.trim().parse().ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_parse() {
        let task = NewTask::parse("Watch video ; 2.5").unwrap();
        assert_eq!(task.title, "Watch video");
        assert_eq!(task.reward, 2.5);
        assert!(NewTask::parse("no reward").is_none());
        assert!(NewTask::parse(" ;3").is_none());
    }
}
