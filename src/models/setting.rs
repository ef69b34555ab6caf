// ============================================================================
// Structure : Setting
// ============================================================================
// Paramètre clé/valeur de la plateforme (frais, limites, ...)
//
// Les valeurs sont des strings opaques : leur signification et leur
// validation appartiennent au serveur.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Paramètre de la plateforme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,

    pub key: String,

    /// Valeur brute (un nombre JSON est converti en string)
    #[serde(default, deserialize_with = "value_as_string")]
    pub value: String,

    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl Record for Setting {
    fn id(&self) -> i64 {
        self.id
    }

    fn status_key(&self) -> &str {
        ""
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.key.as_str(), self.value.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value_as_string() {
        let s: Setting = serde_json::from_str(r#"{"id": 1, "key": "min_withdrawal", "value": 50}"#).unwrap();
        assert_eq!(s.value, "50");
    }
}
