// ============================================================================
// Erreurs de l'API
// ============================================================================
// CONCEPT RUST : thiserror
// - Enum d'erreur typée, Display généré par #[error(...)]
// - #[from] : conversion automatique avec l'opérateur ?
//
// Côté UI, une erreur n'a que deux formes : "message du serveur" ou
// "message générique" (display_message()).
// ============================================================================

use serde_json::Value;
use thiserror::Error;

/// Message affiché quand le serveur ne fournit aucune explication
pub const GENERIC_ERROR: &str = "Something went wrong, please try again";

/// Erreur d'un appel à l'API d'administration
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token absent, expiré ou refusé (HTTP 401)
    #[error("unauthorized (HTTP 401)")]
    Unauthorized { message: Option<String> },

    /// Réponse HTTP non-2xx
    #[error("HTTP {status}")]
    Http { status: u16, message: Option<String> },

    /// Connexion impossible, timeout, ...
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Corps de réponse illisible
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Construit l'erreur d'une réponse non-2xx à partir de son corps
    pub fn from_status(status: u16, body: &str) -> ApiError {
        let message = extract_message(body);
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Http { status, message }
        }
    }

    /// Texte à afficher dans le bandeau d'alerte
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } => message
                .clone()
                .unwrap_or_else(|| "Session expired, press [T] to set a new token".to_string()),
            ApiError::Http { message, .. } => {
                message.clone().unwrap_or_else(|| GENERIC_ERROR.to_string())
            }
            ApiError::Network(_) | ApiError::Decode(_) => GENERIC_ERROR.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Cherche un message lisible dans un corps d'erreur JSON
///
/// Formats acceptés : {"message": "..."}, {"error": "..."},
/// {"error": {"message": "..."}}, {"errors": {"field": ["..."]}}
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let direct = value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => v.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        });

    let message = direct.or_else(|| {
        value
            .get("errors")?
            .as_object()?
            .values()
            .filter_map(|v| v.as_array().and_then(|a| a.first()).or(Some(v)))
            .find_map(Value::as_str)
            .map(str::to_string)
    })?;

    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_shown() {
        let err = ApiError::from_status(422, r#"{"message": "Insufficient balance"}"#);
        assert_eq!(err.display_message(), "Insufficient balance");
    }

    #[test]
    fn test_nested_and_validation_messages() {
        let err = ApiError::from_status(400, r#"{"error": {"message": "Bad id"}}"#);
        assert_eq!(err.display_message(), "Bad id");

        let err = ApiError::from_status(422, r#"{"errors": {"name": ["Name is required"]}}"#);
        assert_eq!(err.display_message(), "Name is required");
    }

    #[test]
    fn test_generic_fallback() {
        let err = ApiError::from_status(500, "<html>oops</html>");
        assert_eq!(err.display_message(), GENERIC_ERROR);

        let err = ApiError::from_status(500, r#"{"message": "  "}"#);
        assert_eq!(err.display_message(), GENERIC_ERROR);
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::from_status(401, "");
        assert!(err.is_unauthorized());
        assert!(err.display_message().contains("token"));
    }
}
