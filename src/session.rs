// ============================================================================
// Session d'administration
// ============================================================================
// Contexte explicite de la connexion : URL de l'API et token bearer.
//
// CONCEPT : Cycle de vie défini
// - start() au lancement : lit le token (variable d'environnement, puis fichier)
// - end() à la déconnexion : supprime le fichier de token
// - Le client API reçoit la session, il ne lit jamais l'environnement lui-même
// ============================================================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Session courante
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl Session {
    /// Ouvre la session à partir de la configuration
    pub fn start(config: &Config) -> Result<Session> {
        Self::start_with(config, |name| std::env::var(name).ok())
    }

    /// Variante testable de start() avec lookup d'environnement injecté
    pub fn start_with<F>(config: &Config, lookup: F) -> Result<Session>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_file = config.token_path();

        let token = match lookup(&config.token_env).filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                debug!(env = %config.token_env, "Token read from environment");
                Some(token.trim().to_string())
            }
            None => match &token_file {
                Some(path) if path.exists() => {
                    let content = std::fs::read_to_string(path)
                        .with_context(|| format!("Échec de la lecture du token {}", path.display()))?;
                    let token = content.trim().to_string();
                    debug!(?path, "Token read from file");
                    (!token.is_empty()).then_some(token)
                }
                _ => None,
            },
        };

        if token.is_none() {
            warn!(env = %config.token_env, "No admin token found, requests will be unauthenticated");
        }

        info!(base_url = %config.api_base_url, authenticated = token.is_some(), "Session started");

        Ok(Session {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
            token_file,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Mémorise un nouveau token et l'écrit dans le fichier de session
    pub fn save_token(&mut self, token: String) -> Result<()> {
        if let Some(path) = &self.token_file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Échec de la création du répertoire de session")?;
            }
            std::fs::write(path, &token).context("Échec de l'écriture du token")?;
        }
        self.token = Some(token);
        Ok(())
    }

    /// Termine la session : oublie le token et supprime le fichier
    pub fn end(&mut self) -> Result<()> {
        self.token = None;
        if let Some(path) = &self.token_file {
            if path.exists() {
                std::fs::remove_file(path).context("Échec de la suppression du token")?;
            }
        }
        info!("Session ended");
        Ok(())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        Config {
            api_base_url: "http://localhost:9000/api/".to_string(),
            token_file: Some(dir.path().join("token")),
            ..Config::default()
        }
    }

    #[test]
    fn test_env_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        std::fs::write(dir.path().join("token"), "from-file").unwrap();

        let session = Session::start_with(&config, |_| Some("from-env".to_string())).unwrap();
        assert_eq!(session.token(), Some("from-env"));
        assert_eq!(session.base_url(), "http://localhost:9000/api");
    }

    #[test]
    fn test_file_token_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        std::fs::write(dir.path().join("token"), "abc123\n").unwrap();

        let session = Session::start_with(&config, |_| None).unwrap();
        assert_eq!(session.token(), Some("abc123"));
    }

    #[test]
    fn test_save_then_end_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let mut session = Session::start_with(&config, |_| None).unwrap();
        assert!(!session.is_authenticated());

        session.save_token("fresh".to_string()).unwrap();
        assert!(dir.path().join("token").exists());

        session.end().unwrap();
        assert!(!dir.path().join("token").exists());
        assert!(!session.is_authenticated());
    }
}
