// ============================================================================
// Configuration
// ============================================================================
// Paramètres de la console : URL de l'API, nom de la variable portant le
// token, pagination, cadence de rafraîchissement des notifications.
//
// Ordre de priorité :
// 1. Valeurs par défaut
// 2. Fichier ~/.config/lazyadmin/config.toml (s'il existe)
// 3. Variables d'environnement LAZYADMIN_*
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Nom du dossier de l'application (config, données, token)
const APP_DIR: &str = "lazyadmin";

/// Configuration de la console
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL de base de l'API (ex: "https://api.example.com/api")
    pub api_base_url: String,

    /// Nom de la variable d'environnement contenant le token
    /// (équivalent du nom du cookie d'authentification côté web)
    pub token_env: String,

    /// Fichier de token ; par défaut <data_dir>/lazyadmin/token
    pub token_file: Option<PathBuf>,

    /// Nombre de lignes par page dans les tableaux
    pub per_page: usize,

    /// Intervalle de rafraîchissement du compteur de notifications non lues
    pub unread_refresh_secs: u64,

    /// Timeout des requêtes HTTP
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            token_env: "LAZYADMIN_TOKEN".to_string(),
            token_file: None,
            per_page: 15,
            unread_refresh_secs: 30,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    /// Emplacement par défaut du fichier de configuration
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Charge la configuration complète (fichier + environnement)
    pub fn load() -> Result<Config> {
        let config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => {
                warn!("No config directory on this platform, using defaults");
                Config::default()
            }
        };

        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Lit un fichier TOML ; un fichier absent donne la configuration par défaut
    pub fn from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Fichier de configuration invalide : {}", path.display()))?;

        info!(?path, "Config loaded");
        Ok(config)
    }

    /// Applique les variables LAZYADMIN_* par-dessus la configuration
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - `lookup` abstrait std::env::var, ce qui rend la fonction testable
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LAZYADMIN_API_URL") {
            self.api_base_url = url;
        }

        if let Some(name) = lookup("LAZYADMIN_TOKEN_ENV") {
            self.token_env = name;
        }

        if let Some(path) = lookup("LAZYADMIN_TOKEN_FILE") {
            self.token_file = Some(PathBuf::from(path));
        }

        if let Some(per_page) = lookup("LAZYADMIN_PER_PAGE") {
            match per_page.parse::<usize>() {
                Ok(value) if value > 0 => self.per_page = value,
                _ => warn!(value = %per_page, "Ignoring invalid LAZYADMIN_PER_PAGE"),
            }
        }

        self
    }

    /// Chemin du fichier de token de session
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join("token")))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url = \"https://admin.example.com/api\"").unwrap();
        writeln!(file, "per_page = 50").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://admin.example.com/api");
        assert_eq!(config.per_page, 50);
        assert_eq!(config.token_env, "LAZYADMIN_TOKEN");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "per_page = \"many\"").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env_overrides(|name| match name {
            "LAZYADMIN_API_URL" => Some("http://10.0.0.1/api".to_string()),
            "LAZYADMIN_PER_PAGE" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(config.api_base_url, "http://10.0.0.1/api");
        // 0 est invalide : la valeur par défaut est conservée
        assert_eq!(config.per_page, 15);
    }
}
