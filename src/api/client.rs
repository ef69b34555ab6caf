// ============================================================================
// API Client : administration de la plateforme
// ============================================================================
// Client HTTP typé vers l'API REST d'administration
//
// CONCEPTS RUST :
// 1. async/await : appels non-bloquants, exécutés par le worker
// 2. Génériques + DeserializeOwned : un seul chemin de parsing pour toutes
//    les listes
// 3. #[instrument] : chaque appel porte son contexte dans les logs
// ============================================================================

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::api::error::ApiError;
use crate::models::{DashboardStats, ItemEnvelope, ListEnvelope};
use crate::mutation::{Action, Updated};
use crate::session::Session;
use crate::store::{Loaded, Resource};

/// Client de l'API d'administration
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Crée un client pour la session donnée
    pub fn new(session: &Session, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lazyadmin/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: session.base_url().to_string(),
            token: session.token().map(str::to_string),
        })
    }

    /// Remplace le token bearer (nouvelle saisie après un 401)
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// URL complète d'un chemin relatif
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Prépare une requête avec l'authentification bearer
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Envoie la requête et convertit les statuts non-2xx en ApiError
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(status = %status, url = %response.url(), "Received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        error!(status = %status, error = %err, "API returned error status");
        Err(err)
    }

    // ========================================================================
    // Lecture
    // ========================================================================

    /// Récupère une liste (tableau nu ou enveloppe {"data": [...]})
    #[instrument(skip(self, resource), fields(resource = resource.label()))]
    pub async fn fetch_list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>, ApiError> {
        let response = self.send(self.request(Method::GET, resource.path())).await?;
        let body = response.text().await?;

        let envelope: ListEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("{}: {}", resource.label(), e)))?;

        let items = envelope.into_items();
        info!(count = items.len(), "Fetched list");
        Ok(items)
    }

    /// Statistiques du dashboard ; un corps vide donne les stats à zéro
    #[instrument(skip(self))]
    pub async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self.send(self.request(Method::GET, Resource::Stats.path())).await?;
        let body = response.text().await?;

        if body.trim().is_empty() {
            warn!("Empty stats payload, using defaults");
            return Ok(DashboardStats::default());
        }

        serde_json::from_str::<ItemEnvelope<DashboardStats>>(&body)
            .map(ItemEnvelope::into_item)
            .map_err(|e| ApiError::Decode(format!("stats: {}", e)))
    }

    /// Récupère n'importe quelle ressource, typée via `Loaded`
    pub async fn fetch(&self, resource: Resource) -> Result<Loaded, ApiError> {
        Ok(match resource {
            Resource::Stats => Loaded::Stats(self.fetch_stats().await?),
            Resource::Users => Loaded::Users(self.fetch_list(resource).await?),
            Resource::Transactions => Loaded::Transactions(self.fetch_list(resource).await?),
            Resource::Withdrawals => Loaded::Withdrawals(self.fetch_list(resource).await?),
            Resource::Kyc => Loaded::Kyc(self.fetch_list(resource).await?),
            Resource::Payments => Loaded::Payments(self.fetch_list(resource).await?),
            Resource::Plans => Loaded::Plans(self.fetch_list(resource).await?),
            Resource::Tasks => Loaded::Tasks(self.fetch_list(resource).await?),
            Resource::Notifications => Loaded::Notifications(self.fetch_list(resource).await?),
            Resource::Settings => Loaded::Settings(self.fetch_list(resource).await?),
        })
    }

    /// Nombre de notifications non lues
    ///
    /// Formats acceptés : 3, {"count": 3}, {"unread": 3}, {"data": {"count": 3}}
    #[instrument(skip(self))]
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let response = self
            .send(self.request(Method::GET, "admin/notifications/unread-count"))
            .await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("unread count: {}", e)))?;

        Ok(parse_count(&value).unwrap_or(0))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Envoie une mutation et récupère l'entité renvoyée, si présente
    ///
    /// Une réponse vide (204) ou sans entité reconnaissable donne None :
    /// le patch sera calculé localement.
    async fn mutate<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.send(builder).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<ItemEnvelope<T>>(&text) {
            Ok(envelope) => Ok(Some(envelope.into_item())),
            Err(e) => {
                debug!(error = %e, "Mutation response carries no entity");
                Ok(None)
            }
        }
    }

    /// POST sans corps
    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.mutate::<T, Value>(Method::POST, path, None).await
    }

    /// Exécute une action d'administration (un seul appel HTTP)
    #[instrument(skip(self, action), fields(action = %action.describe()))]
    pub async fn execute(&self, action: &Action) -> Result<Updated, ApiError> {
        let updated = match action {
            Action::ApproveWithdrawal(id) => Updated::from_option(
                self.post(&format!("admin/withdrawals/{}/approve", id)).await?,
                Updated::Withdrawal,
            ),
            Action::RejectWithdrawal(id) => Updated::from_option(
                self.post(&format!("admin/withdrawals/{}/reject", id)).await?,
                Updated::Withdrawal,
            ),
            Action::ApproveKyc(id) => Updated::from_option(
                self.post(&format!("admin/kyc/{}/approve", id)).await?,
                Updated::Kyc,
            ),
            Action::RejectKyc { id, reason } => Updated::from_option(
                self.mutate(
                    Method::POST,
                    &format!("admin/kyc/{}/reject", id),
                    Some(&serde_json::json!({ "reason": reason })),
                )
                .await?,
                Updated::Kyc,
            ),
            Action::ApprovePayment(id) => Updated::from_option(
                self.post(&format!("admin/payments/{}/approve", id)).await?,
                Updated::Payment,
            ),
            Action::RejectPayment(id) => Updated::from_option(
                self.post(&format!("admin/payments/{}/reject", id)).await?,
                Updated::Payment,
            ),
            Action::BlockUser(id) => Updated::from_option(
                self.post(&format!("admin/users/{}/block", id)).await?,
                Updated::User,
            ),
            Action::UnblockUser(id) => Updated::from_option(
                self.post(&format!("admin/users/{}/unblock", id)).await?,
                Updated::User,
            ),
            Action::DeletePlan(id) => {
                self.mutate::<Value, Value>(Method::DELETE, &format!("admin/plans/{}", id), None)
                    .await?;
                Updated::Nothing
            }
            Action::DeleteTask(id) => {
                self.mutate::<Value, Value>(Method::DELETE, &format!("admin/tasks/{}", id), None)
                    .await?;
                Updated::Nothing
            }
            Action::CreatePlan(plan) => Updated::from_option(
                self.mutate(Method::POST, Resource::Plans.path(), Some(plan)).await?,
                Updated::Plan,
            ),
            Action::CreateTask(task) => Updated::from_option(
                self.mutate(Method::POST, Resource::Tasks.path(), Some(task)).await?,
                Updated::Task,
            ),
            Action::SendNotification(notification) => Updated::from_option(
                self.mutate(Method::POST, Resource::Notifications.path(), Some(notification))
                    .await?,
                Updated::Notification,
            ),
            Action::MarkNotificationRead(id) => Updated::from_option(
                self.post(&format!("admin/notifications/{}/read", id)).await?,
                Updated::Notification,
            ),
            Action::UpdateSetting { key, value } => Updated::from_option(
                self.mutate(
                    Method::PUT,
                    &format!("admin/settings/{}", key),
                    Some(&serde_json::json!({ "value": value })),
                )
                .await?,
                Updated::Setting,
            ),
        };

        info!(with_entity = !matches!(updated, Updated::Nothing), "Mutation succeeded");
        Ok(updated)
    }
}

/// Extrait un compteur d'une réponse JSON plus ou moins enveloppée
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::Object(map) => ["count", "unread", "unread_count", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(parse_count)),
        _ => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Transaction, WithdrawalStatus};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            api_base_url: format!("{}/api", server.uri()),
            ..Config::default()
        };
        let session = Session::start_with(&config, |_| Some("secret".to_string())).unwrap();
        ApiClient::new(&session, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&serde_json::json!(4)), Some(4));
        assert_eq!(parse_count(&serde_json::json!({"unread": 2})), Some(2));
        assert_eq!(parse_count(&serde_json::json!({"data": {"count": 7}})), Some(7));
        assert_eq!(parse_count(&serde_json::json!({"other": 1})), None);
    }

    #[tokio::test]
    async fn test_fetch_wrapped_list_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/transactions"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": 1, "type": "deposit", "amount": "100.00", "status": "completed"},
                    {"id": 2, "type": "withdrawal", "amount": 50, "status": "pending"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let items: Vec<Transaction> = client.fetch_list(Resource::Transactions).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 100.0);
    }

    #[tokio::test]
    async fn test_error_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/withdrawals/3/approve"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({"message": "Insufficient platform balance"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.execute(&Action::ApproveWithdrawal(3)).await.unwrap_err();
        assert_eq!(err.display_message(), "Insufficient platform balance");
    }

    #[tokio::test]
    async fn test_mutation_with_entity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/withdrawals/3/reject"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 3, "amount": 10, "status": "rejected"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.execute(&Action::RejectWithdrawal(3)).await.unwrap() {
            Updated::Withdrawal(w) => assert_eq!(w.status, WithdrawalStatus::Rejected),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mutation_without_entity() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/plans/8"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/admin/users/4/block"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.execute(&Action::DeletePlan(8)).await.unwrap(), Updated::Nothing);
        assert_eq!(client.execute(&Action::BlockUser(4)).await.unwrap(), Updated::Nothing);
    }

    #[tokio::test]
    async fn test_stats_and_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"total_users": 10, "pending_kyc": 2}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stats = client.fetch_stats().await.unwrap();
        assert_eq!(stats.total_users, 10);
        assert_eq!(stats.total_deposits, 0.0);

        let err = client.fetch(Resource::Users).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
