//! HTTP clients for the hosted service's REST and auth endpoints

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{AuthBackend, Session, TableBackend, UserInfo};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::query::{Filter, FilterOp, SelectRequest};

/// HTTP client for the relational REST surface (`/rest/v1/{table}`)
#[derive(Debug)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Session token, when a user is signed in; the API key is used otherwise
    token: std::sync::RwLock<Option<String>>,
}

impl RestClient {
    /// Create a new REST client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            token: std::sync::RwLock::new(None),
        }
    }

    /// Set or clear the session token used for authorization
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    fn auth_header(&self) -> String {
        let token = self.token.read().expect("token lock poisoned");
        format!("Bearer {}", token.as_deref().unwrap_or(&self.api_key))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.auth_header())
    }

    /// Render one filter as a `column=op.value` query pair
    fn filter_param(filter: &Filter) -> (String, String) {
        (filter.column.clone(), Self::filter_value(filter))
    }

    fn filter_value(filter: &Filter) -> String {
        match filter.op {
            // Substring semantics: wrap the bare term in wildcards
            FilterOp::Ilike => format!("ilike.*{}*", filter.value_literal()),
            op => format!("{}.{}", op.as_str(), filter.value_literal()),
        }
    }

    fn select_params(request: &SelectRequest) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for filter in &request.filters {
            params.push(Self::filter_param(filter));
        }

        if !request.or_filters.is_empty() {
            let group = request
                .or_filters
                .iter()
                .map(|f| format!("{}.{}", f.column, Self::filter_value(f)))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("or".to_string(), format!("({})", group)));
        }

        if let Some(order) = &request.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(limit) = request.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Handle the HTTP response, mapping error statuses to typed errors
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            tracing::warn!(status = %status, body = %text, "Backend request failed");
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                _ => Err(ClientError::Internal(text)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    fn single_row(mut rows: Vec<Value>, context: &str) -> ClientResult<Value> {
        if rows.is_empty() {
            return Err(ClientError::InvalidResponse(format!(
                "{}: empty representation",
                context
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait]
impl TableBackend for RestClient {
    async fn select(&self, request: &SelectRequest) -> ClientResult<Vec<Value>> {
        let builder = self
            .client
            .get(self.table_url(&request.table))
            .query(&Self::select_params(request));

        let response = self.request(builder).send().await?;
        Self::handle_response(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);

        let response = self.request(builder).send().await?;
        let rows: Vec<Value> = Self::handle_response(response).await?;
        Self::single_row(rows, "insert")
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> ClientResult<Vec<Value>> {
        let params: Vec<_> = filters.iter().map(Self::filter_param).collect();
        let builder = self
            .client
            .patch(self.table_url(table))
            .query(&params)
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = self.request(builder).send().await?;
        Self::handle_response(response).await
    }

    async fn upsert(&self, table: &str, on_conflict: &[&str], row: Value) -> ClientResult<Value> {
        let builder = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);

        let response = self.request(builder).send().await?;
        let rows: Vec<Value> = Self::handle_response(response).await?;
        Self::single_row(rows, "upsert")
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> ClientResult<u64> {
        let params: Vec<_> = filters.iter().map(Self::filter_param).collect();
        let builder = self
            .client
            .delete(self.table_url(table))
            .query(&params)
            .header("Prefer", "return=representation");

        let response = self.request(builder).send().await?;
        let rows: Vec<Value> = Self::handle_response(response).await?;
        Ok(rows.len() as u64)
    }
}

/// HTTP client for the session auth surface (`/auth/v1/*`)
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Wire shape of a successful token grant
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<u64>,
    user: AuthUser,
}

/// Wire shape of the auth user object
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl AuthClient {
    /// Create a new auth client from configuration
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        #[derive(serde::Serialize)]
        struct PasswordGrant<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            // The auth endpoint reports rejected credentials as a 400
            return Err(ClientError::Unauthorized);
        }
        let token: TokenResponse = RestClient::handle_response(response).await?;

        let expires_at = token
            .expires_at
            .or_else(|| Session::parse_jwt_exp(&token.access_token));

        Ok(Session {
            expires_at,
            user: UserInfo {
                id: token.user.id,
                email: token.user.email.unwrap_or_default(),
            },
            access_token: token.access_token,
        })
    }

    async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else if response.status() == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized)
        } else {
            Err(ClientError::Internal(response.text().await?))
        }
    }

    async fn get_user(&self, access_token: &str) -> ClientResult<UserInfo> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;

        let user: AuthUser = RestClient::handle_response(response).await?;
        Ok(UserInfo {
            id: user.id,
            email: user.email.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SelectRequest;

    #[test]
    fn test_select_params_rendering() {
        let request = SelectRequest::table("attendance")
            .eq("employee_id", "e1")
            .gte("date", "2025-03-01")
            .lte("date", "2025-03-31")
            .order("date", true)
            .limit(50);

        let params = RestClient::select_params(&request);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("employee_id".to_string(), "eq.e1".to_string()),
                ("date".to_string(), "gte.2025-03-01".to_string()),
                ("date".to_string(), "lte.2025-03-31".to_string()),
                ("order".to_string(), "date.asc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_renders_or_group() {
        let request = SelectRequest::table("employees")
            .search(&["full_name", "email"], "ada")
            .order("created_at", false);

        let params = RestClient::select_params(&request);
        assert!(params.contains(&(
            "or".to_string(),
            "(full_name.ilike.*ada*,email.ilike.*ada*)".to_string()
        )));
        assert!(params.contains(&("order".to_string(), "created_at.desc".to_string())));
    }

    #[test]
    fn test_single_row() {
        let rows = vec![serde_json::json!({"id": "a"}), serde_json::json!({"id": "b"})];
        let row = RestClient::single_row(rows, "insert").unwrap();
        assert_eq!(row["id"], "a");

        let err = RestClient::single_row(Vec::new(), "insert");
        assert!(matches!(err, Err(ClientError::InvalidResponse(_))));
    }
}
