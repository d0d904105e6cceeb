// src/integrations/supabase/client.rs
//
// Hosted backend REST client
//
// ARCHITECTURE:
// - PostgREST tables under `rest/v1/`
// - Remote procedures under `rest/v1/rpc/`
// - GoTrue auth under `auth/v1/` (see supabase/auth.rs)
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Returns raw rows; repositories map them to domain records
// - Every request carries the project key and the current bearer token

use std::sync::RwLock;
use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

const REST_PREFIX: &str = "rest/v1/";
const RPC_PREFIX: &str = "rest/v1/rpc/";
pub(crate) const AUTH_PREFIX: &str = "auth/v1/";

/// Error body shapes returned by PostgREST and GoTrue
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// A filtered read against one table.
///
/// ```ignore
/// let query = TableQuery::new("videos")
///     .order_desc("created_at")
///     .range(0, 12)
///     .ilike_contains("title", "rust");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    params: Vec<(String, String)>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            params: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn neq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("neq.{}", value)));
        self
    }

    /// Case-insensitive substring match
    pub fn ilike_contains(mut self, column: &str, term: &str) -> Self {
        self.params
            .push((column.to_string(), format!("ilike.*{}*", term)));
        self
    }

    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: std::fmt::Display,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({})", joined)));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.params
            .push(("order".to_string(), format!("{}.desc", column)));
        self
    }

    /// Rows `[offset, offset + limit)`
    pub fn range(self, offset: usize, limit: usize) -> Self {
        let mut query = self.limit(limit);
        query
            .params
            .push(("offset".to_string(), offset.to_string()));
        query
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn apply_to(&self, mut url: Url) -> Url {
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Backend REST client
pub struct SupabaseClient {
    base_url: Url,
    api_key: String,
    http_client: Client,
    /// Signed-in user's token; the project key is used while signed out
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    /// `base_url` must end with `/` for path joins to keep its own path
    pub fn new(base_url: Url, api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::Http)?;

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            http_client,
            access_token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Self::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
            config.request_timeout,
        )
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn bearer(&self) -> String {
        let token = self.access_token.read().unwrap_or_else(|e| e.into_inner());
        format!("Bearer {}", token.as_deref().unwrap_or(&self.api_key))
    }

    pub(crate) fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    pub(crate) fn table_url(&self, query: &TableQuery) -> AppResult<Url> {
        let url = self.endpoint(&format!("{}{}", REST_PREFIX, query.table()))?;
        Ok(query.apply_to(url))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http_client
    }

    /// Adds the project key and the current bearer token
    pub(crate) fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, self.bearer())
            .header(header::ACCEPT, "application/json")
    }

    /// Same as `authorized` but with an explicit user token
    pub(crate) fn authorized_as(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::ACCEPT, "application/json")
    }

    pub async fn select<T>(&self, query: &TableQuery) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(query)?;
        log::debug!("GET {}", url);

        let response = self
            .authorized(self.http_client.get(url))
            .send()
            .await?;

        read_json(response).await
    }

    /// Inserts rows and returns them as stored
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> AppResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&format!("{}{}", REST_PREFIX, table))?;
        log::debug!("POST {}", url);

        let response = self
            .authorized(self.http_client.post(url))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Patches every row matched by `query`
    pub async fn update<B>(&self, query: &TableQuery, body: &B) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.table_url(query)?;
        log::debug!("PATCH {}", url);

        let response = self
            .authorized(self.http_client.patch(url))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;

        ensure_success(response).await.map(|_| ())
    }

    pub async fn rpc<B>(&self, function: &str, args: &B) -> AppResult<serde_json::Value>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(&format!("{}{}", RPC_PREFIX, function))?;
        log::debug!("RPC {}", function);

        let response = self
            .authorized(self.http_client.post(url))
            .json(args)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Startup check: one cheap read against the catalog table
    pub async fn check_connection(&self) -> AppResult<()> {
        let query = TableQuery::new("videos").select("id").limit(1);
        let _: Vec<serde_json::Value> = self.select(&query).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into `AppError::Backend`
pub(crate) async fn ensure_success(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(backend_error(status.as_u16(), &body))
}

pub(crate) async fn read_json<T>(response: Response) -> AppResult<T>
where
    T: DeserializeOwned,
{
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn backend_error(status: u16, body: &str) -> AppError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {}", status)
            } else {
                body.trim().to_string()
            }
        });
    AppError::Backend { status, message }
}
