use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Supabase URL is not configured")]
    NotConfigured,

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Transport(_) | DatabaseError::Api { .. } => {
                AppError::ExternalService(err.to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Thin PostgREST client. Every table is treated as a document collection
/// addressed by column equality.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: config.http_client.clone(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, extra: Option<HeaderMap>) -> DbResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| DatabaseError::InvalidHeader(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| DatabaseError::InvalidHeader(e.to_string()))?;

        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(extra) = extra {
            headers.extend(extra);
        }

        Ok(headers)
    }

    /// Builds `/rest/v1/<table>` with `column=eq.value` filters. Values are
    /// percent-encoded, so labels like `may 15, 2022` survive intact.
    pub fn table_url(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> DbResult<Url> {
        if self.base_url.is_empty() {
            return Err(DatabaseError::NotConfigured);
        }

        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, table))
            .map_err(|e| DatabaseError::InvalidUrl(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            for (column, value) in filters {
                query.append_pair(column, &format!("eq.{}", value));
            }
        }

        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    pub async fn request<T>(&self, method: Method, url: Url, body: Option<serde_json::Value>) -> DbResult<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, url, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        extra_headers: Option<HeaderMap>,
    ) -> DbResult<T>
    where T: DeserializeOwned {
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(extra_headers)?;

        let mut req = self.client.request(method, url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatabaseError::Auth(error_text),
                StatusCode::NOT_FOUND => DatabaseError::NotFound(error_text),
                StatusCode::CONFLICT => DatabaseError::Conflict(error_text),
                _ => DatabaseError::Api { status: status.as_u16(), message: error_text },
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn return_representation(prefer: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("prefer"), HeaderValue::from_static(prefer));
        headers
    }

    /// `find`: every row matching all filters. `columns` maps to `select=`.
    pub async fn find<T>(&self, table: &str, filters: &[(&str, &str)], columns: Option<&str>) -> DbResult<Vec<T>>
    where T: DeserializeOwned {
        let params: Vec<(&str, &str)> = columns.map(|c| vec![("select", c)]).unwrap_or_default();
        let url = self.table_url(table, filters, &params)?;
        self.request(Method::GET, url, None).await
    }

    /// `findOne`: the first matching row, if any.
    pub async fn find_one<T>(&self, table: &str, filters: &[(&str, &str)]) -> DbResult<Option<T>>
    where T: DeserializeOwned {
        let url = self.table_url(table, filters, &[("limit", "1")])?;
        let mut rows: Vec<T> = self.request(Method::GET, url, None).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    /// `insertOne`: returns the stored row. A unique-constraint violation
    /// surfaces as `DatabaseError::Conflict`.
    pub async fn insert_one<D, T>(&self, table: &str, document: &D) -> DbResult<T>
    where D: Serialize, T: DeserializeOwned {
        let url = self.table_url(table, &[], &[])?;
        let body = serde_json::to_value(document)?;
        let rows: Vec<T> = self.request_with_headers(
            Method::POST,
            url,
            Some(body),
            Some(Self::return_representation("return=representation")),
        ).await?;

        rows.into_iter().next().ok_or_else(|| DatabaseError::Api {
            status: StatusCode::OK.as_u16(),
            message: format!("insert into {} returned no rows", table),
        })
    }

    /// `updateOne(upsert)`: insert, or merge the given columns into the row
    /// whose `conflict_column` matches.
    pub async fn upsert_one<D, T>(&self, table: &str, conflict_column: &str, document: &D) -> DbResult<T>
    where D: Serialize, T: DeserializeOwned {
        let url = self.table_url(table, &[], &[("on_conflict", conflict_column)])?;
        let body = serde_json::to_value(document)?;
        let rows: Vec<T> = self.request_with_headers(
            Method::POST,
            url,
            Some(body),
            Some(Self::return_representation("resolution=merge-duplicates,return=representation")),
        ).await?;

        rows.into_iter().next().ok_or_else(|| DatabaseError::Api {
            status: StatusCode::OK.as_u16(),
            message: format!("upsert into {} returned no rows", table),
        })
    }

    /// `updateOne` without upsert: patches every matching row and returns them.
    pub async fn update<D, T>(&self, table: &str, filters: &[(&str, &str)], patch: &D) -> DbResult<Vec<T>>
    where D: Serialize, T: DeserializeOwned {
        let url = self.table_url(table, filters, &[])?;
        let body = serde_json::to_value(patch)?;
        self.request_with_headers(
            Method::PATCH,
            url,
            Some(body),
            Some(Self::return_representation("return=representation")),
        ).await
    }
}
