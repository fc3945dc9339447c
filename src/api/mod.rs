use crate::models::{parse_section, parse_section_list, SectionDocument};
use crate::payload::{into_form, MultipartPayload};
use crate::schema::SectionSchema;
use crate::storage::load_token_from_storage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

/// Transport-level failure shared by every endpoint.
#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        let body = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

/// A collection load failed; the caller keeps its last-good list.
#[derive(Clone, Debug)]
pub(crate) struct FetchError(pub ApiError);

/// A create/update failed; the caller keeps the draft so the user can retry.
#[derive(Clone, Debug)]
pub(crate) struct SubmissionError(pub ApiError);

/// A delete failed; the collection is unchanged.
#[derive(Clone, Debug)]
pub(crate) struct DeletionError(pub ApiError);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for DeletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Explicit API configuration.
///
/// The source deployments mixed hard-coded hosts and ad-hoc token reads per
/// call site; here every call goes through one config value so local vs.
/// deployed setups differ only in `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiConfig {
    pub api_base: String,
    /// Base URL that relative media paths resolve against for display.
    pub asset_base: String,
    /// Attached as `Authorization: Bearer ...` on every request when set.
    pub bearer_token: Option<String>,
}

impl ApiConfig {
    pub fn new(api_base: String, asset_base: String, bearer_token: Option<String>) -> Self {
        Self {
            api_base,
            asset_base,
            bearer_token,
        }
    }

    /// Read configuration from `window.ENV` with localhost fallbacks, and the
    /// bearer token (if any) from localStorage.
    pub fn from_environment() -> Self {
        let api_base = read_window_env("API_URL")
            .unwrap_or_else(|| "http://localhost:5050".to_string());
        // Most deployments serve uploads from the API host itself.
        let asset_base = read_window_env("ASSET_URL").unwrap_or_else(|| api_base.clone());

        Self {
            api_base,
            asset_base,
            bearer_token: load_token_from_storage(),
        }
    }
}

fn read_window_env(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    js_sys::Reflect::get(&env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    config: ApiConfig,
}

fn collection_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn document_url(base: &str, path: &str, id: &str) -> String {
    format!("{}{}/{}", base.trim_end_matches('/'), path, id)
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn with_auth_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.config.bearer_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn read_json(
        res: reqwest::Response,
        ctx: &str,
    ) -> Result<serde_json::Value, ApiError> {
        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    /// `GET /collection` — the full (small) section list for one page.
    pub async fn list_sections(
        &self,
        schema: &SectionSchema,
    ) -> Result<Vec<SectionDocument>, FetchError> {
        let client = reqwest::Client::new();
        let url = collection_url(&self.config.api_base, schema.collection_path);
        let req = self.with_auth_headers(client.get(url));

        let res = req
            .send()
            .await
            .map_err(|e| FetchError(ApiError::network(e)))?;
        let data = Self::read_json(res, "Load failed").await.map_err(FetchError)?;

        Ok(parse_section_list(schema, &data))
    }

    /// `GET /collection/:id`.
    #[allow(dead_code)]
    pub async fn get_section(
        &self,
        schema: &SectionSchema,
        id: &str,
    ) -> Result<SectionDocument, FetchError> {
        let client = reqwest::Client::new();
        let url = document_url(&self.config.api_base, schema.collection_path, id);
        let req = self.with_auth_headers(client.get(url));

        let res = req
            .send()
            .await
            .map_err(|e| FetchError(ApiError::network(e)))?;
        let data = Self::read_json(res, "Load failed").await.map_err(FetchError)?;

        parse_section(schema, &data)
            .ok_or_else(|| FetchError(ApiError::parse("Section response is missing an id")))
    }

    /// `POST /collection` with a multipart body.
    pub async fn create_section(
        &self,
        schema: &SectionSchema,
        payload: MultipartPayload,
    ) -> Result<SectionDocument, SubmissionError> {
        let client = reqwest::Client::new();
        let url = collection_url(&self.config.api_base, schema.collection_path);
        let req = self.with_auth_headers(client.post(url)).multipart(into_form(payload));

        let res = req
            .send()
            .await
            .map_err(|e| SubmissionError(ApiError::network(e)))?;
        let data = Self::read_json(res, "Create failed")
            .await
            .map_err(SubmissionError)?;

        parse_section(schema, &data)
            .ok_or_else(|| SubmissionError(ApiError::parse("Create response is missing an id")))
    }

    /// `PUT /collection/:id` with the same multipart shape as create.
    pub async fn update_section(
        &self,
        schema: &SectionSchema,
        id: &str,
        payload: MultipartPayload,
    ) -> Result<SectionDocument, SubmissionError> {
        let client = reqwest::Client::new();
        let url = document_url(&self.config.api_base, schema.collection_path, id);
        let req = self.with_auth_headers(client.put(url)).multipart(into_form(payload));

        let res = req
            .send()
            .await
            .map_err(|e| SubmissionError(ApiError::network(e)))?;
        let data = Self::read_json(res, "Update failed")
            .await
            .map_err(SubmissionError)?;

        parse_section(schema, &data)
            .ok_or_else(|| SubmissionError(ApiError::parse("Update response is missing an id")))
    }

    /// `DELETE /collection/:id` — returns the backend's confirmation message.
    pub async fn delete_section(
        &self,
        schema: &SectionSchema,
        id: &str,
    ) -> Result<String, DeletionError> {
        let client = reqwest::Client::new();
        let url = document_url(&self.config.api_base, schema.collection_path, id);
        let req = self.with_auth_headers(client.delete(url));

        let res = req
            .send()
            .await
            .map_err(|e| DeletionError(ApiError::network(e)))?;

        if res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| "Deleted".to_string());
            Ok(message)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(DeletionError(ApiError::http(status, body, "Delete failed")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_and_document_urls() {
        assert_eq!(
            collection_url("http://localhost:5050", "/api/voyage"),
            "http://localhost:5050/api/voyage"
        );
        assert_eq!(
            collection_url("http://localhost:5050/", "/api/voyage"),
            "http://localhost:5050/api/voyage"
        );
        assert_eq!(
            document_url("http://localhost:5050", "/api/voyage", "abc"),
            "http://localhost:5050/api/voyage/abc"
        );
    }

    #[test]
    fn test_api_error_display_carries_backend_body() {
        let e = ApiError::http(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
            "Update failed",
        );
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert!(e.message.contains("Update failed"));
        assert!(e.message.contains("boom"));
        assert_eq!(SubmissionError(e.clone()).to_string(), e.to_string());
    }

    #[test]
    fn test_api_error_http_falls_back_to_status_text() {
        let e = ApiError::http(
            reqwest::StatusCode::NOT_FOUND,
            "   ".to_string(),
            "Load failed",
        );
        assert!(e.message.contains("404"));
    }

    #[test]
    fn test_api_config_explicit_construction() {
        let cfg = ApiConfig::new(
            "http://localhost:5050".to_string(),
            "http://localhost:5050".to_string(),
            Some("jwt".to_string()),
        );
        assert_eq!(cfg.api_base, "http://localhost:5050");
        assert_eq!(cfg.bearer_token.as_deref(), Some("jwt"));

        let client = ApiClient::new(cfg.clone());
        assert_eq!(client.config(), &cfg);
    }
}
