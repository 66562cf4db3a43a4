use crate::crm::records::{Deal, Entity, Lead, ListEnvelope, StageCount};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Largest page requested when pulling a whole collection.
pub const BULK_PAGE_SIZE: u32 = 100;
/// Upper bound on pages followed through `next` links.
const MAX_PAGES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// The CRM record reads the dashboard depends on.
pub trait RecordApi: Send + Sync {
    /// Leads created at or after `since`, filtered by the server.
    fn leads_since(&self, since: DateTime<Utc>) -> Result<Vec<Lead>, ApiError>;
    fn deals(&self) -> Result<Vec<Deal>, ApiError>;
    fn deals_by_stage(&self) -> Result<Vec<StageCount>, ApiError>;
}

pub struct HttpRecordApi {
    client: Client,
    base: Url,
}

impl HttpRecordApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("crm-dashboard")
            .build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    fn send(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            let message = extract_error_message(&body, reason);
            tracing::warn!(status = status.as_u16(), %message, "crm api request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn get_typed<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let value = self.send(self.client.get(url))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Follow `next` links from `first`, collecting every result.
    fn collect_pages<T: DeserializeOwned>(&self, first: Url) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut url = Some(first);
        let mut pages = 0;
        while let Some(current) = url.take() {
            let page: ListEnvelope<T> = self.get_typed(current)?;
            items.extend(page.results);
            pages += 1;
            if pages >= MAX_PAGES {
                tracing::warn!(pages, "stopped following pagination links");
                break;
            }
            url = match page.next {
                Some(next) => Some(Url::parse(&next)?),
                None => None,
            };
        }
        Ok(items)
    }
}

impl RecordApi for HttpRecordApi {
    fn leads_since(&self, since: DateTime<Utc>) -> Result<Vec<Lead>, ApiError> {
        let mut url = self.endpoint(Entity::Leads.path())?;
        url.query_pairs_mut()
            .append_pair(
                "created_at__gte",
                &since.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .append_pair("page_size", &BULK_PAGE_SIZE.to_string());
        self.collect_pages(url)
    }

    fn deals(&self) -> Result<Vec<Deal>, ApiError> {
        let mut url = self.endpoint(Entity::Opportunities.path())?;
        url.query_pairs_mut()
            .append_pair("page_size", &BULK_PAGE_SIZE.to_string());
        self.collect_pages(url)
    }

    fn deals_by_stage(&self) -> Result<Vec<StageCount>, ApiError> {
        let url = self.endpoint(&format!("{}by_stage/", Entity::Opportunities.path()))?;
        self.get_typed(url)
    }
}

/// Pull a human readable message out of an error response body.
///
/// Tries, in order: `detail`, `message`, `error` (string or `{message}`),
/// the first `non_field_errors` entry, the first field error rendered as
/// `field: message`, a bare JSON string, the raw body text, and finally
/// `fallback`.
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return if trimmed.is_empty() || trimmed.starts_with('<') {
            fallback.to_string()
        } else {
            trimmed.chars().take(200).collect()
        };
    };
    if let Value::String(s) = &value {
        return s.clone();
    }
    let Some(obj) = value.as_object() else {
        return fallback.to_string();
    };
    for key in ["detail", "message"] {
        if let Some(s) = obj.get(key).and_then(Value::as_str) {
            return s.to_string();
        }
    }
    match obj.get("error") {
        Some(Value::String(s)) => return s.clone(),
        Some(Value::Object(inner)) => {
            if let Some(s) = inner.get("message").and_then(Value::as_str) {
                return s.to_string();
            }
        }
        _ => {}
    }
    if let Some(s) = obj.get("non_field_errors").and_then(first_text) {
        return s;
    }
    for (field, errors) in obj {
        if let Some(msg) = first_text(errors) {
            return format!("{field}: {msg}");
        }
    }
    fallback.to_string()
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_detail_first() {
        assert_eq!(
            extract_error_message(r#"{"detail":"Not found.","message":"x"}"#, "Not Found"),
            "Not found."
        );
    }

    #[test]
    fn extracts_nested_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"quota"}}"#, "Bad Request"),
            "quota"
        );
    }

    #[test]
    fn extracts_field_errors() {
        assert_eq!(
            extract_error_message(r#"{"non_field_errors":["Duplicate lead"]}"#, "Bad Request"),
            "Duplicate lead"
        );
        assert_eq!(
            extract_error_message(r#"{"email":["Enter a valid email address."]}"#, "Bad Request"),
            "email: Enter a valid email address."
        );
    }

    #[test]
    fn falls_back_to_text_then_reason() {
        assert_eq!(extract_error_message("gateway timeout", "x"), "gateway timeout");
        assert_eq!(
            extract_error_message("<html>oops</html>", "Bad Gateway"),
            "Bad Gateway"
        );
        assert_eq!(extract_error_message("", "Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message("[1,2]", "Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let api = HttpRecordApi::new("http://localhost:8000/api/crm", Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            api.endpoint(Entity::Leads.path()).unwrap().as_str(),
            "http://localhost:8000/api/crm/leads/"
        );
    }
}
