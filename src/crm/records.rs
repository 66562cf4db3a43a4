use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Resource collections the dashboard reads from the CRM REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Leads,
    Opportunities,
}

impl Entity {
    /// Collection path relative to the API root, with trailing slash.
    pub fn path(self) -> &'static str {
        match self {
            Entity::Leads => "leads/",
            Entity::Opportunities => "opportunities/",
        }
    }
}

/// Text field that may arrive as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

/// Decimal fields are serialized as strings (`"1500.00"`) by the API, but
/// plain numbers are accepted too. Blank strings read as absent.
fn decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Number(n)) => Ok(Some(n)),
        Some(Decimal::Text(t)) if t.trim().is_empty() => Ok(None),
        Some(Decimal::Text(t)) => t
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid decimal '{t}'"))),
    }
}

fn percent<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match decimal(deserializer)? {
        None => Ok(None),
        Some(p) if p.is_finite() && (0.0..=100.0).contains(&p) => Ok(Some(p.round() as u8)),
        Some(p) => Err(de::Error::custom(format!("probability {p} out of range"))),
    }
}

/// Paginated list envelope returned by every collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListEnvelope<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            format!("Lead #{}", self.id)
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "decimal")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "percent")]
    pub probability: Option<u8>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
}

/// One row of the deals-by-stage aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    pub count: u64,
    #[serde(default, deserialize_with = "decimal")]
    pub total_amount: Option<f64>,
}
