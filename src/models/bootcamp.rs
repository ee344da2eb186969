//! # Bootcamp
//!
//! Payload validation and derived fields for bootcamp records.
//! `averageCost` and `averageRating` are maintained by the course and
//! review models and never taken from a request body.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::errors::{ModelError, ModelResult};
use super::validate::{self, Mode};
use crate::geo::Location;
use crate::query::Filter;
use crate::store::{Collection, FindQuery, StoreResult};

/// Allowed values of `careers`
pub const CAREERS: [&str; 6] = [
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

pub const NAME_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;
pub const PHONE_MAX: usize = 20;

/// Create or update body for a bootcamp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,
}

impl BootcampInput {
    /// Read a sanitized body; unknown and derived keys are dropped
    pub fn from_body(body: Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(body)?)
    }

    pub fn validate(&self, mode: Mode) -> ModelResult<()> {
        validate::text("name", self.name.as_deref(), mode, true, Some(NAME_MAX))?;
        validate::text(
            "description",
            self.description.as_deref(),
            mode,
            true,
            Some(DESCRIPTION_MAX),
        )?;
        validate::http_url("website", self.website.as_deref())?;
        validate::text("phone", self.phone.as_deref(), mode, false, Some(PHONE_MAX))?;
        validate::email("email", self.email.as_deref())?;
        validate::text("address", self.address.as_deref(), mode, true, None)?;

        match &self.careers {
            None if mode == Mode::Create => return Err(ModelError::required("careers")),
            None => {}
            Some(careers) if careers.is_empty() => return Err(ModelError::required("careers")),
            Some(careers) => {
                if let Some(bad) = careers.iter().find(|c| !CAREERS.contains(&c.as_str())) {
                    return Err(ModelError::invalid(
                        "careers",
                        format!("'{}' is not an allowed career", bad),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Fields present in the body, plus `slug` when the name changes
    pub fn into_patch(self) -> ModelResult<Map<String, Value>> {
        let slug = self.name.as_deref().map(slugify);
        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Err(ModelError::MalformedBody("expected an object".to_string()));
        };
        if let Some(slug) = slug {
            fields.insert("slug".to_string(), Value::String(slug));
        }
        Ok(fields)
    }

    /// Full record for a new bootcamp
    pub fn into_document(
        self,
        owner: &str,
        location: Location,
        created_at: DateTime<Utc>,
    ) -> ModelResult<Value> {
        let mut fields = self.into_patch()?;
        for flag in ["housing", "jobAssistance", "jobGuarantee", "acceptGi"] {
            fields.entry(flag).or_insert(Value::Bool(false));
        }
        fields.insert("location".to_string(), serde_json::to_value(location)?);
        fields.insert("createdAt".to_string(), Value::String(timestamp(created_at)));
        fields.insert("user".to_string(), Value::String(owner.to_string()));
        Ok(Value::Object(fields))
    }
}

/// RFC 3339 with millisecond precision; sorts lexicographically
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

static NON_SLUG: OnceLock<Regex> = OnceLock::new();

/// Lowercase, hyphen-separated URL slug of a name
pub fn slugify(name: &str) -> String {
    let non_slug = NON_SLUG.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));
    non_slug
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Whether another bootcamp already uses `name`
pub async fn name_taken<C: Collection>(
    bootcamps: &C,
    name: &str,
    except_id: Option<&str>,
) -> StoreResult<bool> {
    let filter = Filter::new().equals("name", name);
    let matches = bootcamps.find(FindQuery::new(&filter)).await?;
    Ok(matches
        .iter()
        .any(|b| b.get("_id").and_then(Value::as_str) != except_id))
}

/// Delete a bootcamp with its courses and reviews; `false` if it did not exist
pub async fn delete_with_dependents<C: Collection>(
    bootcamps: &C,
    courses: &C,
    reviews: &C,
    id: &str,
) -> StoreResult<bool> {
    if bootcamps.get(id).await?.is_none() {
        return Ok(false);
    }
    let owned = Filter::new().equals("bootcamp", id);
    let removed_courses = courses.delete_many(&owned).await?;
    let removed_reviews = reviews.delete_many(&owned).await?;
    tracing::info!(
        bootcamp = id,
        courses = removed_courses,
        reviews = removed_reviews,
        "cascade delete"
    );
    bootcamps.delete(id).await
}
