//! # Course
//!
//! Courses belong to a bootcamp. Every write keeps the bootcamp's
//! `averageCost` in step with its courses' tuition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::bootcamp::timestamp;
use super::errors::{ModelError, ModelResult};
use super::validate::{self, Mode};
use crate::query::Filter;
use crate::store::{Collection, FindQuery, StoreResult};

/// Skill level a course expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

/// Create or update body for a course
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuition: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_skill: Option<MinimumSkill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
}

impl CourseInput {
    pub fn from_body(body: Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(body)?)
    }

    pub fn validate(&self, mode: Mode) -> ModelResult<()> {
        validate::text("title", self.title.as_deref(), mode, true, None)?;
        validate::text("description", self.description.as_deref(), mode, true, None)?;
        validate::text("weeks", self.weeks.as_deref(), mode, true, None)?;

        match self.tuition {
            None if mode == Mode::Create => return Err(ModelError::required("tuition")),
            Some(t) if !t.is_finite() || t < 0.0 => {
                return Err(ModelError::invalid("tuition", "must be a non-negative number"))
            }
            _ => {}
        }
        if mode == Mode::Create && self.minimum_skill.is_none() {
            return Err(ModelError::required("minimumSkill"));
        }
        Ok(())
    }

    pub fn into_patch(self) -> ModelResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(ModelError::MalformedBody("expected an object".to_string())),
        }
    }

    /// Full record for a new course under `bootcamp_id`
    pub fn into_document(
        self,
        bootcamp_id: &str,
        owner: &str,
        created_at: DateTime<Utc>,
    ) -> ModelResult<Value> {
        let mut fields = self.into_patch()?;
        fields
            .entry("scholarshipAvailable")
            .or_insert(Value::Bool(false));
        fields.insert("bootcamp".to_string(), json!(bootcamp_id));
        fields.insert("user".to_string(), json!(owner));
        fields.insert("createdAt".to_string(), json!(timestamp(created_at)));
        Ok(Value::Object(fields))
    }
}

/// Mean tuition rounded up to the next multiple of ten
pub fn average_cost(tuitions: &[f64]) -> Option<u64> {
    if tuitions.is_empty() {
        return None;
    }
    let mean = tuitions.iter().sum::<f64>() / tuitions.len() as f64;
    Some(((mean / 10.0).ceil() * 10.0) as u64)
}

/// Recompute and store `averageCost` on a bootcamp; removed when it has no courses
pub async fn refresh_average_cost<C: Collection>(
    courses: &C,
    bootcamps: &C,
    bootcamp_id: &str,
) -> StoreResult<()> {
    let filter = Filter::new().equals("bootcamp", bootcamp_id);
    let tuitions: Vec<f64> = courses
        .find(FindQuery::new(&filter))
        .await?
        .iter()
        .filter_map(|c| c.get("tuition").and_then(Value::as_f64))
        .collect();

    let average = average_cost(&tuitions);
    debug!(bootcamp = bootcamp_id, ?average, "refreshed average cost");

    let value = average.map_or(Value::Null, |a| json!(a));
    bootcamps
        .update(bootcamp_id, json!({ "averageCost": value }))
        .await?;
    Ok(())
}
