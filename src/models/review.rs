//! # Review
//!
//! One review per user per bootcamp. Every write keeps the bootcamp's
//! `averageRating` in step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::bootcamp::timestamp;
use super::errors::{ModelError, ModelResult};
use super::validate::{self, Mode};
use crate::query::Filter;
use crate::store::{Collection, FindQuery, StoreResult};

pub const TITLE_MAX: usize = 100;
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Create or update body for a review
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

impl ReviewInput {
    pub fn from_body(body: Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(body)?)
    }

    pub fn validate(&self, mode: Mode) -> ModelResult<()> {
        validate::text("title", self.title.as_deref(), mode, true, Some(TITLE_MAX))?;
        validate::text("text", self.text.as_deref(), mode, true, None)?;
        match self.rating {
            None if mode == Mode::Create => Err(ModelError::required("rating")),
            Some(r) if !RATING_RANGE.contains(&r) => Err(ModelError::invalid(
                "rating",
                "must be between 1 and 10",
            )),
            _ => Ok(()),
        }
    }

    pub fn into_patch(self) -> ModelResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(ModelError::MalformedBody("expected an object".to_string())),
        }
    }

    pub fn into_document(
        self,
        bootcamp_id: &str,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> ModelResult<Value> {
        let mut fields = self.into_patch()?;
        fields.insert("bootcamp".to_string(), json!(bootcamp_id));
        fields.insert("user".to_string(), json!(author));
        fields.insert("createdAt".to_string(), json!(timestamp(created_at)));
        Ok(Value::Object(fields))
    }
}

/// Whether `user_id` has already reviewed `bootcamp_id`
pub async fn already_reviewed<C: Collection>(
    reviews: &C,
    bootcamp_id: &str,
    user_id: &str,
) -> StoreResult<bool> {
    let filter = Filter::new()
        .equals("bootcamp", bootcamp_id)
        .equals("user", user_id);
    Ok(reviews.count(&filter).await? > 0)
}

pub fn average_rating(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

/// Recompute and store `averageRating` on a bootcamp; removed when it has no reviews
pub async fn refresh_average_rating<C: Collection>(
    reviews: &C,
    bootcamps: &C,
    bootcamp_id: &str,
) -> StoreResult<()> {
    let filter = Filter::new().equals("bootcamp", bootcamp_id);
    let ratings: Vec<f64> = reviews
        .find(FindQuery::new(&filter))
        .await?
        .iter()
        .filter_map(|r| r.get("rating").and_then(Value::as_f64))
        .collect();

    let average = average_rating(&ratings);
    debug!(bootcamp = bootcamp_id, ?average, "refreshed average rating");

    let value = average.map_or(Value::Null, |a| json!(a));
    bootcamps
        .update(bootcamp_id, json!({ "averageRating": value }))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCollection;

    #[test]
    fn test_rating_bounds() {
        let ok = ReviewInput {
            title: Some("Great".into()),
            text: Some("Learned a lot".into()),
            rating: Some(10),
        };
        assert!(ok.validate(Mode::Create).is_ok());

        for bad in [0, 11] {
            let input = ReviewInput {
                rating: Some(bad),
                ..Default::default()
            };
            assert!(input.validate(Mode::Update).is_err());
        }
    }

    #[test]
    fn test_title_length() {
        let input = ReviewInput {
            title: Some("t".repeat(TITLE_MAX + 1)),
            ..Default::default()
        };
        assert!(input.validate(Mode::Update).is_err());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[8.0, 9.0, 10.0]), Some(9.0));
    }

    #[tokio::test]
    async fn test_refresh_and_duplicate_check() {
        let camps = MemoryCollection::new("bootcamps");
        let reviews = MemoryCollection::new("reviews");
        camps.insert(json!({"_id": "b1"})).await.unwrap();
        reviews
            .insert(json!({"bootcamp": "b1", "user": "u1", "rating": 7}))
            .await
            .unwrap();
        reviews
            .insert(json!({"bootcamp": "b1", "user": "u2", "rating": 10}))
            .await
            .unwrap();

        refresh_average_rating(&reviews, &camps, "b1").await.unwrap();
        assert_eq!(camps.get("b1").await.unwrap().unwrap()["averageRating"], 8.5);

        assert!(already_reviewed(&reviews, "b1", "u1").await.unwrap());
        assert!(!already_reviewed(&reviews, "b1", "u3").await.unwrap());
    }
}
