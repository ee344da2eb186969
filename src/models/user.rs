//! # User
//!
//! Account payloads. The stored `password` field holds an Argon2 hash
//! and is stripped from every response by [`public_view`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::bootcamp::timestamp;
use super::errors::{ModelError, ModelResult};
use super::validate::{self, Mode};
use crate::auth::crypto::{hash_password, validate_password};
use crate::auth::{AuthResult, Role};
use crate::query::Filter;
use crate::store::{Collection, FindQuery, StoreResult};

/// Fields never returned to clients, filtered on or sorted by
pub const HIDDEN_FIELDS: [&str; 1] = ["password"];

/// Registration, admin create and admin update body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserInput {
    pub fn from_body(body: Value) -> ModelResult<Self> {
        Ok(serde_json::from_value(body)?)
    }

    /// `allow_admin` is only set on admin routes
    pub fn validate(&self, mode: Mode, allow_admin: bool) -> ModelResult<()> {
        validate::text("name", self.name.as_deref(), mode, true, None)?;
        validate::text("email", self.email.as_deref(), mode, true, None)?;
        validate::email("email", self.email.as_deref())?;

        match self.password.as_deref() {
            None if mode == Mode::Create => return Err(ModelError::required("password")),
            Some(p) => {
                validate_password(p).map_err(|e| ModelError::invalid("password", e.to_string()))?
            }
            None => {}
        }

        if self.role == Some(Role::Admin) && !allow_admin {
            return Err(ModelError::invalid("role", "must be 'user' or 'publisher'"));
        }
        Ok(())
    }

    /// Body as a patch with the password replaced by its hash
    pub fn into_patch(mut self) -> AuthResult<Map<String, Value>> {
        let hash = self.password.take().map(|p| hash_password(&p)).transpose()?;
        let mut fields = Map::new();
        if let Some(name) = self.name {
            fields.insert("name".to_string(), json!(name));
        }
        if let Some(email) = self.email {
            fields.insert("email".to_string(), json!(email.to_lowercase()));
        }
        if let Some(role) = self.role {
            fields.insert("role".to_string(), json!(role));
        }
        if let Some(hash) = hash {
            fields.insert("password".to_string(), json!(hash));
        }
        Ok(fields)
    }

    pub fn into_document(self, created_at: DateTime<Utc>) -> AuthResult<Value> {
        let mut fields = self.into_patch()?;
        fields.entry("role").or_insert(json!(Role::User));
        fields.insert("createdAt".to_string(), json!(timestamp(created_at)));
        Ok(Value::Object(fields))
    }
}

/// Login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginInput {
    pub fn from_body(body: Value) -> ModelResult<Self> {
        let input: Self = serde_json::from_value(body)?;
        if input.email.is_empty() || input.password.is_empty() {
            return Err(ModelError::invalid(
                "email",
                "Please provide an email and password",
            ));
        }
        Ok(input)
    }
}

/// Record with hidden fields removed
pub fn public_view(mut record: Value) -> Value {
    if let Value::Object(fields) = &mut record {
        for hidden in HIDDEN_FIELDS {
            fields.remove(hidden);
        }
    }
    record
}

/// Role stored on a user record; unknown or missing reads as `user`
pub fn role_of(record: &Value) -> Role {
    record
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::parse)
        .unwrap_or_default()
}

/// Find a user by (case-insensitive) email
pub async fn find_by_email<C: Collection>(users: &C, email: &str) -> StoreResult<Option<Value>> {
    let filter = Filter::new().equals("email", email.to_lowercase());
    let found = users
        .find(FindQuery::new(&filter).limit(1))
        .await?;
    Ok(found.into_iter().next())
}

/// Hash any plaintext `password` in seed records
pub fn hash_seed_passwords(users: Vec<Value>) -> AuthResult<Vec<Value>> {
    users
        .into_iter()
        .map(|mut user| -> AuthResult<Value> {
            if let Some(Value::String(password)) = user.get_mut("password") {
                if !password.starts_with("$argon2") {
                    *password = hash_password(password)?;
                }
            }
            Ok(user)
        })
        .collect()
}
