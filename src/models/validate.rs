//! Field checks shared by the resource models.

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{ModelError, ModelResult};

static EMAIL: OnceLock<Regex> = OnceLock::new();
static HTTP_URL: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn url_pattern() -> &'static Regex {
    HTTP_URL.get_or_init(|| {
        Regex::new(r"^https?://[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_+.~#?&/=]*$")
            .expect("valid url regex")
    })
}

/// Whether a payload is creating a record or patching one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields must be present
    Create,
    /// Only fields that are present are checked
    Update,
}

/// Check a text field: presence per `mode`, non-blank, at most `max` chars
pub(crate) fn text(
    field: &str,
    value: Option<&str>,
    mode: Mode,
    required: bool,
    max: Option<usize>,
) -> ModelResult<()> {
    let Some(value) = value else {
        return if required && mode == Mode::Create {
            Err(ModelError::required(field))
        } else {
            Ok(())
        };
    };

    if required && value.trim().is_empty() {
        return Err(ModelError::required(field));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(ModelError::invalid(
                field,
                format!("can not be more than {} characters", max),
            ));
        }
    }
    Ok(())
}

pub(crate) fn email(field: &str, value: Option<&str>) -> ModelResult<()> {
    match value {
        Some(v) if !email_pattern().is_match(v) => {
            Err(ModelError::invalid(field, "must be a valid email"))
        }
        _ => Ok(()),
    }
}

pub(crate) fn http_url(field: &str, value: Option<&str>) -> ModelResult<()> {
    match value {
        Some(v) if !url_pattern().is_match(v) => Err(ModelError::invalid(
            field,
            "must be a valid URL with HTTP or HTTPS",
        )),
        _ => Ok(()),
    }
}
