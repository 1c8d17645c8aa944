//! Request body decoding for lead submissions.
//!
//! Browsers post either JSON or `application/x-www-form-urlencoded`; both end up
//! as a loose field map so the presence checks behave the same for each.

use crate::domain::model::NewLead;
use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::is_valid_email;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const REQUIRED_FIELDS: [&str; 4] = ["full_name", "email", "zip_code", "monthly_bill"];

pub const MISSING_FIELDS_MESSAGE: &str = "All fields are required";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email format";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(Infinity|([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern compiles")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadForm {
    fields: Map<String, Value>,
}

impl LeadForm {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Decodes a body according to its content type. Unknown content types
    /// yield an empty form, which then fails the required-field check.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Result<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match mime.as_deref() {
            Some("application/json") => Self::from_json_slice(body),
            Some("application/x-www-form-urlencoded") => Ok(Self::from_urlencoded(body)),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Rejecting malformed JSON body: {}", e);
            IntakeError::validation(INVALID_BODY_MESSAGE)
        })?;

        // 非物件的 JSON（陣列、字串）視為沒有任何欄位
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        let fields = url::form_urlencoded::parse(body)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Applies the submission rules: every field present and truthy, email
    /// shaped like `local@domain.tld`, bill coerced to a float without range checks.
    pub fn into_new_lead(self) -> Result<NewLead> {
        let present = REQUIRED_FIELDS
            .iter()
            .all(|name| self.field(name).is_some_and(is_truthy));
        if !present {
            return Err(IntakeError::validation(MISSING_FIELDS_MESSAGE));
        }

        let text = |name: &str| self.field(name).map(to_text).unwrap_or_default();

        let email = text("email");
        if !is_valid_email(&email) {
            return Err(IntakeError::validation(INVALID_EMAIL_MESSAGE));
        }

        let monthly_bill = match self.field("monthly_bill") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(other) => parse_float(&to_text(other)),
            None => f64::NAN,
        };

        Ok(NewLead {
            full_name: text("full_name"),
            email,
            zip_code: text("zip_code"),
            monthly_bill,
        })
    }
}

/// JavaScript truthiness over JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses the longest leading decimal literal, ignoring leading whitespace
/// and trailing garbage (`"120.50 USD"` → `120.5`). `NaN` when none exists.
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    FLOAT_PREFIX
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
