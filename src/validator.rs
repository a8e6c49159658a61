// src/validator.rs - Centralized form validation
use std::collections::BTreeMap;
use serde::Serialize;
use regex::Regex;
use lazy_static::lazy_static;
use validator::Validate;
use crate::error::{ApiError, ApiResult, FieldErrors};

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 ()-]*$").unwrap();
    static ref REGISTRATION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]*$").unwrap();
}

/// Largest quantity a vehicle record can carry (DECIMAL(10, 2)).
pub const MAX_RECORD_QUANTITY: f64 = 99_999_999.99;

// ==================== VALIDATION RESULT ====================

#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    pub errors: FieldErrors,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn check(&mut self, field: &str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.add_error(field, message);
        }
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn into_result<T: Serialize>(self, input: &T) -> ApiResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ApiError::ValidationError { errors: self.errors, input: serde_json::Value::Null }
                .with_input(input))
        }
    }
}

/// Flatten `validator` derive output into field -> messages.
pub fn collect_field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut out: FieldErrors = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = out.entry(field.to_string()).or_default();
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", err.code));
            messages.push(message);
        }
    }
    out
}

// ==================== FIELD VALIDATORS ====================

pub struct FieldValidator;

impl FieldValidator {
    pub fn not_blank(value: &str, field: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(format!("{} cannot be empty", field))
        } else {
            Ok(())
        }
    }

    pub fn phone(value: &str) -> Result<(), String> {
        if value.is_empty() || PHONE_REGEX.is_match(value) {
            Ok(())
        } else {
            Err("Phone may contain digits, spaces, dashes, brackets and a leading +".to_string())
        }
    }

    pub fn registration_number(value: &str) -> Result<(), String> {
        if REGISTRATION_REGEX.is_match(value.trim()) {
            Ok(())
        } else {
            Err("Registration may contain letters, digits, spaces and dashes".to_string())
        }
    }

    /// Two fractional digits at most, inside the stored DECIMAL range.
    pub fn decimal_quantity(value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err("Quantity must be a number".to_string());
        }
        if value < 0.0 {
            return Err("Quantity cannot be negative".to_string());
        }
        if value > MAX_RECORD_QUANTITY {
            return Err(format!("Quantity cannot exceed {}", MAX_RECORD_QUANTITY));
        }
        let cents = value * 100.0;
        if (cents - cents.round()).abs() > 1e-6 {
            return Err("Quantity allows at most 2 decimal places".to_string());
        }
        Ok(())
    }
}

// ==================== CUSTOM VALIDATION ====================

/// Checks the derive attributes cannot express (cross-field rules, patterns).
pub trait CustomValidate {
    fn custom_validate(&self) -> ValidationResult {
        ValidationResult::new()
    }
}

/// Run derive and custom validation together, so the client sees every
/// failing field at once. Nothing should be written when this errors.
pub fn validate_form<T>(form: &T) -> ApiResult<()>
where
    T: Validate + CustomValidate + Serialize,
{
    let mut result = ValidationResult::new();
    if let Err(e) = form.validate() {
        result.errors = collect_field_errors(&e);
    }
    result.merge(form.custom_validate());
    result.into_result(form)
}
