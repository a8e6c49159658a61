// src/models/contact.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};

use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

// ==================== CONTACT MESSAGE ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 122, message = "Name must be between 1 and 122 characters"))]
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 15, message = "Phone must be between 1 and 15 characters"))]
    pub phone: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
}

impl CustomValidate for CreateContactRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("name", FieldValidator::not_blank(&self.name, "Name"));
        result.check("subject", FieldValidator::not_blank(&self.subject, "Subject"));
        result.check("message", FieldValidator::not_blank(&self.message, "Message"));
        result.check("phone", FieldValidator::phone(self.phone.trim()));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_form;

    #[test]
    fn test_contact_form() {
        let mut req = CreateContactRequest {
            name: "Sana".into(),
            email: "sana@example.com".into(),
            phone: "0300-1234567".into(),
            subject: "Bulk diesel".into(),
            message: "Please send a quote.".into(),
        };
        assert!(validate_form(&req).is_ok());

        req.email = "nope".into();
        req.message = "   ".into();
        match validate_form(&req) {
            Err(crate::error::ApiError::ValidationError { errors, .. }) => {
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("message"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
