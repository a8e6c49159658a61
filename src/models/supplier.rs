// src/models/supplier.rs
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};
use chrono::{DateTime, Utc};

use super::{empty_as_none, patch_optional, patch_required, CompanyType};
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

// ==================== SUPPLIER ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub company_type: CompanyType,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,

    #[serde(default)]
    pub company_type: CompanyType,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 120, message = "Contact person cannot exceed 120 characters"))]
    pub contact_person: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 30, message = "Phone cannot exceed 30 characters"))]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<String>,
}

impl CustomValidate for CreateSupplierRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("name", FieldValidator::not_blank(&self.name, "Name"));
        if let Some(phone) = &self.phone {
            result.check("phone", FieldValidator::phone(phone));
        }
        result
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: Option<String>,

    pub company_type: Option<CompanyType>,

    #[validate(length(max = 120, message = "Contact person cannot exceed 120 characters"))]
    pub contact_person: Option<String>,

    pub email: Option<String>,

    #[validate(length(max = 30, message = "Phone cannot exceed 30 characters"))]
    pub phone: Option<String>,

    pub address: Option<String>,
}

impl CustomValidate for UpdateSupplierRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(name) = &self.name {
            result.check("name", FieldValidator::not_blank(name, "Name"));
        }
        // Blank clears the field, so only non-blank values are checked
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !email.validate_email() {
                result.add_error("email", "Enter a valid email address");
            }
        }
        if let Some(phone) = &self.phone {
            result.check("phone", FieldValidator::phone(phone.trim()));
        }
        result
    }
}

impl UpdateSupplierRequest {
    pub fn apply_to(self, supplier: &mut Supplier) {
        patch_required(&mut supplier.name, self.name);
        if let Some(company_type) = self.company_type {
            supplier.company_type = company_type;
        }
        patch_optional(&mut supplier.contact_person, self.contact_person);
        patch_optional(&mut supplier.email, self.email);
        patch_optional(&mut supplier.phone, self.phone);
        patch_optional(&mut supplier.address, self.address);
    }
}
