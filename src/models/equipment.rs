// src/models/equipment.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};

use super::{empty_as_none, patch_optional, patch_required, EquipmentCondition, EquipmentType};
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

// ==================== EQUIPMENT ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub condition: EquipmentCondition,
    pub location: Option<String>,
    /// Barrels or cubic metres, depending on the unit.
    pub storage_capacity: f64,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateEquipmentRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,

    pub equipment_type: EquipmentType,

    #[serde(default)]
    pub condition: EquipmentCondition,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 150, message = "Location cannot exceed 150 characters"))]
    pub location: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Storage capacity cannot be negative"))]
    pub storage_capacity: f64,
}

impl CustomValidate for CreateEquipmentRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("name", FieldValidator::not_blank(&self.name, "Name"));
        if !self.storage_capacity.is_finite() {
            result.add_error("storage_capacity", "Storage capacity must be a number");
        }
        result
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateEquipmentRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: Option<String>,

    pub equipment_type: Option<EquipmentType>,

    pub condition: Option<EquipmentCondition>,

    #[validate(length(max = 150, message = "Location cannot exceed 150 characters"))]
    pub location: Option<String>,

    #[validate(range(min = 0.0, message = "Storage capacity cannot be negative"))]
    pub storage_capacity: Option<f64>,
}

impl CustomValidate for UpdateEquipmentRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(name) = &self.name {
            result.check("name", FieldValidator::not_blank(name, "Name"));
        }
        result
    }
}

impl UpdateEquipmentRequest {
    pub fn apply_to(self, equipment: &mut Equipment) {
        patch_required(&mut equipment.name, self.name);
        if let Some(equipment_type) = self.equipment_type {
            equipment.equipment_type = equipment_type;
        }
        if let Some(condition) = self.condition {
            equipment.condition = condition;
        }
        patch_optional(&mut equipment.location, self.location);
        if let Some(capacity) = self.storage_capacity {
            equipment.storage_capacity = capacity;
        }
    }
}

// ==================== INSPECTION ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Inspection {
    pub id: String,
    pub equipment_id: String,
    pub inspector: String,
    pub remarks: Option<String>,
    pub passed: bool,
    pub date: DateTime<Utc>,
}

fn default_passed() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateInspectionRequest {
    #[validate(length(min = 1, max = 100, message = "Inspector must be between 1 and 100 characters"))]
    pub inspector: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub remarks: Option<String>,

    #[serde(default = "default_passed")]
    pub passed: bool,
}

impl CustomValidate for CreateInspectionRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("inspector", FieldValidator::not_blank(&self.inspector, "Inspector"));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_form;

    #[test]
    fn test_equipment_defaults() {
        let req: CreateEquipmentRequest = serde_json::from_str(
            r#"{"name": "Transfer pump 2", "equipment_type": "Pump"}"#,
        ).unwrap();
        assert_eq!(req.condition, EquipmentCondition::Good);
        assert_eq!(req.storage_capacity, 0.0);
        assert!(validate_form(&req).is_ok());
    }

    #[test]
    fn test_equipment_type_required() {
        let parsed = serde_json::from_str::<CreateEquipmentRequest>(r#"{"name": "Tank"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let req = CreateEquipmentRequest {
            name: "Tank A".into(),
            equipment_type: EquipmentType::StorageTank,
            condition: EquipmentCondition::Good,
            location: None,
            storage_capacity: -5.0,
        };
        assert!(validate_form(&req).is_err());
    }

    #[test]
    fn test_inspection_passed_defaults_true() {
        let req: CreateInspectionRequest =
            serde_json::from_str(r#"{"inspector": "M. Aslam"}"#).unwrap();
        assert!(req.passed);
        assert!(validate_form(&req).is_ok());
    }
}
