// src/models/project.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::NaiveDate;

use super::patch_required;
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub location: String,
    pub manager: String,
    pub start_date: NaiveDate,
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Location must be between 1 and 255 characters"))]
    pub location: String,

    #[validate(length(min = 1, max = 100, message = "Manager must be between 1 and 100 characters"))]
    pub manager: String,

    pub start_date: NaiveDate,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl CustomValidate for CreateProjectRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("name", FieldValidator::not_blank(&self.name, "Name"));
        result
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Location must be between 1 and 255 characters"))]
    pub location: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Manager must be between 1 and 100 characters"))]
    pub manager: Option<String>,

    pub start_date: Option<NaiveDate>,

    pub active: Option<bool>,
}

impl CustomValidate for UpdateProjectRequest {}

impl UpdateProjectRequest {
    pub fn apply_to(self, project: &mut Project) {
        patch_required(&mut project.name, self.name);
        patch_required(&mut project.location, self.location);
        patch_required(&mut project.manager, self.manager);
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(active) = self.active {
            project.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_active_default() {
        let req: CreateProjectRequest = serde_json::from_str(
            r#"{"name": "Depot expansion", "location": "Karachi", "manager": "R. Khan",
                "start_date": "2024-05-01"}"#,
        ).unwrap();
        assert!(req.active);
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
