// src/models/fleet.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, NaiveDate, Utc};

use super::{empty_as_none, patch_optional, patch_required, FleetFuelType, FleetStatus};
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

// ==================== COMPANY VEHICLE ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Vehicle {
    pub id: String,
    pub vehicle_name: String,
    pub registration_number: String,
    pub driver_name: String,
    pub fuel_type: FleetFuelType,
    /// Free text, e.g. "5000 liters".
    pub capacity: String,
    pub last_service_date: Option<NaiveDate>,
    pub status: FleetStatus,
    pub description: Option<String>,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "Vehicle name must be between 1 and 100 characters"))]
    pub vehicle_name: String,

    #[validate(length(min = 1, max = 50, message = "Registration number must be between 1 and 50 characters"))]
    pub registration_number: String,

    #[validate(length(min = 1, max = 100, message = "Driver name must be between 1 and 100 characters"))]
    pub driver_name: String,

    pub fuel_type: FleetFuelType,

    #[validate(length(min = 1, max = 50, message = "Capacity must be between 1 and 50 characters"))]
    pub capacity: String,

    #[serde(default)]
    pub last_service_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: FleetStatus,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
}

impl CustomValidate for CreateVehicleRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("vehicle_name", FieldValidator::not_blank(&self.vehicle_name, "Vehicle name"));
        result.check("driver_name", FieldValidator::not_blank(&self.driver_name, "Driver name"));
        result.check("registration_number", FieldValidator::registration_number(&self.registration_number));
        result
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100, message = "Vehicle name must be between 1 and 100 characters"))]
    pub vehicle_name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Registration number must be between 1 and 50 characters"))]
    pub registration_number: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Driver name must be between 1 and 100 characters"))]
    pub driver_name: Option<String>,

    pub fuel_type: Option<FleetFuelType>,

    #[validate(length(min = 1, max = 50, message = "Capacity must be between 1 and 50 characters"))]
    pub capacity: Option<String>,

    pub last_service_date: Option<NaiveDate>,

    pub status: Option<FleetStatus>,

    pub description: Option<String>,
}

impl CustomValidate for UpdateVehicleRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(v) = &self.vehicle_name {
            result.check("vehicle_name", FieldValidator::not_blank(v, "Vehicle name"));
        }
        if let Some(v) = &self.driver_name {
            result.check("driver_name", FieldValidator::not_blank(v, "Driver name"));
        }
        if let Some(v) = &self.registration_number {
            result.check("registration_number", FieldValidator::registration_number(v));
        }
        result
    }
}

impl UpdateVehicleRequest {
    pub fn apply_to(self, vehicle: &mut Vehicle) {
        patch_required(&mut vehicle.vehicle_name, self.vehicle_name);
        patch_required(&mut vehicle.registration_number, self.registration_number);
        patch_required(&mut vehicle.driver_name, self.driver_name);
        if let Some(fuel_type) = self.fuel_type {
            vehicle.fuel_type = fuel_type;
        }
        patch_required(&mut vehicle.capacity, self.capacity);
        if self.last_service_date.is_some() {
            vehicle.last_service_date = self.last_service_date;
        }
        if let Some(status) = self.status {
            vehicle.status = status;
        }
        patch_optional(&mut vehicle.description, self.description);
    }
}
