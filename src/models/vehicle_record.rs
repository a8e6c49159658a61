// src/models/vehicle_record.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Duration, Utc};

use super::{empty_as_none, patch_optional, patch_required, VehicleType};
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

// ==================== VEHICLE ENTRY / EXIT RECORD ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct VehicleRecord {
    pub id: String,
    pub vehicle_number: String,
    pub driver_name: String,
    pub driver_phone: Option<String>,
    pub supplier_id: Option<String>,
    pub vehicle_type: VehicleType,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub product_type: String,
    /// Litres or kg, two fractional digits.
    pub quantity: f64,
    pub remarks: Option<String>,
    pub checked_by: Option<String>,
    pub print_count: i64,
    #[sqlx(default)]
    pub supplier_name: Option<String>,
}

impl VehicleRecord {
    /// Time spent on site, once the vehicle has left.
    pub fn duration(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }

    /// Exit timestamp for an exit marked at `now`. Never earlier than the
    /// entry or than a previously stamped exit.
    pub fn exit_stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = now.max(self.entry_time);
        match self.exit_time {
            Some(previous) => stamp.max(previous),
            None => stamp,
        }
    }

    /// `Vehicle_<number>.pdf`, keeping only `[A-Za-z0-9_-]` from the number.
    pub fn receipt_filename(&self) -> String {
        let safe: String = self
            .vehicle_number
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let safe = if safe.is_empty() { "record".to_string() } else { safe };
        format!("Vehicle_{}.pdf", safe)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateVehicleRecordRequest {
    #[validate(length(min = 1, max = 50, message = "Vehicle number must be between 1 and 50 characters"))]
    pub vehicle_number: String,

    #[validate(length(min = 1, max = 100, message = "Driver name must be between 1 and 100 characters"))]
    pub driver_name: String,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 15, message = "Driver phone cannot exceed 15 characters"))]
    pub driver_phone: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub supplier_id: Option<String>,

    #[serde(default)]
    pub vehicle_type: VehicleType,

    #[validate(length(min = 1, max = 100, message = "Product type must be between 1 and 100 characters"))]
    pub product_type: String,

    pub quantity: f64,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub remarks: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 100, message = "Checked by cannot exceed 100 characters"))]
    pub checked_by: Option<String>,
}

impl CustomValidate for CreateVehicleRecordRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("vehicle_number", FieldValidator::not_blank(&self.vehicle_number, "Vehicle number"));
        result.check("driver_name", FieldValidator::not_blank(&self.driver_name, "Driver name"));
        result.check("product_type", FieldValidator::not_blank(&self.product_type, "Product type"));
        if let Some(phone) = &self.driver_phone {
            result.check("driver_phone", FieldValidator::phone(phone));
        }
        result.check("quantity", FieldValidator::decimal_quantity(self.quantity));
        result
    }
}

/// Entry time, exit time and print count are not editable.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateVehicleRecordRequest {
    #[validate(length(min = 1, max = 50, message = "Vehicle number must be between 1 and 50 characters"))]
    pub vehicle_number: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Driver name must be between 1 and 100 characters"))]
    pub driver_name: Option<String>,

    #[validate(length(max = 15, message = "Driver phone cannot exceed 15 characters"))]
    pub driver_phone: Option<String>,

    pub supplier_id: Option<String>,

    pub vehicle_type: Option<VehicleType>,

    #[validate(length(min = 1, max = 100, message = "Product type must be between 1 and 100 characters"))]
    pub product_type: Option<String>,

    pub quantity: Option<f64>,

    pub remarks: Option<String>,

    #[validate(length(max = 100, message = "Checked by cannot exceed 100 characters"))]
    pub checked_by: Option<String>,
}

impl CustomValidate for UpdateVehicleRecordRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(v) = &self.vehicle_number {
            result.check("vehicle_number", FieldValidator::not_blank(v, "Vehicle number"));
        }
        if let Some(v) = &self.driver_name {
            result.check("driver_name", FieldValidator::not_blank(v, "Driver name"));
        }
        if let Some(v) = &self.product_type {
            result.check("product_type", FieldValidator::not_blank(v, "Product type"));
        }
        if let Some(phone) = &self.driver_phone {
            result.check("driver_phone", FieldValidator::phone(phone.trim()));
        }
        if let Some(quantity) = self.quantity {
            result.check("quantity", FieldValidator::decimal_quantity(quantity));
        }
        result
    }
}

impl UpdateVehicleRecordRequest {
    pub fn apply_to(self, record: &mut VehicleRecord) {
        patch_required(&mut record.vehicle_number, self.vehicle_number);
        patch_required(&mut record.driver_name, self.driver_name);
        patch_optional(&mut record.driver_phone, self.driver_phone);
        patch_optional(&mut record.supplier_id, self.supplier_id);
        if let Some(vehicle_type) = self.vehicle_type {
            record.vehicle_type = vehicle_type;
        }
        patch_required(&mut record.product_type, self.product_type);
        if let Some(quantity) = self.quantity {
            record.quantity = quantity;
        }
        patch_optional(&mut record.remarks, self.remarks);
        patch_optional(&mut record.checked_by, self.checked_by);
    }
}
