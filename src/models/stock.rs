// src/models/stock.rs
use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};

use super::{empty_as_none, patch_optional, patch_required, FuelType};
use crate::validator::{CustomValidate, FieldValidator, ValidationResult};

/// SQL form of [`StockItem::is_low_stock`]. Both must stay in agreement.
pub const LOW_STOCK_CONDITION: &str = "quantity <= min_level";

fn default_min_level() -> i64 {
    100
}

// ==================== STOCK ITEM ====================

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub fuel_type: FuelType,
    pub supplier_id: Option<String>,
    pub quantity: i64,
    pub min_level: i64,
    pub last_updated: DateTime<Utc>,
    #[sqlx(default)]
    pub supplier_name: Option<String>,
}

impl StockItem {
    /// At or below the minimum level counts as low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_level
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateStockItemRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,

    #[serde(default)]
    pub fuel_type: FuelType,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub supplier_id: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, max = 2147483647, message = "Quantity must be between 0 and 2147483647"))]
    pub quantity: i64,

    #[serde(default = "default_min_level")]
    #[validate(range(min = 0, max = 2147483647, message = "Minimum level must be between 0 and 2147483647"))]
    pub min_level: i64,
}

impl CustomValidate for CreateStockItemRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check("name", FieldValidator::not_blank(&self.name, "Name"));
        result
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateStockItemRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: Option<String>,

    pub fuel_type: Option<FuelType>,

    pub supplier_id: Option<String>,

    #[validate(range(min = 0, max = 2147483647, message = "Quantity must be between 0 and 2147483647"))]
    pub quantity: Option<i64>,

    #[validate(range(min = 0, max = 2147483647, message = "Minimum level must be between 0 and 2147483647"))]
    pub min_level: Option<i64>,
}

impl CustomValidate for UpdateStockItemRequest {
    fn custom_validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(name) = &self.name {
            result.check("name", FieldValidator::not_blank(name, "Name"));
        }
        result
    }
}

impl UpdateStockItemRequest {
    pub fn apply_to(self, item: &mut StockItem) {
        patch_required(&mut item.name, self.name);
        if let Some(fuel_type) = self.fuel_type {
            item.fuel_type = fuel_type;
        }
        patch_optional(&mut item.supplier_id, self.supplier_id);
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(min_level) = self.min_level {
            item.min_level = min_level;
        }
    }
}
