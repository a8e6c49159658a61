// src/models/choices.rs
//! Closed choice fields, all generated through `define_choice_enum!`.
//!
//! Each variant has a stored value (what goes into SQLite and JSON) and a
//! display label (what receipts and pages print). They differ only where the
//! business names differ, e.g. `Service` is shown as "Service Vehicle".

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// One selectable value, as listed by `GET /api/v1/choices`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! define_choice_enum {
    (@label $str_val:literal) => { $str_val };
    (@label $str_val:literal $label:literal) => { $label };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $str_val:literal $(as $label:literal)? ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            Serialize, Deserialize, sqlx::Type, strum::EnumIter,
        )]
        #[sqlx(type_name = "TEXT")]
        $vis enum $name {
            $(
                #[serde(rename = $str_val)]
                #[sqlx(rename = $str_val)]
                $variant
            ),+
        }

        impl $name {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str_val ),+
                }
            }

            pub const fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => define_choice_enum!(@label $str_val $($label)?) ),+
                }
            }

            /// Accepts the stored value or the label, case-insensitively.
            pub fn from_str(s: &str) -> Option<Self> {
                let s = s.trim();
                $name::iter().find(|v| {
                    v.as_str().eq_ignore_ascii_case(s) || v.label().eq_ignore_ascii_case(s)
                })
            }

            #[inline]
            pub fn is_valid(s: &str) -> bool {
                Self::from_str(s).is_some()
            }

            pub const fn all_values() -> &'static [&'static str] {
                &[ $( $str_val ),+ ]
            }

            pub fn choices() -> Vec<Choice> {
                $name::iter()
                    .map(|v| Choice { value: v.as_str(), label: v.label() })
                    .collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::from_str(s).ok_or_else(|| format!(
                    "Invalid {}: '{}' (expected one of: {})",
                    stringify!($name), s, Self::all_values().join(", ")
                ))
            }
        }
    };
}

// ==================== SUPPLIERS ====================

define_choice_enum! {
    pub enum CompanyType {
        Refinery => "Refinery",
        Distributor => "Distributor",
        GasSupplier => "Gas Supplier",
        Transporter => "Transporter",
    }
}

impl Default for CompanyType {
    fn default() -> Self {
        CompanyType::Refinery
    }
}

// ==================== EQUIPMENT ====================

define_choice_enum! {
    pub enum EquipmentType {
        Pump => "Pump",
        Compressor => "Compressor",
        StorageTank => "Storage Tank",
        Pipeline => "Pipeline",
    }
}

define_choice_enum! {
    /// Operating state of a piece of equipment
    pub enum EquipmentCondition {
        Good => "Good",
        NeedsRepair => "Needs Repair",
        OutOfOrder => "Out of Order",
    }
}

impl Default for EquipmentCondition {
    fn default() -> Self {
        EquipmentCondition::Good
    }
}

// ==================== STOCK ====================

define_choice_enum! {
    pub enum FuelType {
        Petrol => "Petrol",
        Diesel => "Diesel",
        NaturalGas => "Natural Gas",
        Lpg => "LPG",
    }
}

impl Default for FuelType {
    fn default() -> Self {
        FuelType::Petrol
    }
}

// ==================== GATE RECORDS ====================

define_choice_enum! {
    pub enum VehicleType {
        Tanker => "Tanker",
        Truck => "Truck",
        Service => "Service" as "Service Vehicle",
        Other => "Other",
    }
}

impl Default for VehicleType {
    fn default() -> Self {
        VehicleType::Tanker
    }
}

// ==================== FLEET ====================

define_choice_enum! {
    /// Fuel burned by a company vehicle (differs from stock fuels: CNG, no natural gas)
    pub enum FleetFuelType {
        Petrol => "Petrol",
        Diesel => "Diesel",
        Cng => "CNG",
        Lpg => "LPG",
    }
}

define_choice_enum! {
    pub enum FleetStatus {
        Active => "Active",
        UnderMaintenance => "Under Maintenance",
        Inactive => "Inactive",
    }
}

impl Default for FleetStatus {
    fn default() -> Self {
        FleetStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_type_label() {
        assert_eq!(VehicleType::Service.as_str(), "Service");
        assert_eq!(VehicleType::Service.label(), "Service Vehicle");
        assert_eq!(VehicleType::Tanker.label(), "Tanker");
        assert_eq!(VehicleType::from_str("service vehicle"), Some(VehicleType::Service));
        assert_eq!(VehicleType::from_str("SERVICE"), Some(VehicleType::Service));
    }

    #[test]
    fn test_equipment_condition() {
        assert_eq!(EquipmentCondition::NeedsRepair.as_str(), "Needs Repair");
        assert_eq!(EquipmentCondition::from_str("out of order"), Some(EquipmentCondition::OutOfOrder));
        assert!(!EquipmentCondition::is_valid("broken"));
        assert_eq!(EquipmentCondition::default(), EquipmentCondition::Good);
    }

    #[test]
    fn test_serde_uses_stored_value() {
        let json = serde_json::to_string(&FuelType::NaturalGas).unwrap();
        assert_eq!(json, "\"Natural Gas\"");
        let parsed: CompanyType = serde_json::from_str("\"Gas Supplier\"").unwrap();
        assert_eq!(parsed, CompanyType::GasSupplier);
        assert!(serde_json::from_str::<FleetStatus>("\"Scrapped\"").is_err());
    }

    #[test]
    fn test_choices_listing() {
        let choices = VehicleType::choices();
        assert_eq!(choices.len(), 4);
        assert_eq!(choices[2], Choice { value: "Service", label: "Service Vehicle" });
        assert_eq!(FleetFuelType::all_values(), &["Petrol", "Diesel", "CNG", "LPG"]);
    }

    #[test]
    fn test_from_str_trait_error() {
        let err = "Kerosene".parse::<FuelType>().unwrap_err();
        assert!(err.contains("Petrol, Diesel, Natural Gas, LPG"));
    }
}
