// src/repositories/fleet.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::CrudRepository;
use crate::error::ApiResult;
use crate::models::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle};

/// Company-owned vehicles.
pub struct FleetRepository;

#[async_trait]
impl CrudRepository<Vehicle, CreateVehicleRequest, UpdateVehicleRequest> for FleetRepository {
    fn table_name(&self) -> &'static str {
        "vehicles"
    }

    fn entity_name(&self) -> &'static str {
        "Vehicle"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["vehicle_name", "registration_number", "driver_name"]
    }

    fn default_order(&self) -> &'static str {
        "vehicle_name ASC, id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateVehicleRequest) -> ApiResult<Vehicle> {
        let vehicle = Vehicle {
            id: Uuid::new_v4().to_string(),
            vehicle_name: data.vehicle_name.trim().to_string(),
            registration_number: data.registration_number.trim().to_string(),
            driver_name: data.driver_name.trim().to_string(),
            fuel_type: data.fuel_type,
            capacity: data.capacity.trim().to_string(),
            last_service_date: data.last_service_date,
            status: data.status,
            description: data.description,
            date_added: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO vehicles
               (id, vehicle_name, registration_number, driver_name, fuel_type, capacity,
                last_service_date, status, description, date_added)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
            .bind(&vehicle.id)
            .bind(&vehicle.vehicle_name)
            .bind(&vehicle.registration_number)
            .bind(&vehicle.driver_name)
            .bind(vehicle.fuel_type)
            .bind(&vehicle.capacity)
            .bind(vehicle.last_service_date)
            .bind(vehicle.status)
            .bind(&vehicle.description)
            .bind(vehicle.date_added)
            .execute(pool)
            .await?;

        Ok(vehicle)
    }

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateVehicleRequest) -> ApiResult<Vehicle> {
        let mut vehicle = self.find(pool, id).await?;
        data.apply_to(&mut vehicle);

        sqlx::query(
            r#"UPDATE vehicles
               SET vehicle_name = ?, registration_number = ?, driver_name = ?, fuel_type = ?, capacity = ?,
                   last_service_date = ?, status = ?, description = ?
               WHERE id = ?"#,
        )
            .bind(&vehicle.vehicle_name)
            .bind(&vehicle.registration_number)
            .bind(&vehicle.driver_name)
            .bind(vehicle.fuel_type)
            .bind(&vehicle.capacity)
            .bind(vehicle.last_service_date)
            .bind(vehicle.status)
            .bind(&vehicle.description)
            .bind(&vehicle.id)
            .execute(pool)
            .await?;

        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::{FleetFuelType, FleetStatus};
    use chrono::NaiveDate;

    #[actix_rt::test]
    async fn test_fleet_roundtrip_with_service_date() {
        let pool = test_pool().await;
        let created = FleetRepository
            .create(&pool, CreateVehicleRequest {
                vehicle_name: "Bowser 3".into(),
                registration_number: "KHI-9001".into(),
                driver_name: "Aamir".into(),
                fuel_type: FleetFuelType::Diesel,
                capacity: "20000 liters".into(),
                last_service_date: NaiveDate::from_ymd_opt(2024, 2, 10),
                status: FleetStatus::Active,
                description: None,
            })
            .await
            .unwrap();

        let updated = FleetRepository
            .update(&pool, &created.id, UpdateVehicleRequest {
                status: Some(FleetStatus::UnderMaintenance),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.status, FleetStatus::UnderMaintenance);

        let stored = FleetRepository.find(&pool, &created.id).await.unwrap();
        assert_eq!(stored.last_service_date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(stored.status, FleetStatus::UnderMaintenance);
    }
}
