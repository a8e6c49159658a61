// src/repositories/equipment.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::CrudRepository;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateEquipmentRequest, CreateInspectionRequest, Equipment, Inspection, UpdateEquipmentRequest,
};

pub struct EquipmentRepository;

#[async_trait]
impl CrudRepository<Equipment, CreateEquipmentRequest, UpdateEquipmentRequest> for EquipmentRepository {
    fn table_name(&self) -> &'static str {
        "equipment"
    }

    fn entity_name(&self) -> &'static str {
        "Equipment"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["name", "location"]
    }

    fn default_order(&self) -> &'static str {
        "name ASC, id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateEquipmentRequest) -> ApiResult<Equipment> {
        let equipment = Equipment {
            id: Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            equipment_type: data.equipment_type,
            condition: data.condition,
            location: data.location,
            storage_capacity: data.storage_capacity,
            date_added: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO equipment (id, name, equipment_type, condition, location, storage_capacity, date_added)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
            .bind(&equipment.id)
            .bind(&equipment.name)
            .bind(equipment.equipment_type)
            .bind(equipment.condition)
            .bind(&equipment.location)
            .bind(equipment.storage_capacity)
            .bind(equipment.date_added)
            .execute(pool)
            .await?;

        Ok(equipment)
    }

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateEquipmentRequest) -> ApiResult<Equipment> {
        let mut equipment = self.find(pool, id).await?;
        data.apply_to(&mut equipment);

        sqlx::query(
            r#"UPDATE equipment
               SET name = ?, equipment_type = ?, condition = ?, location = ?, storage_capacity = ?
               WHERE id = ?"#,
        )
            .bind(&equipment.name)
            .bind(equipment.equipment_type)
            .bind(equipment.condition)
            .bind(&equipment.location)
            .bind(equipment.storage_capacity)
            .bind(&equipment.id)
            .execute(pool)
            .await?;

        Ok(equipment)
    }
}

// ==================== INSPECTIONS ====================

/// Inspections only exist under a piece of equipment.
pub struct InspectionRepository;

impl InspectionRepository {
    pub async fn list_for_equipment(&self, pool: &SqlitePool, equipment_id: &str) -> ApiResult<Vec<Inspection>> {
        EquipmentRepository.find(pool, equipment_id).await?;

        let inspections = sqlx::query_as::<_, Inspection>(
            "SELECT * FROM inspections WHERE equipment_id = ? ORDER BY date DESC, id ASC",
        )
            .bind(equipment_id)
            .fetch_all(pool)
            .await?;

        Ok(inspections)
    }

    pub async fn create(
        &self,
        pool: &SqlitePool,
        equipment_id: &str,
        data: CreateInspectionRequest,
    ) -> ApiResult<Inspection> {
        EquipmentRepository.find(pool, equipment_id).await?;

        let inspection = Inspection {
            id: Uuid::new_v4().to_string(),
            equipment_id: equipment_id.to_string(),
            inspector: data.inspector.trim().to_string(),
            remarks: data.remarks,
            passed: data.passed,
            date: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO inspections (id, equipment_id, inspector, remarks, passed, date)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
            .bind(&inspection.id)
            .bind(&inspection.equipment_id)
            .bind(&inspection.inspector)
            .bind(&inspection.remarks)
            .bind(inspection.passed)
            .bind(inspection.date)
            .execute(pool)
            .await?;

        Ok(inspection)
    }

    pub async fn delete(&self, pool: &SqlitePool, equipment_id: &str, inspection_id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = ? AND equipment_id = ?")
            .bind(inspection_id)
            .bind(equipment_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Inspection"));
        }

        Ok(())
    }
}
