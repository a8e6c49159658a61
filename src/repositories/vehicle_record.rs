// src/repositories/vehicle_record.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_supplier_exists, CrudRepository};
use crate::error::{ApiError, ApiResult};
use crate::models::{CreateVehicleRecordRequest, UpdateVehicleRecordRequest, VehicleRecord};

pub struct VehicleRecordRepository;

#[async_trait]
impl CrudRepository<VehicleRecord, CreateVehicleRecordRequest, UpdateVehicleRecordRequest>
    for VehicleRecordRepository
{
    fn table_name(&self) -> &'static str {
        "vehicle_records"
    }

    fn entity_name(&self) -> &'static str {
        "Vehicle record"
    }

    fn select_base(&self) -> String {
        "SELECT vr.*, s.name AS supplier_name FROM vehicle_records vr \
         LEFT JOIN suppliers s ON s.id = vr.supplier_id"
            .to_string()
    }

    fn id_column(&self) -> &'static str {
        "vr.id"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["vr.vehicle_number", "vr.driver_name", "vr.product_type", "s.name"]
    }

    fn default_order(&self) -> &'static str {
        "vr.entry_time DESC, vr.id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateVehicleRecordRequest) -> ApiResult<VehicleRecord> {
        ensure_supplier_exists(pool, data.supplier_id.as_deref()).await?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"INSERT INTO vehicle_records
               (id, vehicle_number, driver_name, driver_phone, supplier_id, vehicle_type, entry_time,
                exit_time, product_type, quantity, remarks, checked_by, print_count)
               VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, 0)"#,
        )
            .bind(&id)
            .bind(data.vehicle_number.trim())
            .bind(data.driver_name.trim())
            .bind(&data.driver_phone)
            .bind(&data.supplier_id)
            .bind(data.vehicle_type)
            .bind(Utc::now())
            .bind(data.product_type.trim())
            .bind(data.quantity)
            .bind(&data.remarks)
            .bind(&data.checked_by)
            .execute(pool)
            .await?;

        self.find(pool, &id).await
    }

    async fn update(
        &self,
        pool: &SqlitePool,
        id: &str,
        data: UpdateVehicleRecordRequest,
    ) -> ApiResult<VehicleRecord> {
        let mut record = self.find(pool, id).await?;
        data.apply_to(&mut record);
        ensure_supplier_exists(pool, record.supplier_id.as_deref()).await?;

        sqlx::query(
            r#"UPDATE vehicle_records
               SET vehicle_number = ?, driver_name = ?, driver_phone = ?, supplier_id = ?, vehicle_type = ?,
                   product_type = ?, quantity = ?, remarks = ?, checked_by = ?
               WHERE id = ?"#,
        )
            .bind(&record.vehicle_number)
            .bind(&record.driver_name)
            .bind(&record.driver_phone)
            .bind(&record.supplier_id)
            .bind(record.vehicle_type)
            .bind(&record.product_type)
            .bind(record.quantity)
            .bind(&record.remarks)
            .bind(&record.checked_by)
            .bind(&record.id)
            .execute(pool)
            .await?;

        self.find(pool, id).await
    }
}

impl VehicleRecordRepository {
    /// Stamp the exit time. Concurrent calls are last-writer-wins.
    pub async fn mark_exit(&self, pool: &SqlitePool, id: &str) -> ApiResult<VehicleRecord> {
        let record = self.find(pool, id).await?;
        let exit_time = record.exit_stamp(Utc::now());

        sqlx::query("UPDATE vehicle_records SET exit_time = ? WHERE id = ?")
            .bind(exit_time)
            .bind(id)
            .execute(pool)
            .await?;

        self.find(pool, id).await
    }

    /// One atomic increment per produced receipt.
    pub async fn increment_print_count(&self, pool: &SqlitePool, id: &str) -> ApiResult<()> {
        let result = sqlx::query("UPDATE vehicle_records SET print_count = print_count + 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::vehicle_record_not_found(id));
        }

        Ok(())
    }

    /// Every record, newest entry first.
    pub async fn list_for_report(&self, pool: &SqlitePool) -> ApiResult<Vec<VehicleRecord>> {
        let sql = format!("{} ORDER BY {}", self.select_base(), self.default_order());
        let records = sqlx::query_as::<_, VehicleRecord>(&sql)
            .fetch_all(pool)
            .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::VehicleType;

    fn new_record(number: &str) -> CreateVehicleRecordRequest {
        CreateVehicleRecordRequest {
            vehicle_number: number.into(),
            driver_name: "Driver".into(),
            driver_phone: None,
            supplier_id: None,
            vehicle_type: VehicleType::Truck,
            product_type: "Diesel".into(),
            quantity: 2500.25,
            remarks: None,
            checked_by: None,
        }
    }

    #[actix_rt::test]
    async fn test_create_sets_entry_and_zero_prints() {
        let pool = test_pool().await;
        let record = VehicleRecordRepository.create(&pool, new_record("ABC-1")).await.unwrap();
        assert_eq!(record.print_count, 0);
        assert!(record.exit_time.is_none());
        assert_eq!(record.quantity, 2500.25);
    }

    #[actix_rt::test]
    async fn test_mark_exit_twice_moves_forward() {
        let pool = test_pool().await;
        let record = VehicleRecordRepository.create(&pool, new_record("ABC-2")).await.unwrap();

        let first = VehicleRecordRepository.mark_exit(&pool, &record.id).await.unwrap();
        let first_exit = first.exit_time.unwrap();
        assert!(first_exit >= first.entry_time);

        let second = VehicleRecordRepository.mark_exit(&pool, &record.id).await.unwrap();
        assert!(second.exit_time.unwrap() >= first_exit);
        assert_eq!(second.entry_time, record.entry_time);
    }

    #[actix_rt::test]
    async fn test_mark_exit_missing() {
        let pool = test_pool().await;
        let result = VehicleRecordRepository.mark_exit(&pool, "nope").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_increment_print_count() {
        let pool = test_pool().await;
        let record = VehicleRecordRepository.create(&pool, new_record("ABC-3")).await.unwrap();
        VehicleRecordRepository.increment_print_count(&pool, &record.id).await.unwrap();
        VehicleRecordRepository.increment_print_count(&pool, &record.id).await.unwrap();
        let record = VehicleRecordRepository.find(&pool, &record.id).await.unwrap();
        assert_eq!(record.print_count, 2);
    }

    #[actix_rt::test]
    async fn test_update_leaves_entry_exit_and_prints() {
        let pool = test_pool().await;
        let record = VehicleRecordRepository.create(&pool, new_record("ABC-4")).await.unwrap();
        VehicleRecordRepository.increment_print_count(&pool, &record.id).await.unwrap();
        let exited = VehicleRecordRepository.mark_exit(&pool, &record.id).await.unwrap();

        let updated = VehicleRecordRepository
            .update(&pool, &record.id, UpdateVehicleRecordRequest {
                checked_by: Some("Guard 2".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.checked_by.as_deref(), Some("Guard 2"));
        assert_eq!(updated.entry_time, record.entry_time);
        assert_eq!(updated.exit_time, exited.exit_time);
        assert_eq!(updated.print_count, 1);
    }

    #[actix_rt::test]
    async fn test_report_order_newest_first() {
        let pool = test_pool().await;
        for (number, entry) in [("OLD", "2024-01-01T08:00:00Z"), ("NEW", "2024-03-01T08:00:00Z"), ("MID", "2024-02-01T08:00:00Z")] {
            let record = VehicleRecordRepository.create(&pool, new_record(number)).await.unwrap();
            let entry: chrono::DateTime<Utc> = entry.parse().unwrap();
            sqlx::query("UPDATE vehicle_records SET entry_time = ? WHERE id = ?")
                .bind(entry)
                .bind(&record.id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let numbers: Vec<String> = VehicleRecordRepository
            .list_for_report(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.vehicle_number)
            .collect();
        assert_eq!(numbers, vec!["NEW", "MID", "OLD"]);
    }
}
