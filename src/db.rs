// src/db.rs - Database migrations and setup

use sqlx::SqlitePool;
use anyhow::Result;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Foreign keys carry the SET NULL / CASCADE rules below
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    // In-memory databases refuse WAL; not fatal
    if let Err(e) = sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await {
        log::debug!("WAL mode not enabled: {}", e);
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE CHECK(length(username) >= 3 AND length(username) <= 150),
            email TEXT NOT NULL CHECK(length(email) >= 3 AND length(email) <= 255),
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'staff' CHECK(role IN ('admin', 'staff')),
            is_active INTEGER NOT NULL DEFAULT 1 CHECK(is_active IN (0, 1)),
            last_login DATETIME,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            failed_login_attempts INTEGER NOT NULL DEFAULT 0,
            locked_until DATETIME
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== SUPPLIERS ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 150),
            company_type TEXT NOT NULL DEFAULT 'Refinery' CHECK(
                company_type IN ('Refinery', 'Distributor', 'Gas Supplier', 'Transporter')
            ),
            contact_person TEXT CHECK(contact_person IS NULL OR length(contact_person) <= 120),
            email TEXT CHECK(email IS NULL OR length(email) <= 254),
            phone TEXT CHECK(phone IS NULL OR length(phone) <= 30),
            address TEXT,
            date_added DATETIME NOT NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== EQUIPMENT ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS equipment (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 150),
            equipment_type TEXT NOT NULL CHECK(
                equipment_type IN ('Pump', 'Compressor', 'Storage Tank', 'Pipeline')
            ),
            condition TEXT NOT NULL DEFAULT 'Good' CHECK(
                condition IN ('Good', 'Needs Repair', 'Out of Order')
            ),
            location TEXT CHECK(location IS NULL OR length(location) <= 150),
            storage_capacity REAL NOT NULL DEFAULT 0 CHECK(storage_capacity >= 0),
            date_added DATETIME NOT NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inspections (
            id TEXT PRIMARY KEY,
            equipment_id TEXT NOT NULL,
            inspector TEXT NOT NULL CHECK(length(inspector) > 0 AND length(inspector) <= 100),
            remarks TEXT,
            passed INTEGER NOT NULL DEFAULT 1 CHECK(passed IN (0, 1)),
            date DATETIME NOT NULL,
            FOREIGN KEY (equipment_id) REFERENCES equipment (id) ON DELETE CASCADE
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== STOCK ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stock_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 150),
            fuel_type TEXT NOT NULL DEFAULT 'Petrol' CHECK(
                fuel_type IN ('Petrol', 'Diesel', 'Natural Gas', 'LPG')
            ),
            supplier_id TEXT,
            quantity INTEGER NOT NULL DEFAULT 0 CHECK(quantity >= 0 AND quantity <= 2147483647),
            min_level INTEGER NOT NULL DEFAULT 100 CHECK(min_level >= 0 AND min_level <= 2147483647),
            last_updated DATETIME NOT NULL,
            FOREIGN KEY (supplier_id) REFERENCES suppliers (id) ON DELETE SET NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== GATE RECORDS ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_records (
            id TEXT PRIMARY KEY,
            vehicle_number TEXT NOT NULL CHECK(length(vehicle_number) > 0 AND length(vehicle_number) <= 50),
            driver_name TEXT NOT NULL CHECK(length(driver_name) > 0 AND length(driver_name) <= 100),
            driver_phone TEXT CHECK(driver_phone IS NULL OR length(driver_phone) <= 15),
            supplier_id TEXT,
            vehicle_type TEXT NOT NULL DEFAULT 'Tanker' CHECK(
                vehicle_type IN ('Tanker', 'Truck', 'Service', 'Other')
            ),
            entry_time DATETIME NOT NULL,
            exit_time DATETIME,
            product_type TEXT NOT NULL CHECK(length(product_type) > 0 AND length(product_type) <= 100),
            quantity REAL NOT NULL DEFAULT 0 CHECK(quantity >= 0 AND quantity <= 99999999.99),
            remarks TEXT,
            checked_by TEXT CHECK(checked_by IS NULL OR length(checked_by) <= 100),
            print_count INTEGER NOT NULL DEFAULT 0 CHECK(print_count >= 0),
            FOREIGN KEY (supplier_id) REFERENCES suppliers (id) ON DELETE SET NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== FLEET ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicles (
            id TEXT PRIMARY KEY,
            vehicle_name TEXT NOT NULL CHECK(length(vehicle_name) > 0 AND length(vehicle_name) <= 100),
            registration_number TEXT NOT NULL CHECK(length(registration_number) > 0 AND length(registration_number) <= 50),
            driver_name TEXT NOT NULL CHECK(length(driver_name) > 0 AND length(driver_name) <= 100),
            fuel_type TEXT NOT NULL CHECK(fuel_type IN ('Petrol', 'Diesel', 'CNG', 'LPG')),
            capacity TEXT NOT NULL CHECK(length(capacity) <= 50),
            last_service_date DATE,
            status TEXT NOT NULL DEFAULT 'Active' CHECK(
                status IN ('Active', 'Under Maintenance', 'Inactive')
            ),
            description TEXT,
            date_added DATETIME NOT NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== CONTACTS & PROJECTS ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 122),
            email TEXT NOT NULL CHECK(length(email) <= 254),
            phone TEXT NOT NULL CHECK(length(phone) <= 15),
            subject TEXT NOT NULL CHECK(length(subject) > 0 AND length(subject) <= 200),
            message TEXT NOT NULL,
            date DATETIME NOT NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(name) > 0 AND length(name) <= 200),
            location TEXT NOT NULL CHECK(length(location) <= 255),
            manager TEXT NOT NULL CHECK(length(manager) <= 100),
            start_date DATE NOT NULL,
            active INTEGER NOT NULL DEFAULT 1 CHECK(active IN (0, 1))
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== AUDIT ====================
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            action TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT,
            description TEXT,
            changes TEXT,
            ip_address TEXT,
            user_agent TEXT,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE SET NULL
        )
        "#,
    )
        .execute(pool)
        .await?;

    // ==================== CREATE INDEXES ====================
    let index_queries = [
        "CREATE INDEX IF NOT EXISTS idx_suppliers_name ON suppliers(name)",
        "CREATE INDEX IF NOT EXISTS idx_equipment_condition ON equipment(condition)",
        "CREATE INDEX IF NOT EXISTS idx_inspections_equipment ON inspections(equipment_id)",
        "CREATE INDEX IF NOT EXISTS idx_stock_supplier ON stock_items(supplier_id)",
        "CREATE INDEX IF NOT EXISTS idx_stock_quantity ON stock_items(quantity)",
        "CREATE INDEX IF NOT EXISTS idx_vehicle_records_entry ON vehicle_records(entry_time)",
        "CREATE INDEX IF NOT EXISTS idx_vehicle_records_supplier ON vehicle_records(supplier_id)",
        "CREATE INDEX IF NOT EXISTS idx_vehicle_records_number ON vehicle_records(vehicle_number)",
        "CREATE INDEX IF NOT EXISTS idx_vehicles_status ON vehicles(status)",
        "CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_logs(entity_type, entity_id)",
    ];

    for query in index_queries.iter() {
        sqlx::query(query).execute(pool).await?;
    }

    Ok(())
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
            .fetch_all(&pool)
            .await
            .unwrap();
        let names: Vec<String> = tables.into_iter().map(|t| t.0).collect();
        for expected in [
            "audit_logs", "contacts", "equipment", "inspections", "projects",
            "stock_items", "suppliers", "users", "vehicle_records", "vehicles",
        ] {
            assert!(names.contains(&expected.to_string()), "missing table {}", expected);
        }
    }

    #[actix_rt::test]
    async fn test_check_constraints_reject_bad_choice() {
        let pool = test_pool().await;
        let result = sqlx::query(
            "INSERT INTO suppliers (id, name, company_type, date_added) VALUES ('s1', 'X', 'Bakery', datetime('now'))",
        )
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
