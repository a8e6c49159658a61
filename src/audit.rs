// src/audit.rs
//! One `audit_logs` row per mutating action.

use sqlx::SqlitePool;
use uuid::Uuid;
use chrono::Utc;
use actix_web::HttpRequest;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Exit,
    Print,
    Register,
    Login,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Exit => "exit",
            AuditAction::Print => "print",
            AuditAction::Register => "register",
            AuditAction::Login => "login",
        }
    }
}

/// Insert an audit row. Client address and user agent come from `request` when given.
pub async fn log_activity(
    pool: &SqlitePool,
    user_id: Option<&str>,
    action: AuditAction,
    entity_type: &str,
    entity_id: Option<&str>,
    description: Option<&str>,
    changes: Option<&str>,
    request: Option<&HttpRequest>,
) -> Result<(), sqlx::Error> {
    let ip_address = request.and_then(|req| {
        req.connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string())
    });

    let user_agent = request.and_then(|req| {
        req.headers()
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    });

    sqlx::query(
        r#"INSERT INTO audit_logs
           (id, user_id, action, entity_type, entity_id, description, changes, ip_address, user_agent, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(action.as_str())
    .bind(entity_type)
    .bind(entity_id)
    .bind(description)
    .bind(changes)
    .bind(&ip_address)
    .bind(&user_agent)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Fire-and-log variant used by handlers; a failed audit write never fails the request.
pub async fn audit(
    pool: &SqlitePool,
    user_id: &str,
    action: AuditAction,
    entity_type: &str,
    entity_id: &str,
    description: &str,
    request: &HttpRequest,
) {
    if let Err(e) = log_activity(
        pool,
        Some(user_id),
        action,
        entity_type,
        Some(entity_id),
        Some(description),
        None,
        Some(request),
    ).await {
        log::error!("Failed to write audit log for {} {}: {}", entity_type, entity_id, e);
    }
}

/// Field-level diff of two serialisations of the same record, as a JSON object
/// `{field: {"old": .., "new": ..}}`. `None` when nothing changed.
pub fn diff_changes<T: Serialize>(before: &T, after: &T) -> Option<String> {
    let (Ok(Value::Object(old)), Ok(Value::Object(new))) =
        (serde_json::to_value(before), serde_json::to_value(after))
    else {
        return None;
    };

    let mut changes = Map::new();
    for (field, new_value) in &new {
        let old_value = old.get(field).unwrap_or(&Value::Null);
        if old_value != new_value {
            changes.insert(field.clone(), json!({ "old": old_value, "new": new_value }));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(Value::Object(changes).to_string())
    }
}

/// Like [`audit`], also storing the changed fields of an update.
pub async fn audit_update<T: Serialize>(
    pool: &SqlitePool,
    user_id: &str,
    entity_type: &str,
    entity_id: &str,
    before: &T,
    after: &T,
    request: &HttpRequest,
) {
    let changes = diff_changes(before, after);
    let description = format!("Updated {} {}", entity_type, entity_id);
    if let Err(e) = log_activity(
        pool,
        Some(user_id),
        AuditAction::Update,
        entity_type,
        Some(entity_id),
        Some(&description),
        changes.as_deref(),
        Some(request),
    ).await {
        log::error!("Failed to write audit log for {} {}: {}", entity_type, entity_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use actix_web::test::TestRequest;

    #[actix_rt::test]
    async fn test_audit_row_written() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
             VALUES ('u1', 'guard', 'guard@depot.example', 'x', 'staff', datetime('now'), datetime('now'))",
        )
            .execute(&pool)
            .await
            .unwrap();
        let req = TestRequest::default()
            .insert_header(("User-Agent", "gate-terminal/1.0"))
            .to_http_request();

        audit(&pool, "u1", AuditAction::Exit, "vehicle_record", "r1", "Vehicle KA-01 left", &req).await;

        let (action, entity_type, agent): (String, String, Option<String>) = sqlx::query_as(
            "SELECT action, entity_type, user_agent FROM audit_logs WHERE entity_id = 'r1'",
        )
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(action, "exit");
        assert_eq!(entity_type, "vehicle_record");
        assert_eq!(agent.as_deref(), Some("gate-terminal/1.0"));
    }

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        quantity: i64,
        remarks: Option<&'static str>,
    }

    #[test]
    fn test_diff_changes_lists_only_changed_fields() {
        let before = Row { name: "Diesel A", quantity: 10, remarks: None };
        let after = Row { name: "Diesel A", quantity: 25, remarks: Some("topped up") };
        let diff: Value = serde_json::from_str(&diff_changes(&before, &after).unwrap()).unwrap();
        assert_eq!(diff["quantity"], json!({ "old": 10, "new": 25 }));
        assert_eq!(diff["remarks"]["old"], Value::Null);
        assert!(diff.get("name").is_none());

        assert!(diff_changes(&before, &before).is_none());
    }

    #[actix_rt::test]
    async fn test_log_activity_without_request() {
        let pool = test_pool().await;
        log_activity(&pool, None, AuditAction::Register, "user", None, None, None, None)
            .await
            .unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
