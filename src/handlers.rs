// src/handlers.rs
use actix_web::HttpResponse;
use serde::{Serialize, Deserialize};
use crate::models::{
    Choice, CompanyType, EquipmentCondition, EquipmentType, FleetFuelType, FleetStatus,
    FuelType, VehicleType,
};
use crate::error::ApiResult;

// ==================== COMMON STRUCTURES ====================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

impl PaginationQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }

    /// Non-blank search term, trimmed.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

// ==================== CHOICES ====================

#[derive(Debug, Serialize)]
pub struct ChoicesResponse {
    pub company_type: Vec<Choice>,
    pub equipment_type: Vec<Choice>,
    pub equipment_condition: Vec<Choice>,
    pub fuel_type: Vec<Choice>,
    pub vehicle_type: Vec<Choice>,
    pub fleet_fuel_type: Vec<Choice>,
    pub fleet_status: Vec<Choice>,
}

/// Allowed values for every closed choice field, for building forms.
pub async fn get_choices() -> ApiResult<HttpResponse> {
    let choices = ChoicesResponse {
        company_type: CompanyType::choices(),
        equipment_type: EquipmentType::choices(),
        equipment_condition: EquipmentCondition::choices(),
        fuel_type: FuelType::choices(),
        vehicle_type: VehicleType::choices(),
        fleet_fuel_type: FleetFuelType::choices(),
        fleet_status: FleetStatus::choices(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(choices)))
}

/// Shared fixtures for handler tests: in-memory state, users and a wired-up app.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::auth::{AuthService, RegisterRequest, User, UserRole};
    use crate::config::Config;
    use crate::db::test_pool;
    use crate::AppState;

    pub const PASSWORD: &str = "Secret123";

    pub async fn state() -> (Arc<AppState>, Arc<AuthService>) {
        let config = Config::default();
        let auth = Arc::new(AuthService::new(&config.auth.jwt_secret, 4, 1));
        let state = Arc::new(AppState { db_pool: test_pool().await, config });
        (state, auth)
    }

    pub async fn create_user(state: &AppState, auth: &AuthService, username: &str, role: UserRole) -> User {
        let request = RegisterRequest {
            username: username.to_string(),
            email: format!("{}@depot.example", username),
            password: PASSWORD.to_string(),
            password_confirm: PASSWORD.to_string(),
        };
        User::create(&state.db_pool, &request, role, auth).await.unwrap()
    }

    /// `Authorization` header value for a fresh user with `role`.
    pub async fn bearer(state: &AppState, auth: &AuthService, role: UserRole) -> String {
        let username = format!("{}_{}", role, &uuid::Uuid::new_v4().simple().to_string()[..8]);
        let user = create_user(state, auth, &username, role).await;
        format!("Bearer {}", auth.generate_token(&user).unwrap())
    }

    macro_rules! test_app {
        ($state:expr, $auth:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data(actix_web::web::Data::new($state.clone()))
                    .app_data(actix_web::web::Data::new($auth.clone()))
                    .app_data(actix_web::web::Data::new(std::sync::Arc::new(crate::monitoring::Metrics::new())))
                    .configure(crate::configure_routes),
            )
            .await
        };
    }

    pub(crate) use test_app;
}
