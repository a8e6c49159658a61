// src/auth_handlers.rs - Authentication route handlers

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;
use std::sync::Arc;
use chrono::Duration;
use serde::Serialize;

use crate::audit::{log_activity, AuditAction};
use crate::handlers::ApiResponse;
use crate::auth::{
    AuthService, User, LoginRequest, RegisterRequest, LoginResponse, UserInfo, UserRole,
    get_current_user,
};
use crate::error::{ApiError, ApiResult};
use crate::validator::validate_form;
use crate::AppState;

// ======== AUTH HANDLERS ========

pub async fn login(
    app_state: web::Data<Arc<AppState>>,
    auth_service: web::Data<Arc<AuthService>>,
    request: web::Json<LoginRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    request.validate()?;
    let auth_config = &app_state.config.auth;

    // Unknown and inactive users get the same answer as a wrong password
    let mut user = match User::find_by_username(&app_state.db_pool, request.username.trim()).await? {
        Some(user) if user.is_active => user,
        _ => return Err(ApiError::invalid_credentials()),
    };

    // A locked account answers like any other failed login
    if user.is_locked() {
        log::warn!("Login attempt for locked account {}", user.username);
        return Err(ApiError::invalid_credentials());
    }
    if user.lock_expired() {
        user.reset_failed_attempts(&app_state.db_pool).await?;
    }

    let password_ok = auth_service.verify_password(&request.password, &user.password_hash)
        .map_err(|_| ApiError::InternalServerError("Password verification failed".to_string()))?;

    if !password_ok {
        user.increment_failed_attempts(&app_state.db_pool).await?;

        if user.failed_login_attempts >= auth_config.max_login_attempts {
            user.lock_for_duration(
                &app_state.db_pool,
                Duration::minutes(auth_config.lockout_duration_minutes),
            ).await?;
            log::warn!(
                "User {} locked for {} minutes after {} failed logins",
                user.username, auth_config.lockout_duration_minutes, user.failed_login_attempts
            );
        }

        return Err(ApiError::invalid_credentials());
    }

    user.reset_failed_attempts(&app_state.db_pool).await?;
    user.update_last_login(&app_state.db_pool).await?;

    let token = auth_service.generate_token(&user)?;

    if let Err(e) = log_activity(
        &app_state.db_pool, Some(&user.id), AuditAction::Login, "user", Some(&user.id),
        None, None, Some(&http_request),
    ).await {
        log::error!("Failed to write audit log for login: {}", e);
    }

    log::info!("User {} logged in", user.username);

    let response = LoginResponse {
        token,
        expires_in: auth_service.token_lifetime_seconds(),
        user: user.into(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        response,
        "Login successful".to_string(),
    )))
}

pub async fn register(
    app_state: web::Data<Arc<AppState>>,
    auth_service: web::Data<Arc<AuthService>>,
    request: web::Json<RegisterRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    validate_form(&request.0)?;

    let existing_users = User::count(&app_state.db_pool).await?;
    if existing_users > 0 && !app_state.config.auth.allow_self_registration {
        return Err(ApiError::Forbidden("Self-registration is disabled".to_string()));
    }

    // The first account becomes the administrator
    let role = if existing_users == 0 { UserRole::Admin } else { UserRole::Staff };

    let user = User::create(&app_state.db_pool, &request, role, &auth_service).await?;
    let token = auth_service.generate_token(&user)?;

    if let Err(e) = log_activity(
        &app_state.db_pool, Some(&user.id), AuditAction::Register, "user", Some(&user.id),
        Some(&format!("Registered with role {}", role)), None, Some(&http_request),
    ).await {
        log::error!("Failed to write audit log for registration: {}", e);
    }

    log::info!("New user registered: {} with role {}", user.username, role);

    let response = LoginResponse {
        token,
        expires_in: auth_service.token_lifetime_seconds(),
        user: user.into(),
    };

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        response,
        "User registered successfully".to_string(),
    )))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(http_request: HttpRequest) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    log::info!("User {} logged out", claims.username);

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Logged out successfully".to_string(),
    )))
}

#[derive(Serialize)]
struct ProfileResponse {
    #[serde(flatten)]
    user: UserInfo,
    can_delete_vehicle_records: bool,
}

pub async fn get_profile(
    app_state: web::Data<Arc<AppState>>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let user: UserInfo = User::find_by_id(&app_state.db_pool, &claims.sub).await?.into();

    let response = ProfileResponse {
        can_delete_vehicle_records: user.role.can_delete_vehicle_records(),
        user,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::auth::UserRole;
    use crate::handlers::test_support::{self, test_app};

    #[actix_rt::test]
    async fn test_first_user_is_admin_then_staff() {
        let (state, auth) = test_support::state().await;
        let app = test_app!(state, auth);

        for (name, expected_role) in [("firstuser", "admin"), ("seconduser", "staff")] {
            let req = test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({
                    "username": name,
                    "email": format!("{}@depot.example", name),
                    "password": "Secret123",
                    "password_confirm": "Secret123",
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["data"]["user"]["role"], expected_role);
            assert!(body["data"]["token"].as_str().is_some());
        }
    }

    #[actix_rt::test]
    async fn test_register_mismatch_writes_nothing() {
        let (state, auth) = test_support::state().await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "username": "gateguard",
                "email": "guard@depot.example",
                "password": "Secret123",
                "password_confirm": "Secret999",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["password_confirm"].is_array());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[actix_rt::test]
    async fn test_login_failures_share_message_and_lock() {
        let (state, auth) = test_support::state().await;
        test_support::create_user(&state, &auth, "operator", UserRole::Staff).await;
        let app = test_app!(state, auth);

        let attempt = |username: &str, password: &str| {
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "username": username, "password": password }))
                .to_request()
        };

        let unknown: Value = test::read_body_json(test::call_service(&app, attempt("nobody", "Secret123")).await).await;
        let wrong: Value = test::read_body_json(test::call_service(&app, attempt("operator", "Wrong1234")).await).await;
        assert_eq!(unknown["message"], wrong["message"]);
        assert!(wrong["message"].as_str().unwrap().contains("Invalid username or password"));

        for _ in 0..4 {
            test::call_service(&app, attempt("operator", "Wrong1234")).await;
        }
        let (locked_until,): (Option<chrono::DateTime<chrono::Utc>>,) =
            sqlx::query_as("SELECT locked_until FROM users WHERE username = 'operator'")
                .fetch_one(&state.db_pool)
                .await
                .unwrap();
        assert!(locked_until.is_some());

        // Even the right password is refused, with the unknown-user message
        let resp = test::call_service(&app, attempt("operator", test_support::PASSWORD)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let locked: Value = test::read_body_json(resp).await;
        let unknown: Value = test::read_body_json(test::call_service(&app, attempt("nobody", "Wrong1234")).await).await;
        assert_eq!(locked["message"], unknown["message"]);
    }

    #[actix_rt::test]
    async fn test_expired_lock_starts_a_fresh_count() {
        let (state, auth) = test_support::state().await;
        test_support::create_user(&state, &auth, "operator", UserRole::Staff).await;
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 5, locked_until = ? WHERE username = 'operator'"
        )
            .bind(chrono::Utc::now() - chrono::Duration::minutes(1))
            .execute(&state.db_pool)
            .await
            .unwrap();
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "operator", "password": "Wrong1234" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let (attempts, locked_until): (i64, Option<chrono::DateTime<chrono::Utc>>) = sqlx::query_as(
            "SELECT failed_login_attempts, locked_until FROM users WHERE username = 'operator'"
        )
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(attempts, 1);
        assert!(locked_until.is_none());

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "operator", "password": test_support::PASSWORD }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_login_and_profile() {
        let (state, auth) = test_support::state().await;
        test_support::create_user(&state, &auth, "operator", UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "operator", "password": test_support::PASSWORD }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["username"], "operator");
        assert_eq!(body["data"]["can_delete_vehicle_records"], false);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_protected_route_requires_token() {
        let (state, auth) = test_support::state().await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::get().uri("/api/v1/auth/profile").to_request();
        let resp = test::try_call_service(&app, req).await;
        match resp {
            Ok(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            Err(err) => assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED),
        }
    }
}
