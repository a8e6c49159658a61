use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod audit;
mod auth;
mod auth_handlers;
mod config;
mod contact_handlers;
mod dashboard_handlers;
mod db;
mod equipment_handlers;
mod error;
mod fleet_handlers;
mod handlers;
mod models;
mod monitoring;
mod pdf;
mod project_handlers;
pub mod repositories;
mod stats;
mod stock_handlers;
mod supplier_handlers;
pub mod validator;
mod vehicle_handlers;

use auth::{jwt_middleware, AuthService};
use config::{load_config, Config};
use monitoring::{Metrics, RequestLogger};

pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}

/// Every route of the service. Shared by `main` and the handler tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let auth_middleware = HttpAuthentication::bearer(jwt_middleware);

    cfg
        // Health check and metrics (no auth)
        .service(
            web::scope("/health")
                .route("", web::get().to(monitoring::health_check))
                .route("/ready", web::get().to(monitoring::readiness_check))
                .route("/metrics", web::get().to(monitoring::metrics_endpoint))
        )

        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth_handlers::login))
                .route("/register", web::post().to(auth_handlers::register))
        )

        // Contact form is open to visitors
        .service(
            web::scope("/api/v1/public")
                .route("/contact", web::post().to(contact_handlers::submit_contact))
        )

        // Protected API endpoints
        .service(
            web::scope("/api/v1")
                .wrap(auth_middleware)
                .service(
                    web::scope("/auth")
                        .route("/profile", web::get().to(auth_handlers::get_profile))
                        .route("/logout", web::post().to(auth_handlers::logout))
                )
                .route("/dashboard", web::get().to(dashboard_handlers::get_dashboard))
                .route("/choices", web::get().to(handlers::get_choices))

                .service(
                    web::scope("/suppliers")
                        .route("", web::get().to(supplier_handlers::get_suppliers))
                        .route("", web::post().to(supplier_handlers::create_supplier))
                        .route("/{id}", web::get().to(supplier_handlers::get_supplier))
                        .route("/{id}", web::put().to(supplier_handlers::update_supplier))
                        .route("/{id}", web::delete().to(supplier_handlers::delete_supplier))
                )

                .service(
                    web::scope("/equipment")
                        .route("", web::get().to(equipment_handlers::get_equipment))
                        .route("", web::post().to(equipment_handlers::create_equipment))
                        .route("/{id}", web::get().to(equipment_handlers::get_equipment_by_id))
                        .route("/{id}", web::put().to(equipment_handlers::update_equipment))
                        .route("/{id}", web::delete().to(equipment_handlers::delete_equipment))
                        .route("/{id}/inspections", web::get().to(equipment_handlers::get_inspections))
                        .route("/{id}/inspections", web::post().to(equipment_handlers::create_inspection))
                        .route("/{id}/inspections/{inspection_id}", web::delete().to(equipment_handlers::delete_inspection))
                )

                // Stock (fixed segments before /{id})
                .service(
                    web::scope("/stock")
                        .route("", web::get().to(stock_handlers::get_stock_items))
                        .route("", web::post().to(stock_handlers::create_stock_item))
                        .route("/data", web::get().to(dashboard_handlers::get_stock_data))
                        .route("/low", web::get().to(dashboard_handlers::get_low_stock))
                        .route("/{id}", web::get().to(stock_handlers::get_stock_item))
                        .route("/{id}", web::put().to(stock_handlers::update_stock_item))
                        .route("/{id}", web::delete().to(stock_handlers::delete_stock_item))
                )

                .service(
                    web::scope("/vehicles")
                        .route("", web::get().to(vehicle_handlers::get_vehicle_records))
                        .route("", web::post().to(vehicle_handlers::create_vehicle_record))
                        .route("/report", web::get().to(vehicle_handlers::vehicle_report))
                        .route("/{id}", web::get().to(vehicle_handlers::get_vehicle_record))
                        .route("/{id}", web::put().to(vehicle_handlers::update_vehicle_record))
                        .route("/{id}", web::delete().to(vehicle_handlers::delete_vehicle_record))
                        .route("/{id}/exit", web::post().to(vehicle_handlers::mark_exit))
                        .route("/{id}/receipt", web::get().to(vehicle_handlers::vehicle_receipt))
                )

                .service(
                    web::scope("/fleet")
                        .route("", web::get().to(fleet_handlers::get_fleet))
                        .route("", web::post().to(fleet_handlers::create_fleet_vehicle))
                        .route("/{id}", web::get().to(fleet_handlers::get_fleet_vehicle))
                        .route("/{id}", web::put().to(fleet_handlers::update_fleet_vehicle))
                        .route("/{id}", web::delete().to(fleet_handlers::delete_fleet_vehicle))
                )

                .service(
                    web::scope("/projects")
                        .route("", web::get().to(project_handlers::get_projects))
                        .route("", web::post().to(project_handlers::create_project))
                        .route("/{id}", web::get().to(project_handlers::get_project))
                        .route("/{id}", web::put().to(project_handlers::update_project))
                        .route("/{id}", web::delete().to(project_handlers::delete_project))
                )

                .service(
                    web::scope("/contacts")
                        .route("", web::get().to(contact_handlers::get_contacts))
                        .route("", web::post().to(contact_handlers::submit_contact))
                        .route("/{id}", web::get().to(contact_handlers::get_contact))
                        .route("/{id}", web::delete().to(contact_handlers::delete_contact))
                )
        );
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env first)
    let config = load_config()?;

    setup_logging(&config)?;
    config.validate()?;

    if config.is_production() {
        validate_production_config(&config)?;
    }
    config.print_startup_info();

    setup_database(&config.database.url).await?;
    let pool = create_database_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let auth_service = Arc::new(AuthService::new(
        &config.auth.jwt_secret,
        config.auth.bcrypt_cost,
        config.auth.token_expiration_hours,
    ));

    create_default_admin_if_needed(&pool, &auth_service).await?;

    let app_state = Arc::new(AppState {
        db_pool: pool.clone(),
        config: config.clone(),
    });

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Starting server at http://{}", bind_address);

    let metrics = Arc::new(Metrics::new());

    let server_config = config.clone();
    let mut server = HttpServer::new(move || {
        let cors = setup_improved_cors(&server_config.security.allowed_origins, server_config.is_production());
        let security_headers = setup_security_headers(&server_config.security);

        App::new()
            .wrap(cors)
            .wrap(security_headers)
            .wrap(Logger::default())
            .wrap(Compress::default())
            .wrap(RequestLogger::new(metrics.clone()))
            .app_data(web::JsonConfig::default().limit(server_config.security.max_request_size))
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .configure(configure_routes)
    })
        .keep_alive(Duration::from_secs(config.server.keep_alive));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&bind_address)?
        .run()
        .await
        .context("Server failed to run")?;

    Ok(())
}

// ==================== HELPER FUNCTIONS ====================

pub fn setup_improved_cors(allowed_origins: &[String], is_production: bool) -> Cors {
    log::debug!("Configuring CORS for origins: {:?}", allowed_origins);

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![header::CONTENT_LENGTH, header::CONTENT_DISPOSITION])
        .max_age(3600);

    // Wildcard origins are rejected earlier in production
    if allowed_origins.iter().any(|origin| origin == "*") && !is_production {
        log::warn!("Using wildcard CORS (*) in development mode");
        return cors.allow_any_origin().allow_any_header().allow_any_method();
    }

    for origin in allowed_origins.iter().filter(|origin| !origin.is_empty()) {
        log::info!("Adding CORS origin: {}", origin);
        cors = cors.allowed_origin(origin);
    }

    cors
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}

fn validate_production_config(config: &Config) -> anyhow::Result<()> {
    if config.auth.jwt_secret.len() < 32 {
        anyhow::bail!("Insecure JWT secret in production! Must be at least 32 characters.");
    }

    if config.security.allowed_origins.iter().any(|origin| origin == "*") {
        anyhow::bail!("Wildcard CORS origins not allowed in production!");
    }

    if config.auth.allow_self_registration {
        log::warn!("Self-registration is enabled in production; new accounts get the staff role");
    }

    Ok(())
}

async fn setup_database(database_url: &str) -> anyhow::Result<()> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        log::info!("Creating database: {}", database_url);
        Sqlite::create_database(database_url).await?;
    }
    Ok(())
}

async fn create_database_pool(db_config: &config::DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&db_config.url)
        .with_context(|| format!("Invalid database url: {}", db_config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.connect_timeout))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

fn setup_security_headers(config: &config::SecurityConfig) -> DefaultHeaders {
    let mut headers = DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"));

    if config.require_https {
        headers = headers.add((
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains",
        ));
    }

    headers
}

/// Seeds an admin from `DEFAULT_ADMIN_PASSWORD` on an empty database.
/// Without it the first registered account becomes the admin.
async fn create_default_admin_if_needed(
    pool: &SqlitePool,
    auth_service: &AuthService,
) -> anyhow::Result<()> {
    if auth::User::count(pool).await? > 0 {
        return Ok(());
    }

    let password = match env::var("DEFAULT_ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            log::info!("No users yet; the first registered account will be the administrator");
            return Ok(());
        }
    };

    let username = env::var("DEFAULT_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let request = auth::RegisterRequest {
        username: username.clone(),
        email: env::var("DEFAULT_ADMIN_EMAIL").unwrap_or_else(|_| "admin@petrolog.local".to_string()),
        password: password.clone(),
        password_confirm: password,
    };

    validator::validate_form(&request)
        .map_err(|e| anyhow::anyhow!("DEFAULT_ADMIN_PASSWORD rejected: {}", e))?;

    auth::User::create(pool, &request, auth::UserRole::Admin, auth_service)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create default admin user: {}", e))?;

    log::warn!("Default admin user '{}' created from DEFAULT_ADMIN_PASSWORD", username);
    Ok(())
}
