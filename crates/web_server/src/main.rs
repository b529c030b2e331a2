//! Main entry point for the reservation platform backend server.
//! This crate provides REST API endpoints and serves the frontend application.

use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, Result, middleware::Logger, web};
use std::path::Path;
use std::sync::Arc;

use auth_services::middleware::AuthMiddleware;
use notification_services::{
    EmailNotifier, LiveBroadcaster, NotificationFanout, PgRecipientDirectory, SesEmailService,
};
use postgres::database::*;
use web_handlers::*;

mod live;
use live::live_events;

async fn api_health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Reservation platform backend",
        "status": "running"
    })))
}

fn get_frontend_path() -> &'static str {
    // Check multiple possible locations for frontend files
    if Path::new("./frontend-build").exists() {
        log::info!("✅ Using Docker frontend path: ./frontend-build");
        "./frontend-build"
    } else if Path::new("../frontend/build").exists() {
        log::info!("✅ Using local frontend path: ../frontend/build");
        "../frontend/build"
    } else {
        log::info!("❌ Frontend files not found in either location");
        "./frontend-build" // fallback
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting reservation platform server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        log::error!("❌ Failed to run database migrations: {}", e);
        std::process::exit(1);
    }
    log::info!("🗃️ Database migrations applied");

    // Create email delivery service
    let email_service = match SesEmailService::new().await {
        Ok(service) => {
            log::info!("📧 Email service initialized successfully");
            Arc::new(service)
        }
        Err(e) => {
            log::error!("❌ Failed to initialize email service: {}", e);
            log::warn!("🔧 Check AWS credentials and SES setup");
            std::process::exit(1);
        }
    };
    let emails = web::Data::new(EmailNotifier::new(email_service));

    // Live broadcaster and notification fan-out share one session registry
    let broadcaster = Arc::new(LiveBroadcaster::new());
    let directory = Arc::new(PgRecipientDirectory::new(pool.clone()));
    let fanout = web::Data::new(NotificationFanout::new(
        pool.clone(),
        directory,
        broadcaster.clone(),
    ));

    let frontend_path = get_frontend_path();
    log::info!("📁 Frontend files location: {}", frontend_path);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("🌐 Server will be available at: http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(broadcaster.clone()))
            .app_data(emails.clone())
            .app_data(fanout.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/health", web::get().to(api_health))
                    .service(
                        web::scope("/bookings")
                            .route("/availability/{item_id}", web::get().to(get_availability))
                            // Guests may create bookings and attach payment
                            // proofs; the handlers resolve the token themselves.
                            .route("", web::post().to(create_booking))
                            .route(
                                "/{booking_id}/payment-proof",
                                web::patch().to(upload_payment_proof),
                            )
                            // Protected routes (require authentication)
                            .service(
                                web::scope("")
                                    .wrap(AuthMiddleware)
                                    .route("", web::get().to(get_all_bookings))
                                    .route("/my", web::get().to(get_my_bookings))
                                    .route(
                                        "/{booking_id}/status",
                                        web::patch().to(update_booking_status),
                                    ),
                            ),
                    )
                    .service(
                        web::scope("/analytics")
                            .wrap(AuthMiddleware)
                            .route("/dashboard", web::get().to(get_dashboard)),
                    )
                    .service(
                        web::scope("/notifications")
                            .wrap(AuthMiddleware)
                            .route("", web::get().to(get_my_notifications))
                            .route("/read-all", web::patch().to(mark_all_notifications_read))
                            .route(
                                "/{notification_id}/read",
                                web::patch().to(mark_notification_read),
                            ),
                    )
                    .service(
                        web::scope("/events")
                            .wrap(AuthMiddleware)
                            .route("", web::get().to(live_events)),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
            .service(Files::new("/", frontend_path).index_file("index.html"))
    })
    .bind(bind_addr)?
    .run()
    .await
}
