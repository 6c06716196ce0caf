use std::sync::Arc;

use axum::{ routing::{ get, post, put }, Router };
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };
use vip_invest::{ Config, Result };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "vip_invest=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| vip_invest::AppError::Internal(e.to_string()))?;

    tracing::info!("Starting vip-invest");

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(vip_invest::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(vip_invest::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    // Seed the VIP catalog and bank list on first boot
    vip_invest::db::seed_reference_data(&db).await?;

    let db = Arc::new(db);

    // Initialize services
    let clock: Arc<dyn vip_invest::clock::Clock> = Arc::new(vip_invest::clock::SystemClock);
    let platform = config.platform.clone();

    let wallet_service = vip_invest::services::WalletService::new(clock.clone());
    let referral_service = vip_invest::services::ReferralService::new(
        platform.clone(),
        wallet_service.clone(),
        clock.clone()
    );
    let user_service = Arc::new(
        vip_invest::services::UserService::new(db.clone(), wallet_service.clone(), clock.clone())
    );
    let deposit_service = Arc::new(
        vip_invest::services::DepositService::new(
            db.clone(),
            platform.clone(),
            wallet_service.clone(),
            referral_service.clone(),
            clock.clone()
        )
    );
    let withdrawal_service = Arc::new(
        vip_invest::services::WithdrawalService::new(
            db.clone(),
            platform.clone(),
            wallet_service.clone(),
            clock.clone()
        )
    );
    let vip_service = Arc::new(
        vip_invest::services::VipService::new(db.clone(), wallet_service.clone(), clock.clone())
    );

    // Start the earnings scheduler
    let scheduler = vip_invest::scheduler::EarningsScheduler::new(
        vip_service.clone(),
        platform.earnings_interval_secs
    );
    tokio::spawn(scheduler.start());
    tracing::info!("Earnings scheduler started");

    // Create app state
    let app_state = vip_invest::api::AppState::new(
        db,
        user_service,
        Arc::new(wallet_service),
        deposit_service,
        withdrawal_service,
        vip_service,
        Arc::new(referral_service)
    );

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(vip_invest::api::auth::signup))
        .route("/api/auth/login", post(vip_invest::api::auth::login))
        .route("/api/users/{id}", get(vip_invest::api::auth::get_profile))
        .route("/api/users/{id}/wallet", get(vip_invest::api::wallet::get_wallet))
        .route("/api/users/{id}/transactions", get(vip_invest::api::wallet::list_transactions))
        .route("/api/users/{id}/deposits", post(vip_invest::api::deposit::create_deposit))
        .route("/api/users/{id}/deposits", get(vip_invest::api::deposit::list_deposits))
        .route("/api/users/{id}/withdrawals", post(vip_invest::api::withdrawal::create_withdrawal))
        .route("/api/users/{id}/withdrawals", get(vip_invest::api::withdrawal::list_withdrawals))
        .route("/api/users/{id}/investments", post(vip_invest::api::vip::purchase))
        .route("/api/users/{id}/investments", get(vip_invest::api::vip::list_investments))
        .route("/api/users/{id}/earnings", get(vip_invest::api::vip::list_earnings))
        .route("/api/users/{id}/commissions", get(vip_invest::api::referral::list_commissions))
        .route("/api/users/{id}/referrals/stats", get(vip_invest::api::referral::get_stats))
        .route("/api/users/{id}/referrals/tree", get(vip_invest::api::referral::get_tree))
        .route("/api/banks", get(vip_invest::api::withdrawal::list_banks))
        .route("/api/vip/products", get(vip_invest::api::vip::list_products))
        .route("/api/admin/deposits", get(vip_invest::api::admin::list_deposits))
        .route("/api/admin/deposits/{id}/approve", post(vip_invest::api::admin::approve_deposit))
        .route("/api/admin/deposits/{id}/reject", post(vip_invest::api::admin::reject_deposit))
        .route("/api/admin/withdrawals", get(vip_invest::api::admin::list_withdrawals))
        .route(
            "/api/admin/withdrawals/{id}/approve",
            post(vip_invest::api::admin::approve_withdrawal)
        )
        .route(
            "/api/admin/withdrawals/{id}/reject",
            post(vip_invest::api::admin::reject_withdrawal)
        )
        .route("/api/admin/users/{id}/active", put(vip_invest::api::admin::set_user_active))
        .with_state(app_state)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| vip_invest::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| vip_invest::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
