use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    domain::repositories::notifications::NotificationSink,
    infra::{
        self,
        notifications::{NotificationDelivery, QueuedNotificationSink},
    },
};
use infra::db::{
    postgres::postgres_connection::PgPoolSquad,
    repositories::notifications::NotificationPostgres,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let stored_notifications: Arc<dyn NotificationDelivery> =
        Arc::new(NotificationPostgres::new(Arc::clone(&db_pool)));
    let notification_sink: Arc<dyn NotificationSink> =
        Arc::new(QueuedNotificationSink::new(vec![stored_notifications]));

    let accept_window = chrono::Duration::seconds(config.orders.accept_window_secs);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/orders",
            routers::orders::routes(
                Arc::clone(&db_pool),
                Arc::clone(&notification_sink),
                accept_window,
            ),
        )
        .nest(
            "/api/v1/driver",
            routers::driver::routes(Arc::clone(&db_pool), Arc::clone(&notification_sink)),
        )
        .nest("/api/v1/admin", routers::admin::routes(Arc::clone(&db_pool)))
        .nest("/api/v1/ratings", routers::ratings::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/notifications",
            routers::notifications::routes(Arc::clone(&db_pool)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        port = config.backend_server.port,
        stage = %config.stage,
        "http: server is running"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "http: failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "http: failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
