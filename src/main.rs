use anyhow::{Context, Result};
use chrono::Local;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use autotrack::config::environment::EnvironmentConfig;
use autotrack::create_router;
use autotrack::database::DatabaseConnection;
use autotrack::services::maintenance_types::load_maintenance_types;
use autotrack::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚗 AutoTrack - Manutenciones de vehículos");
    info!("=========================================");

    let config = EnvironmentConfig::from_env();
    info!("⚙️ Entorno: {}", config.environment);

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new(&config.database).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let maintenance_types = load_maintenance_types(config.maintenance_types_file.as_deref()).await;
    let app_state = AppState::new(db_connection.pool().clone(), config.clone())
        .with_maintenance_types(maintenance_types);

    // Notificador en segundo plano
    let notifier_handle = if config.notifications.enabled {
        app_state
            .notifications
            .restore(Local::now().naive_local())
            .await;
        info!(
            "🔔 Notificador activo cada {} minutos",
            config.notifications.check_interval.as_secs() / 60
        );
        Some(app_state.notifications.clone().spawn())
    } else {
        warn!("🔕 Notificador desactivado (NOTIFY_ENABLED=false)");
        None
    };

    let app = create_router(app_state);

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("dirección inválida: {}", config.server_url()))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Vehículos:");
    info!("   GET|POST /api/vehicles");
    info!("   GET|PUT|DELETE /api/vehicles/:id");
    info!("   PUT  /api/vehicles/:id/odometer");
    info!("   GET|POST /api/vehicles/:id/maintenances");
    info!("🔧 Manutenciones:");
    info!("   GET|POST /api/maintenances");
    info!("   GET|PUT|DELETE /api/maintenances/:id");
    info!("   PUT  /api/maintenances/:id/completion");
    info!("⚠️ Alertas:");
    info!("   GET  /api/alerts - Alertas ordenadas por urgencia");
    info!("   GET  /api/stats - Resumen");
    info!("   GET  /api/maintenance-types - Tipos sugeridos");
    info!("   GET  /api/notifications/status");
    info!("   POST /api/notifications/check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", addr))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
    }

    if let Some(handle) = notifier_handle {
        handle.abort();
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
