use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use hostwatch_core::MonitorSettings;
use hostwatch_monitoring::routes::{configure_routes, MonitoringApiDoc, MonitoringState};
use hostwatch_monitoring::{DiskMonitor, SystemProbe};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8080", env = "HOSTWATCH_ADDRESS")]
    pub address: String,

    /// Seconds between collection cycles
    #[arg(
        long,
        default_value_t = 60,
        env = "HOSTWATCH_COLLECT_INTERVAL_SECS"
    )]
    pub collect_interval_secs: u64,

    /// Hours of history kept in memory
    #[arg(long, default_value_t = 24, env = "HOSTWATCH_RETENTION_HOURS")]
    pub retention_hours: u64,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let settings = MonitorSettings::new(
            Duration::from_secs(self.collect_interval_secs),
            Duration::from_secs(self.retention_hours * 3600),
        );

        let monitor = Arc::new(DiskMonitor::new(Arc::new(SystemProbe::new()), &settings)?);

        info!(
            "Starting Hostwatch server on {} (interval {}s, retention {}h, {} snapshot slots)",
            self.address,
            self.collect_interval_secs,
            self.retention_hours,
            settings.store_capacity()
        );

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            // The collector runs independently of request handling; a
            // failed cycle never takes the server down.
            tokio::spawn(monitor.clone().start_monitoring());

            let state = Arc::new(MonitoringState {
                monitor: monitor.clone(),
            });
            let app = configure_routes()
                .with_state(state)
                .merge(
                    SwaggerUi::new("/swagger-ui")
                        .url("/api-docs/openapi.json", MonitoringApiDoc::openapi()),
                )
                .layer(TraceLayer::new_for_http());

            let listener = tokio::net::TcpListener::bind(&self.address).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            anyhow::Ok(())
        })
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c signal");
    info!("Received Ctrl+C, shutting down...");
}
