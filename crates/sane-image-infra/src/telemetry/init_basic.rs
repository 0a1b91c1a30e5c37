use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "sane_image=info";

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "sane-image".to_string(),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// Initialize tracing with an env filter and a fmt layer.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.as_str()));

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        json = config.json,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown (no exporters to flush)");
}
