//! Metrics recorder initialization and configuration.

use {
    anyhow::Result,
    std::net::SocketAddr,
    tracing::{info, warn},
};

/// Configuration for the metrics system.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    /// Whether metrics collection is enabled
    pub enabled: bool,
    /// Address for the Prometheus scrape endpoint. Metrics are only
    /// recorded when this is set.
    pub listen: Option<SocketAddr>,
}

impl MetricsRecorderConfig {
    /// The scrape address, when metrics are enabled and exported.
    #[must_use]
    pub fn export_address(&self) -> Option<SocketAddr> {
        self.listen.filter(|_| self.enabled)
    }
}

/// Initialize the metrics system.
///
/// Call once at startup, from inside a tokio runtime. Without a listen
/// address, or without the `prometheus` feature, every metric is discarded.
///
/// # Errors
///
/// Returns an error if the exporter fails to install.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<()> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(());
    }
    let Some(addr) = config.export_address() else {
        warn!("metrics enabled without metrics.listen; nothing will be exported");
        return Ok(());
    };

    #[cfg(feature = "prometheus")]
    {
        init_prometheus(addr)
    }

    #[cfg(not(feature = "prometheus"))]
    {
        info!(%addr, "metrics feature not enabled at compile time");
        Ok(())
    }
}

#[cfg(feature = "prometheus")]
fn init_prometheus(addr: SocketAddr) -> Result<()> {
    use {
        crate::{buckets, pipeline},
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(pipeline::PROCESS_DURATION_SECONDS.to_string()),
            &buckets::PROCESS_DURATION,
        )?
        .with_http_listener(addr)
        .install()?;
    info!(%addr, "prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_installs_nothing() {
        init_metrics(MetricsRecorderConfig::default()).unwrap();
    }

    #[test]
    fn enabled_without_listener_installs_nothing() {
        let config = MetricsRecorderConfig {
            enabled: true,
            listen: None,
        };
        assert_eq!(config.export_address(), None);
        // A second global recorder would fail to install.
        init_metrics(config.clone()).unwrap();
        init_metrics(config).unwrap();
    }

    #[test]
    fn listener_ignored_while_disabled() {
        let config = MetricsRecorderConfig {
            enabled: false,
            listen: Some("127.0.0.1:9898".parse().unwrap()),
        };
        assert_eq!(config.export_address(), None);
    }
}
