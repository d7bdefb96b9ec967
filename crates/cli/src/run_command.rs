use std::sync::Arc;

use {
    anyhow::{Result, bail},
    jabberfeed_config::{JabberfeedConfig, Severity, check_config},
    jabberfeed_metrics::{MetricsRecorderConfig, init_metrics},
    jabberfeed_pipeline::{ChannelQueue, FieldDecorator, Pipeline},
    jabberfeed_xmpp::XmppInput,
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
};

use crate::output::drain_events;

/// Run the XMPP input until interrupted or the session is lost.
pub async fn run(config: JabberfeedConfig) -> Result<()> {
    let diagnostics = check_config(&config);
    for d in &diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
        }
    }
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        bail!("invalid configuration: {errors} error(s)");
    }

    init_metrics(MetricsRecorderConfig {
        enabled: config.metrics.enabled,
        listen: config.metrics.listen,
    })?;

    let (queue, rx) = ChannelQueue::bounded(config.output.queue_capacity);
    let codec = config.codec.kind.build();
    info!(codec = codec.name(), capacity = config.output.queue_capacity, "pipeline ready");
    let pipeline = Pipeline::new(
        codec,
        Arc::new(FieldDecorator::new(config.decorate)),
        Arc::new(queue),
    );

    let consumer = tokio::spawn(drain_events(rx, tokio::io::stdout(), config.output.pretty));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    // The input owns the last queue sender, so the consumer stops once it
    // returns.
    let outcome = XmppInput::new(config.xmpp, pipeline).run(shutdown).await;

    match consumer.await? {
        Ok(written) => info!(written, "output drained"),
        Err(e) => error!(error = %e, "output consumer failed"),
    }

    outcome?;
    info!("jabberfeed stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}
