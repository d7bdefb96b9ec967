//! Top-level XMPP input: connect, subscribe, and run until stopped.

use {
    jabberfeed_pipeline::Pipeline,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use crate::{
    Result, XmppInputConfig,
    client::TokioXmppConnector,
    direct::register_direct_observer,
    rooms::join_rooms,
    run::run_loop,
    session::Session,
    transport::{ConnectSettings, Connector},
};

/// An XMPP input publishing every received chat message into `pipeline`.
pub struct XmppInput<C: Connector = TokioXmppConnector> {
    config: XmppInputConfig,
    connector: C,
    pipeline: Pipeline,
}

impl XmppInput {
    pub fn new(config: XmppInputConfig, pipeline: Pipeline) -> Self {
        Self::with_connector(config, TokioXmppConnector, pipeline)
    }
}

impl<C: Connector> XmppInput<C> {
    pub fn with_connector(config: XmppInputConfig, connector: C, pipeline: Pipeline) -> Self {
        Self {
            config,
            connector,
            pipeline,
        }
    }

    /// Run the input until `shutdown` fires or the session is lost.
    ///
    /// Rooms are joined before the direct-message observer is installed.
    /// Failing to connect or authenticate is returned immediately; failing to
    /// join a room is not.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        if self.config.debug {
            warn!("xmpp `debug` is deprecated, raise the log level instead");
        }

        let settings = ConnectSettings::from_config(&self.config)?;
        let mut session = tokio::select! {
            () = shutdown.cancelled() => {
                info!("shutdown requested before the session came online");
                return Ok(());
            },
            session = Session::connect(&self.connector, settings) => session?,
        };

        let joined = join_rooms(&mut session, &self.config.rooms, &self.pipeline).await;
        if joined.len() < self.config.rooms.len() {
            warn!(
                joined = joined.len(),
                configured = self.config.rooms.len(),
                "some rooms could not be joined"
            );
        }
        register_direct_observer(&mut session, &self.pipeline);

        run_loop(session, shutdown).await
    }
}
