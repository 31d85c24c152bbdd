//! Bot runtime - startup sequence and background workers
//!
//! Startup order is fixed: connect transport, load plugins (the only
//! phase that writes the registry), run at-start hooks, then start the
//! keep-alive and job workers next to the dispatch loop. The registry is
//! complete before any worker starts, so dispatch never observes a
//! partially populated registry.
//!
//! None of the three loops exits under normal operation; the
//! cancellation token exists so embedders and tests get a clean stop,
//! production passes a token that is never cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::errors::{BotError, ConfigError};
use crate::application::routing::Dispatcher;
use crate::domain::traits::{ChatClient, JobScheduler};
use crate::infrastructure::config::Config;
use crate::infrastructure::jobs::InProcessScheduler;
use crate::plugins::{PluginLoader, Registry};

/// Interval between keep-alive pings. Fixed, not configurable.
pub const KEEP_ALIVE_PERIOD: Duration = Duration::from_secs(60);

/// Process lifecycle phase. `Running` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Init,
    LoadingPlugins,
    Running,
}

/// Orchestrates the running bot: transport client, registry, plugin
/// loading and the three concurrent loops.
pub struct Bot {
    config: Config,
    client: Arc<dyn ChatClient>,
    scheduler: Arc<dyn JobScheduler>,
    loader: PluginLoader,
    state: RuntimeState,
}

impl Bot {
    /// Validate the configuration and assemble the runtime.
    ///
    /// Fails fast on configuration errors; a bot that cannot construct
    /// must not start.
    pub fn new(config: Config, client: Arc<dyn ChatClient>) -> Result<Self, BotError> {
        if config.transport.api_version < 4 {
            return Err(ConfigError::InvalidValue(format!(
                "unsupported transport API version {}, relay-bot requires 4+",
                config.transport.api_version
            ))
            .into());
        }

        Ok(Self {
            config,
            client,
            scheduler: Arc::new(InProcessScheduler::new()),
            loader: PluginLoader::new(),
            state: RuntimeState::Init,
        })
    }

    /// Replace the default in-process scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn JobScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the default plugin loader (custom discovery strategies).
    pub fn with_loader(mut self, loader: PluginLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// Run the bot until `shutdown` is cancelled or the transport closes.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), BotError> {
        self.client.connect().await?;
        info!("connected to chat server");

        self.state = RuntimeState::LoadingPlugins;
        let mut registry = Registry::new();
        self.loader.init_plugins(&mut registry, &self.config.plugins);

        // At-start hooks run once, after loading and before dispatch.
        // One failing hook does not block the others.
        for hook in registry.at_start_hooks() {
            if let Err(e) = hook(Arc::clone(&self.client)) {
                error!("at_start hook failed: {}", e);
            }
        }

        self.state = RuntimeState::Running;
        let registry = Arc::new(registry);
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&self.client),
            self.config.default_reply.clone(),
        );

        let keep_alive = tokio::spawn(keep_active(
            Arc::clone(&self.client),
            shutdown.clone(),
        ));
        let jobs = tokio::spawn(run_jobs(
            Arc::clone(&self.scheduler),
            Duration::from_secs(self.config.job_trigger_period),
            shutdown.clone(),
        ));

        dispatcher.run(shutdown.clone()).await;

        // Only reachable after cancellation or transport close
        shutdown.cancel();
        let _ = keep_alive.await;
        let _ = jobs.await;
        Ok(())
    }
}

/// Keep-alive worker: ping the transport every [`KEEP_ALIVE_PERIOD`],
/// forever.
async fn keep_active(client: Arc<dyn ChatClient>, shutdown: CancellationToken) {
    info!("keep active task started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(KEEP_ALIVE_PERIOD) => {
                if let Err(e) = client.ping().await {
                    warn!("keep-alive ping failed: {}", e);
                }
            }
        }
    }
}

/// Job worker: trigger due scheduled jobs every `period`, forever.
async fn run_jobs(scheduler: Arc<dyn JobScheduler>, period: Duration, shutdown: CancellationToken) {
    info!("job running task started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(period) => {
                debug!("triggering pending jobs");
                scheduler.run_pending();
            }
        }
    }
}
