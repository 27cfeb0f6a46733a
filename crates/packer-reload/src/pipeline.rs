//! The debounce driver.
//!
//! One task owns the [`NotifierState`] and the single debounce deadline.
//! Lifecycle events arrive over an unbounded channel and are handled strictly
//! in arrival order; the deadline is the only other wake-up source. Every
//! qualifying change replaces the deadline, so a burst of emissions collapses
//! into one broadcast once the bundler has been quiet for the configured
//! window.

use std::time::Duration;

use packer_config::EmittedAsset;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::ReloadConfig;
use crate::error::{ReloadError, Result};
use crate::fingerprint::fingerprint;
use crate::listener::{ListenerId, ListenerRegistry};
use crate::state::{NotifierState, Recorded};

/// Input to the pipeline task.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    SessionStarted,
    ArtifactEmitted { file: String, asset: EmittedAsset },
    SessionEnded,
}

/// Cloneable sending side of a running pipeline.
///
/// The task stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct ReloadHandle {
    tx: mpsc::UnboundedSender<PipelineEvent>,
    registry: ListenerRegistry,
    channel_capacity: usize,
}

impl ReloadHandle {
    pub fn session_started(&self) -> Result<()> {
        self.send(PipelineEvent::SessionStarted)
    }

    pub fn artifact_emitted(
        &self,
        file: impl Into<String>,
        asset: impl Into<EmittedAsset>,
    ) -> Result<()> {
        self.send(PipelineEvent::ArtifactEmitted {
            file: file.into(),
            asset: asset.into(),
        })
    }

    pub fn session_ended(&self) -> Result<()> {
        self.send(PipelineEvent::SessionEnded)
    }

    pub fn send(&self, event: PipelineEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| ReloadError::PipelineClosed)
    }

    /// Connect a new channel listener sized by the pipeline configuration.
    pub fn subscribe(&self) -> (ListenerId, mpsc::Receiver<Vec<String>>) {
        self.registry.register_channel(self.channel_capacity)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct ReloadPipeline {
    state: NotifierState,
    registry: ListenerRegistry,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl ReloadPipeline {
    /// Start the pipeline task on the current tokio runtime.
    pub fn spawn(config: ReloadConfig, registry: ListenerRegistry) -> (ReloadHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = Self {
            state: NotifierState::new(),
            registry: registry.clone(),
            debounce: config.debounce(),
            deadline: None,
        };
        let task = tokio::spawn(pipeline.run(rx));

        let handle = ReloadHandle {
            tx,
            registry,
            channel_capacity: config.channel_capacity,
        };
        (handle, task)
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<PipelineEvent>) {
        tracing::debug!(debounce_ms = self.debounce.as_millis() as u64, "reload pipeline started");
        loop {
            let deadline = self.deadline;
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.flush();
                }
            }
        }
        tracing::debug!("reload pipeline stopped");
    }

    async fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::SessionStarted => {
                if self.state.start_session() {
                    tracing::debug!("watch session started");
                }
            }
            PipelineEvent::ArtifactEmitted { file, asset } => {
                if !self.state.session().is_active() {
                    tracing::debug!(file = %file, "no watch session, artifact ignored");
                    return;
                }
                let fingerprint = match fingerprint(&file, &asset).await {
                    Ok(fingerprint) => fingerprint,
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping artifact");
                        return;
                    }
                };
                match self.state.record(&file, fingerprint) {
                    Recorded::Queued => {
                        tracing::debug!(file = %file, "artifact changed");
                        self.deadline = Some(Instant::now() + self.debounce);
                    }
                    Recorded::Unchanged | Recorded::Dropped => {}
                }
            }
            PipelineEvent::SessionEnded => {
                self.deadline = None;
                let discarded = self.state.end_session();
                tracing::debug!(discarded, "watch session ended");
            }
        }
    }

    fn flush(&mut self) {
        let Some(files) = self.state.take_batch() else {
            return;
        };
        let report = self.registry.broadcast(&files);
        tracing::info!(
            files = files.len(),
            delivered = report.delivered,
            failed = report.failed,
            "notified reload listeners"
        );
    }
}
