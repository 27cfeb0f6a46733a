use packer_config::{BuildHooks, Plugin};

use crate::pipeline::ReloadHandle;

/// Bundler plugin that forwards watch lifecycle hooks into a reload pipeline.
///
/// ```no_run
/// # async fn demo() {
/// use std::sync::Arc;
/// use packer_reload::{ListenerRegistry, LiveReloadPlugin, ReloadConfig, ReloadPipeline};
///
/// let (handle, _task) = ReloadPipeline::spawn(ReloadConfig::default(), ListenerRegistry::new());
/// let (_id, mut batches) = handle.subscribe();
/// let plugin: packer_config::SharedPlugin = Arc::new(LiveReloadPlugin::new(handle));
/// # let _ = (plugin, batches.recv().await);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LiveReloadPlugin {
    handle: ReloadHandle,
}

impl LiveReloadPlugin {
    pub fn new(handle: ReloadHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ReloadHandle {
        &self.handle
    }
}

impl Plugin for LiveReloadPlugin {
    fn name(&self) -> &str {
        "live-reload"
    }

    fn attach(&self, hooks: &mut BuildHooks) {
        let handle = self.handle.clone();
        hooks.on_watch_run(move || {
            if let Err(err) = handle.session_started() {
                tracing::warn!(error = %err, "watch run not forwarded");
            }
        });

        let handle = self.handle.clone();
        hooks.on_asset_emitted(move |file, asset| {
            if let Err(err) = handle.artifact_emitted(file, asset.clone()) {
                tracing::warn!(file, error = %err, "emitted asset not forwarded");
            }
        });

        let handle = self.handle.clone();
        hooks.on_watch_close(move || {
            if let Err(err) = handle.session_ended() {
                tracing::warn!(error = %err, "watch close not forwarded");
            }
        });
    }
}
