//! Plugin capability and build lifecycle hooks.
//!
//! Plugins are opaque to the configuration engine: it appends them and hands
//! them to the bundler host, which calls [`Plugin::attach`] once with a
//! [`BuildHooks`] registry. The host later fires the hooks as the build
//! progresses.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A unit attached to the bundler's build lifecycle.
pub trait Plugin: Send + Sync {
    /// Name used in diagnostics and serialized snapshots.
    fn name(&self) -> &str;

    /// Register lifecycle callbacks.
    fn attach(&self, hooks: &mut BuildHooks);
}

/// Shared handle to a plugin. Cloning a configuration shares plugin units,
/// never plugin lists.
pub type SharedPlugin = Arc<dyn Plugin>;

/// Content of an emitted artifact as handed over by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmittedAsset {
    /// Content held in memory
    Bytes(Arc<[u8]>),
    /// Content already written to this path
    OnDisk(PathBuf),
}

impl From<Vec<u8>> for EmittedAsset {
    fn from(bytes: Vec<u8>) -> Self {
        EmittedAsset::Bytes(bytes.into())
    }
}

impl From<&[u8]> for EmittedAsset {
    fn from(bytes: &[u8]) -> Self {
        EmittedAsset::Bytes(bytes.into())
    }
}

impl From<&str> for EmittedAsset {
    fn from(text: &str) -> Self {
        EmittedAsset::Bytes(text.as_bytes().into())
    }
}

type WatchHook = Box<dyn Fn() + Send + Sync>;
type AssetHook = Box<dyn Fn(&str, &EmittedAsset) + Send + Sync>;

/// Registry of lifecycle callbacks, populated by plugins and fired by the host.
#[derive(Default)]
pub struct BuildHooks {
    watch_run: Vec<WatchHook>,
    asset_emitted: Vec<AssetHook>,
    watch_close: Vec<WatchHook>,
}

impl BuildHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach every plugin, in order, to a fresh registry.
    pub fn from_plugins<'a>(plugins: impl IntoIterator<Item = &'a SharedPlugin>) -> Self {
        let mut hooks = Self::new();
        for plugin in plugins {
            tracing::debug!(plugin = plugin.name(), "attaching plugin");
            plugin.attach(&mut hooks);
        }
        hooks
    }

    /// Called when a watch session (re)starts compiling.
    pub fn on_watch_run(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.watch_run.push(Box::new(hook));
    }

    /// Called for every artifact the bundler emits.
    pub fn on_asset_emitted(&mut self, hook: impl Fn(&str, &EmittedAsset) + Send + Sync + 'static) {
        self.asset_emitted.push(Box::new(hook));
    }

    /// Called when the watch session ends.
    pub fn on_watch_close(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.watch_close.push(Box::new(hook));
    }

    pub fn emit_watch_run(&self) {
        for hook in &self.watch_run {
            hook();
        }
    }

    pub fn emit_asset_emitted(&self, file: &str, asset: &EmittedAsset) {
        for hook in &self.asset_emitted {
            hook(file, asset);
        }
    }

    pub fn emit_watch_close(&self) {
        for hook in &self.watch_close {
            hook();
        }
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.watch_run.len() + self.asset_emitted.len() + self.watch_close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BuildHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildHooks")
            .field("watch_run", &self.watch_run.len())
            .field("asset_emitted", &self.asset_emitted.len())
            .field("watch_close", &self.watch_close.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Plugin for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn attach(&self, hooks: &mut BuildHooks) {
            let log = Arc::clone(&self.log);
            hooks.on_watch_run(move || log.lock().unwrap().push("run".to_string()));
            let log = Arc::clone(&self.log);
            hooks.on_asset_emitted(move |file, _| log.lock().unwrap().push(file.to_string()));
            let log = Arc::clone(&self.log);
            hooks.on_watch_close(move || log.lock().unwrap().push("close".to_string()));
        }
    }

    #[test]
    fn hooks_fire_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugin: SharedPlugin = Arc::new(Recorder { log: Arc::clone(&log) });
        let hooks = BuildHooks::from_plugins(&[plugin]);
        assert_eq!(hooks.len(), 3);

        hooks.emit_watch_run();
        hooks.emit_asset_emitted("main.js", &EmittedAsset::from("x"));
        hooks.emit_watch_close();

        assert_eq!(*log.lock().unwrap(), vec!["run", "main.js", "close"]);
    }

    #[test]
    fn plugin_attached_twice_fires_twice() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugin: SharedPlugin = Arc::new(Recorder { log: Arc::clone(&log) });
        let hooks = BuildHooks::from_plugins(&[Arc::clone(&plugin), plugin]);

        hooks.emit_watch_run();
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
