//! Live-reload notifications for bundler watch sessions.
//!
//! [`LiveReloadPlugin`] taps the bundler's watch hooks and feeds a
//! [`ReloadPipeline`]. The pipeline fingerprints every emitted artifact,
//! ignores content it has already seen in the current session, and after a
//! quiet period sends the changed file names to every registered listener
//! as one batch.
//!
//! ```text
//! watch_run ──┐
//! asset ──────┼─> ReloadHandle ─> pipeline task ─(debounce)─> ListenerRegistry
//! watch_close ┘
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod listener;
pub mod pipeline;
pub mod plugin;
pub mod state;

pub use config::ReloadConfig;
pub use error::{FingerprintError, ListenerDeliveryError, ReloadError, Result};
pub use fingerprint::{fingerprint, Fingerprint};
pub use listener::{BroadcastReport, ChannelListener, ListenerId, ListenerRegistry, ReloadListener};
pub use pipeline::{PipelineEvent, ReloadHandle, ReloadPipeline};
pub use plugin::LiveReloadPlugin;
pub use state::{NotifierState, Recorded, SessionState};
