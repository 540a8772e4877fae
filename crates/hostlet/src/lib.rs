//! hostlet: native messaging host for the companion browser extension.

pub mod bridge;
pub mod host;
pub mod launcher;

pub use bridge::codec::FrameError;
pub use bridge::protocol::{Request, Response};
pub use host::Host;
pub use launcher::{LaunchError, LauncherConfig, ServerLauncher, ServerSpawner, SpawnedServer};
