//! Browser automation for JavaScript-rendered catalog pages.
//!
//! Provides headless Chrome sessions with a randomized user agent and
//! automation markers hidden, behind the [`BrowserActions`] seam so the
//! scanner can be driven by a scripted page in tests.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::{BrowserActions, BrowserSession, ControlState, SessionLauncher};
pub use engine::{BrowserEngine, ChromeSession};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
