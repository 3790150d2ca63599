pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod identity;
pub mod platform;
pub mod progress;
pub mod scanner;
pub mod seen;
pub mod selector;

pub use config::AppConfig;
pub use engine::{SelectionRequest, SessionEngine, SessionOutcome};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use selector::DedupMode;
