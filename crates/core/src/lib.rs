//! Example sync core library.
//!
//! Mirrors the `examples/` folder of each exchange SDK into a central
//! examples repository: imports are rewritten from SDK-internal relative
//! paths to the published package, install hints are stripped, the result is
//! linted and built, and changes are proposed as a pull request. Also builds
//! the browsable examples index.

pub mod collector;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod git;
pub mod index;
pub mod process;
pub mod publish;
pub mod sync_engine;
pub mod transform;
pub mod verify;

// Re-exports for convenience.
pub use config::{SyncPaths, ToolConfig};
pub use exchange::ExchangeConfig;
pub use process::{ProcessRunner, SystemRunner};
pub use publish::PrOutcome;
pub use sync_engine::{SyncEngine, SyncOptions, SyncOutcome, SyncReport};
pub use transform::{transform_content, Transformer};
