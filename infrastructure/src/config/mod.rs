//! Configuration file loading for superbuilder-client
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `SUPERBUILDER_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./superbuilder.toml` or `./.superbuilder.toml`
//! 4. Global: `$XDG_CONFIG_HOME/superbuilder-client/config.toml`
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileClientConfig, FileConfig, FileConnectionConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;
