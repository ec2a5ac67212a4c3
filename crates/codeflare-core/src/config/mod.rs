//! Configuration loading.
//!
//! # Hierarchy
//!
//! Later layers override earlier ones:
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/codeflare/config.toml`
//! 3. Project config: `.codeflare/config.toml`
//! 4. Environment variables: `CODEFLARE_*`
//!
//! An explicit config file given on the command line replaces layers 2 and 3.
//!
//! # Example Config
//!
//! ```toml
//! namespace = "codeflare"
//!
//! [log]
//! level = "info"
//!
//! [suggestions]
//! enabled = true
//! max_distance = 2
//! ```

mod load;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;

pub use load::{global_config_path, load_config, load_toml_file, project_config_path};
pub use types::{
    Config, LogConfig, PartialConfig, PartialLogConfig, PartialSuggestionConfig, SuggestionConfig,
};
