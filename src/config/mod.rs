#[cfg(feature = "cli")]
pub mod cli;
pub mod site_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, ThemeAction};
pub use site_config::SiteConfig;
