pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, AppConfig};

pub use app::session::Session;
pub use core::{engine::FormatterEngine, pdf::WkhtmltopdfRenderer};
pub use utils::error::{FormatterError, Result};
