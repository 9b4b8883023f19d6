pub mod cli;
pub mod toml_config;

pub use toml_config::{
    AppConfig, ChartConfig, LoggingConfig, OutputConfig, PreviewConfig, RendererConfig,
};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use crate::utils::error::Result;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "data-formatter")]
#[command(about = "Preview, clean and convert CSV, Excel and Word files")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory where converted files are saved
    #[arg(long)]
    pub output_path: Option<String>,

    /// Path to the wkhtmltopdf executable
    #[arg(long)]
    pub wkhtmltopdf: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Files to upload when the session starts
    pub files: Vec<String>,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if let Some(engine) = &self.wkhtmltopdf {
            config.renderer.wkhtmltopdf_path = engine.clone();
        }
        Ok(config)
    }
}
