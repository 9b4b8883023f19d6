use crate::utils::error::{FormatterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub renderer: RendererConfig,
    pub preview: PreviewConfig,
    pub chart: ChartConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub wkhtmltopdf_path: String,
    pub timeout_seconds: u64,
    pub escape_html: bool,
    pub extra_args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            wkhtmltopdf_path: "wkhtmltopdf".to_string(),
            timeout_seconds: 60,
            escape_html: true,
            extra_args: vec!["--encoding".to_string(), "utf-8".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub rows: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { rows: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { width: 40 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./downloads".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FormatterError::ConfigError {
            message: format!("Cannot read '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FormatterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WKHTMLTOPDF_PATH})；找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("renderer.wkhtmltopdf_path", &self.renderer.wkhtmltopdf_path)?;
        validate_path("renderer.wkhtmltopdf_path", &self.renderer.wkhtmltopdf_path)?;
        validate_range("renderer.timeout_seconds", self.renderer.timeout_seconds, 1, 3600)?;
        validate_range("preview.rows", self.preview.rows, 1, 1000)?;
        validate_range("chart.width", self.chart.width, 10, 200)?;
        validate_path("output.path", &self.output.path)?;
        validate_one_of("logging.level", &self.logging.level, &LOG_LEVELS)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.preview.rows, 5);
        assert_eq!(config.renderer.wkhtmltopdf_path, "wkhtmltopdf");
        assert!(config.renderer.escape_html);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[renderer]
wkhtmltopdf_path = "/usr/local/bin/wkhtmltopdf"
timeout_seconds = 15
escape_html = false
extra_args = ["--page-size", "A4"]

[preview]
rows = 10

[chart]
width = 60

[output]
path = "./out"

[logging]
level = "debug"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.renderer.timeout_seconds, 15);
        assert!(!config.renderer.escape_html);
        assert_eq!(config.renderer.extra_args, vec!["--page-size", "A4"]);
        assert_eq!(config.preview.rows, 10);
        assert_eq!(config.chart.width, 60);
        assert_eq!(config.output.path, "./out");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DATA_FORMATTER_TEST_ENGINE", "/opt/engine/wkhtmltopdf");

        let toml_content = r#"
[renderer]
wkhtmltopdf_path = "${DATA_FORMATTER_TEST_ENGINE}"

[output]
path = "${DATA_FORMATTER_TEST_UNSET_VARIABLE}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.renderer.wkhtmltopdf_path, "/opt/engine/wkhtmltopdf");
        assert_eq!(config.output.path, "${DATA_FORMATTER_TEST_UNSET_VARIABLE}");

        std::env::remove_var("DATA_FORMATTER_TEST_ENGINE");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str("[preview]\nrows = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[logging]\nlevel = \"chatty\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[renderer]\nwkhtmltopdf_path = \"\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = AppConfig::from_toml_str("[preview\nrows = 5").unwrap_err();
        assert!(matches!(err, FormatterError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"./from-file\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path, "./from-file");

        assert!(AppConfig::from_file("/nonexistent/data-formatter.toml").is_err());
    }
}
