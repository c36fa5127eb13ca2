pub mod cli;
pub mod toml_config;

use crate::core::dedup::DEFAULT_THRESHOLD;
use crate::core::{ConfigProvider, ReportFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
use crate::utils::error::DedupError;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "apdups", version)]
#[command(about = "Detect duplicates in AdvicePro spreadsheet")]
pub struct CliConfig {
    /// CSV export file from AdvicePro
    pub input: Option<String>,

    /// Path to output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional TOML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Minimum score (0.0 - 1.0) for a pair to be reported
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Score pairs on all cores (needs the `parallel` feature)
    #[arg(long)]
    pub parallel: bool,

    /// Log memory and CPU time per phase
    #[arg(long)]
    pub monitor: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

/// Settings for one run after merging the settings file and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input_path: String,
    pub output_path: Option<String>,
    pub threshold: f64,
    pub format: ReportFormat,
    pub parallel: bool,
    pub monitor: bool,
}

impl RunConfig {
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: None,
            threshold: DEFAULT_THRESHOLD,
            format: ReportFormat::default(),
            parallel: false,
            monitor: false,
        }
    }

    /// 命令列參數優先於設定檔
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading settings from: {}", path);
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };

        let input_path = cli
            .input
            .clone()
            .or_else(|| file.input_path().map(str::to_string))
            .ok_or_else(|| DedupError::MissingConfigError {
                field: "input".to_string(),
            })?;

        Ok(Self {
            input_path,
            output_path: cli
                .output
                .clone()
                .or_else(|| file.output_path().map(str::to_string)),
            threshold: cli
                .threshold
                .or(file.threshold())
                .unwrap_or(DEFAULT_THRESHOLD),
            format: cli.format.or(file.report_format()).unwrap_or_default(),
            parallel: cli.parallel || file.parallel(),
            monitor: cli.monitor || file.monitoring_enabled(),
        })
    }
}

impl ConfigProvider for RunConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn report_format(&self) -> ReportFormat {
        self.format
    }

    fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input_path)?;
        validation::validate_file_extension("input", &self.input_path, &["csv", "txt"])?;
        if let Some(output) = &self.output_path {
            validation::validate_path("output", output)?;
        }
        validation::validate_range("threshold", self.threshold, 0.0, 1.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("clients.csv");
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.format, ReportFormat::Csv);
        assert_eq!(config.output_path(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = RunConfig::new("clients.xlsx");
        assert!(config.validate().is_err());

        config.input_path = "clients.csv".to_string();
        config.threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_settings_file_supplies_everything() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[input]\npath = \"a.csv\"\n[scoring]\nthreshold = 0.4\n[output]\nformat = \"json\"\n[monitoring]\nenabled = true\n")
            .unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from(["apdups", "--config", config_path.as_str()]);
        let config = RunConfig::resolve(&cli).unwrap();

        assert_eq!(config.input_path, "a.csv");
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.monitor);
        assert_eq!(config.output_path, None);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_settings_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[input]\npath = \"from-file.csv\"\n[scoring]\nthreshold = 0.5\n[output]\npath = \"file-report.csv\"\n")
            .unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "apdups",
            "--config",
            config_path.as_str(),
            "--threshold",
            "0.6",
            "cli.csv",
        ]);
        let config = RunConfig::resolve(&cli).unwrap();

        assert_eq!(config.input_path, "cli.csv");
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.output_path.as_deref(), Some("file-report.csv"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_without_input_fails() {
        let cli = CliConfig::parse_from(["apdups"]);
        assert!(matches!(
            RunConfig::resolve(&cli),
            Err(DedupError::MissingConfigError { .. })
        ));
    }
}
