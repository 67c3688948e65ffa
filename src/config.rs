use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::analysis::correlation::Metric;
use crate::error::{ConfigError, MarketingError, Result};

/// Configuração principal da análise
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathsConfig,
    pub analysis: AnalysisSettings,
    pub renderer: RendererConfig,
    pub observability: ObservabilityConfig,
}

/// Caminhos de entrada e saída
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_file: PathBuf,
    pub reports_dir: PathBuf,
    pub templates_dir: PathBuf,
}

/// Parâmetros das análises complementares
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Janelas das médias móveis do ROI diário
    pub moving_average_windows: Vec<usize>,
    /// Quantidade de canais e segmentos destacados no relatório
    pub top_n: usize,
    /// Gera o gráfico de funil
    pub funnel_chart: bool,
    /// Métricas do mapa de correlação; vazio desativa o gráfico
    pub correlation_metrics: Vec<String>,
    /// Segmentos considerados na correlação; ausente usa todos
    pub correlation_segments: Option<Vec<String>>,
}

/// Configuração da renderização de documentos
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Desativa toda a geração de documentos quando falso
    pub enabled: bool,
    /// Gera o relatório HTML próprio
    pub html: bool,
    /// Gera o relatório via ferramenta externa
    pub quarto: bool,
    pub command: String,
    pub output_format: String,
}

/// Configuração de observabilidade
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Formato de log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/raw/marketing_campaign_dataset.csv"),
            reports_dir: PathBuf::from("reports"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            moving_average_windows: vec![7, 30],
            top_n: 3,
            funnel_chart: true,
            correlation_metrics: vec![
                "ROI".to_string(),
                "Conversion_Rate".to_string(),
                "CTR".to_string(),
                "Engagement_Score".to_string(),
                "Acquisition_Cost".to_string(),
            ],
            correlation_segments: None,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            html: true,
            quarto: true,
            command: "quarto".to_string(),
            output_format: "html".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn invalid_value(param: &str, value: impl Into<String>) -> MarketingError {
    MarketingError::Config(ConfigError::InvalidValue {
        param: param.to_string(),
        value: value.into(),
    })
}

impl AnalysisConfig {
    /// Cria um novo builder para configuração
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Carrega os caminhos do ambiente
    pub fn from_env() -> Result<Self> {
        Self::builder().env_overrides().build()
    }

    /// Carrega configuração de arquivo
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Carrega configuração de string TOML
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Métricas do mapa de correlação já interpretadas
    pub fn correlation_metrics(&self) -> Result<Vec<Metric>> {
        self.analysis
            .correlation_metrics
            .iter()
            .map(|name| name.parse::<Metric>())
            .collect()
    }

    /// Valida a configuração
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("paths.data_file", &self.paths.data_file),
            ("paths.reports_dir", &self.paths.reports_dir),
            ("paths.templates_dir", &self.paths.templates_dir),
        ];
        for (param, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(invalid_value(param, ""));
            }
        }

        if self.renderer.command.trim().is_empty() {
            return Err(invalid_value("renderer.command", self.renderer.command.as_str()));
        }

        if self.renderer.output_format.trim().is_empty() {
            return Err(invalid_value("renderer.output_format", ""));
        }

        if self.analysis.moving_average_windows.contains(&0) {
            return Err(invalid_value("analysis.moving_average_windows", "0"));
        }

        if self.analysis.correlation_metrics.len() == 1 {
            return Err(MarketingError::Config(ConfigError::InvalidConfig(
                "analysis.correlation_metrics exige ao menos 2 métricas".to_string(),
            )));
        }

        self.correlation_metrics().map_err(|e| {
            MarketingError::Config(ConfigError::InvalidConfig(e.to_string()))
        })?;

        Ok(())
    }
}

/// Builder para a configuração da análise
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parte de uma configuração existente
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Aplica `MKTRS_DATA_FILE`, `MKTRS_REPORTS_DIR` e `MKTRS_TEMPLATES_DIR`
    pub fn env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("MKTRS_DATA_FILE") {
            self = self.data_file(path);
        }

        if let Ok(path) = std::env::var("MKTRS_REPORTS_DIR") {
            self = self.reports_dir(path);
        }

        if let Ok(path) = std::env::var("MKTRS_TEMPLATES_DIR") {
            self = self.templates_dir(path);
        }

        self
    }

    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.data_file = path.into();
        self
    }

    pub fn reports_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.reports_dir = path.into();
        self
    }

    pub fn templates_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.templates_dir = path.into();
        self
    }

    pub fn moving_average_windows(mut self, windows: Vec<usize>) -> Self {
        self.config.analysis.moving_average_windows = windows;
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.config.analysis.top_n = n;
        self
    }

    pub fn correlation_metrics(mut self, metrics: Vec<String>) -> Self {
        self.config.analysis.correlation_metrics = metrics;
        self
    }

    pub fn render_documents(mut self, enabled: bool) -> Self {
        self.config.renderer.enabled = enabled;
        self
    }

    pub fn renderer_command(mut self, command: impl Into<String>) -> Self {
        self.config.renderer.command = command.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.observability.log_level = level.into();
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.observability.log_format = format;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.paths.data_file,
            PathBuf::from("data/raw/marketing_campaign_dataset.csv")
        );
        assert_eq!(config.paths.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.analysis.moving_average_windows, vec![7, 30]);
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.renderer.command, "quarto");
        assert_eq!(config.renderer.output_format, "html");
        assert_eq!(config.observability.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::builder()
            .data_file("input.csv")
            .reports_dir("out")
            .top_n(5)
            .renderer_command("/opt/quarto/bin/quarto")
            .log_level("debug")
            .build()
            .unwrap();

        assert_eq!(config.paths.data_file, PathBuf::from("input.csv"));
        assert_eq!(config.paths.reports_dir, PathBuf::from("out"));
        assert_eq!(config.analysis.top_n, 5);
        assert_eq!(config.renderer.command, "/opt/quarto/bin/quarto");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_config_validation() {
        assert!(AnalysisConfig::builder().data_file("").build().is_err());
        assert!(AnalysisConfig::builder().renderer_command("  ").build().is_err());
        assert!(AnalysisConfig::builder()
            .moving_average_windows(vec![7, 0])
            .build()
            .is_err());
        assert!(AnalysisConfig::builder()
            .correlation_metrics(vec!["ROI".to_string()])
            .build()
            .is_err());
        assert!(AnalysisConfig::builder()
            .correlation_metrics(vec!["ROI".to_string(), "bounce".to_string()])
            .build()
            .is_err());
        assert!(AnalysisConfig::builder()
            .correlation_metrics(Vec::new())
            .build()
            .is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
        [paths]
        data_file = "data/campanhas.csv"

        [analysis]
        moving_average_windows = [3]
        correlation_metrics = ["ROI", "CTR"]

        [renderer]
        quarto = false

        [observability]
        log_level = "warn"
        log_format = "json"
        "#;

        let config = AnalysisConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.paths.data_file, PathBuf::from("data/campanhas.csv"));
        assert_eq!(config.paths.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.analysis.moving_average_windows, vec![3]);
        assert_eq!(config.analysis.top_n, 3);
        assert!(!config.renderer.quarto);
        assert!(config.renderer.html);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(
            config.correlation_metrics().unwrap(),
            vec![Metric::Roi, Metric::Ctr]
        );
    }

    #[test]
    fn test_config_from_file() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\ntop_n = 7").unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.analysis.top_n, 7);
    }
}
