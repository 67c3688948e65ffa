//! # mktrs - Análise de campanhas de marketing em Rust
//!
//! Pipeline em lote que lê um CSV de campanhas, limpa os campos monetários e
//! de data, deriva métricas de eficiência, agrega KPIs, executa consultas SQL
//! sobre a tabela enriquecida e gera gráficos e um relatório.
//!
//! ## Exemplo Rápido
//!
//! ```rust,no_run
//! use mktrs::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = AnalysisConfig::builder()
//!         .data_file("data/raw/marketing_campaign_dataset.csv")
//!         .reports_dir("reports")
//!         .build()?;
//!
//!     let result = Pipeline::standard(config)?.execute().await?;
//!     println!("ROI médio: {:.2}", result.kpis.overall.avg_roi);
//!     Ok(())
//! }
//! ```
//!
//! ## Arquitetura
//!
//! ### Extração e limpeza
//! [`Extractor`] lê linhas não tipadas ([`DataRow`]); [`Transformer`]s limpam
//! o custo de aquisição e a data.
//!
//! ### Métricas e agregações
//! As linhas limpas viram uma [`CampaignTable`] tipada com CTR, CPC, CPM,
//! conversões, CPA e as faixas categóricas. O módulo [`analysis`] calcula os
//! KPIs, as tendências e as correlações.
//!
//! ### Consultas
//! Um [`QueryEngine`] recebe a tabela e responde o cruzamento
//! segmento × canal e as coortes mensais.
//!
//! ### Saídas
//! Gráficos Plotly em [`chart`] e documentos via [`DocumentRenderer`]. Falhas
//! nesta etapa não interrompem a execução.

pub mod analysis;
pub mod campaign;
pub mod chart;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod telemetry;
pub mod traits;
pub mod transform;
pub mod types;

// Re-exports para facilitar o uso
pub use campaign::{CampaignRecord, CampaignTable, EnrichedRecord};
pub use config::AnalysisConfig;
pub use error::{MarketingError, Result};
pub use events::{InMemoryEventEmitter, LoggingEventEmitter};
pub use pipeline::{Pipeline, PipelineBuilder, StandardPipeline};
pub use traits::*;
pub use types::{DataRow, DataValue, PipelineEvent, PipelineResult, PipelineState};

/// Prelude com imports mais comuns
pub mod prelude {
    pub use crate::campaign::{CampaignRecord, CampaignTable, EnrichedRecord};
    pub use crate::config::{AnalysisConfig, LogFormat};
    pub use crate::error::{MarketingError, Result};
    pub use crate::events::{InMemoryEventEmitter, LoggingEventEmitter};
    pub use crate::pipeline::{Pipeline, StandardPipeline};
    pub use crate::traits::{DocumentRenderer, EventEmitter, Extractor, QueryEngine, Transformer};
    pub use crate::types::{DataRow, DataValue, PipelineEvent, PipelineResult, PipelineState};

    // Etapas
    pub use crate::extract::csv::CsvExtractor;
    pub use crate::query::SqliteEngine;
    pub use crate::report::{HtmlReportRenderer, QuartoRenderer};
    pub use crate::transform::common::CompositeTransformer;
    pub use crate::transform::default_cleaning;
    pub use crate::transform::derive::derive_metrics;

    // Análises
    pub use crate::analysis::aggregate::calculate_kpis;
    pub use crate::analysis::correlation::Metric;
    pub use crate::analysis::summary::{AdvancedAnalysis, GrowthMetrics, Kpis};
}

/// Informações sobre a versão da biblioteca
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Informações sobre a biblioteca
pub fn about() -> &'static str {
    env!("CARGO_PKG_DESCRIPTION")
}
