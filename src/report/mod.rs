//! Geração do relatório final.
//!
//! O [`ReportContext`] reúne os resultados calculados e os caminhos dos
//! gráficos; cada [`DocumentRenderer`](crate::traits::DocumentRenderer) o
//! converte em um documento. Os valores são formatados uma única vez em
//! [`ReportView`], compartilhado pelos templates.

pub mod format;
pub mod html;
pub mod quarto;

pub use format::{format_currency, format_decimal, format_percentage};
pub use html::HtmlReportRenderer;
pub use quarto::QuartoRenderer;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use crate::analysis::summary::{AdvancedAnalysis, GroupSummary, GrowthMetrics, Kpis};
use crate::error::{MarketingError, RenderError, Result};

/// Resultados que alimentam o relatório
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub kpis: Kpis,
    pub advanced: AdvancedAnalysis,
    pub growth: GrowthMetrics,
    /// Arquivos de gráfico gravados com sucesso
    pub chart_files: Vec<PathBuf>,
    /// Diretório base dos links para os gráficos
    pub reports_dir: PathBuf,
    /// Quantidade de canais e segmentos destacados
    pub top_n: usize,
}

/// Linha de tabela de resumo já formatada
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub avg_roi: String,
    pub avg_conversion: String,
    pub avg_engagement: String,
    pub total_cost: String,
    pub campaign_count: usize,
}

impl SummaryRow {
    fn from_group<K: Display>(group: &GroupSummary<K>) -> Self {
        Self {
            label: group.key.to_string(),
            avg_roi: format_decimal(group.avg_roi),
            avg_conversion: format_percentage(group.avg_conversion * 100.0),
            avg_engagement: format_decimal(group.avg_engagement),
            total_cost: format_currency(group.total_cost),
            campaign_count: group.campaign_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortRow {
    pub month: String,
    pub segment: String,
    pub campaigns: usize,
    pub avg_roi: String,
    pub avg_conversion: String,
}

/// Link relativo para um gráfico
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLink {
    pub name: String,
    pub href: String,
}

/// Valores do relatório prontos para exibição
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub generated_at: String,
    pub campaign_count: usize,
    pub avg_roi: String,
    pub avg_conversion: String,
    pub avg_ctr: String,
    pub avg_engagement: String,
    pub total_spend: String,
    pub roi_growth: String,
    pub conversion_growth: String,
    pub spend_growth: String,
    pub top_channels: Vec<SummaryRow>,
    pub top_segments: Vec<SummaryRow>,
    pub segment_channel: Vec<SummaryRow>,
    pub segment_channel_all: Vec<SummaryRow>,
    pub cohorts: Vec<CohortRow>,
    pub charts: Vec<ChartLink>,
}

/// Caminho relativo com `/`, independente da plataforma
fn relative_href(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl ReportContext {
    /// Formata todos os valores exibidos
    pub fn view(&self) -> ReportView {
        let overall = &self.kpis.overall;
        ReportView {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            campaign_count: overall.campaign_count,
            avg_roi: format_percentage(overall.avg_roi),
            avg_conversion: format_percentage(overall.avg_conversion_rate * 100.0),
            avg_ctr: format_percentage(overall.avg_ctr * 100.0),
            avg_engagement: format_decimal(overall.avg_engagement),
            total_spend: format_currency(overall.total_spend),
            roi_growth: format_percentage(self.growth.roi_growth),
            conversion_growth: format_percentage(self.growth.conversion_growth),
            spend_growth: format_percentage(self.growth.spend_growth),
            top_channels: self
                .kpis
                .channels
                .iter()
                .take(self.top_n)
                .map(SummaryRow::from_group)
                .collect(),
            top_segments: self
                .kpis
                .segments
                .iter()
                .take(self.top_n)
                .map(SummaryRow::from_group)
                .collect(),
            segment_channel: self
                .advanced
                .segment_channel
                .iter()
                .map(SummaryRow::from_group)
                .collect(),
            segment_channel_all: self
                .kpis
                .segment_channel_all
                .iter()
                .map(SummaryRow::from_group)
                .collect(),
            cohorts: self
                .advanced
                .cohorts
                .iter()
                .map(|c| CohortRow {
                    month: c.cohort_month.format("%Y-%m").to_string(),
                    segment: c.segment.clone(),
                    campaigns: c.campaigns,
                    avg_roi: format_decimal(c.avg_roi),
                    avg_conversion: format_percentage(c.avg_conversion * 100.0),
                })
                .collect(),
            charts: self
                .chart_files
                .iter()
                .map(|path| ChartLink {
                    name: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().replace('_', " "))
                        .unwrap_or_default(),
                    href: relative_href(&self.reports_dir, path),
                })
                .collect(),
        }
    }
}

/// Grava um documento, criando o diretório pai se necessário
pub(crate) async fn write_document(path: &Path, contents: &str) -> Result<()> {
    let write_error = |e: std::io::Error| -> MarketingError {
        RenderError::WriteError {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(write_error)?;
    Ok(())
}
