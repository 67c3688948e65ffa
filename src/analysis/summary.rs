//! Tabelas de resumo produzidas pelas agregações e pelo motor de consultas.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Métricas globais da tabela
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub avg_conversion_rate: f64,
    pub avg_roi: f64,
    pub total_spend: f64,
    /// Média apenas dos CTR finitos
    pub avg_ctr: f64,
    pub avg_engagement: f64,
    pub campaign_count: usize,
}

/// Uma linha de resumo por chave de grupo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary<K> {
    pub key: K,
    pub avg_conversion: f64,
    pub avg_roi: f64,
    pub campaign_count: usize,
    pub avg_engagement: f64,
    pub total_cost: f64,
}

/// Chave composta do cruzamento segmento × canal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentChannel {
    pub segment: String,
    pub channel: String,
}

impl SegmentChannel {
    pub fn new(segment: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for SegmentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.segment, self.channel)
    }
}

/// Resumo diário, em ordem cronológica
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg_roi: f64,
    pub avg_conversion: f64,
    pub total_clicks: u64,
    pub daily_spend: f64,
    pub campaign_count: usize,
}

/// Coorte (mês de início, segmento)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    /// Primeiro dia do mês
    pub cohort_month: NaiveDate,
    pub segment: String,
    /// Identificadores de campanha distintos
    pub campaigns: usize,
    pub avg_roi: f64,
    pub avg_conversion: f64,
}

/// KPIs calculados pelo agregador nativo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub overall: OverallMetrics,
    pub channels: Vec<GroupSummary<String>>,
    pub segments: Vec<GroupSummary<String>>,
    pub temporal: Vec<DailySummary>,
    /// Cruzamento segmento × canal sem filtro de tamanho
    pub segment_channel_all: Vec<GroupSummary<SegmentChannel>>,
}

/// Resultados do motor de consultas
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvancedAnalysis {
    pub segment_channel: Vec<GroupSummary<SegmentChannel>>,
    pub cohorts: Vec<CohortSummary>,
}

/// Variação percentual entre o primeiro e o último dia
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GrowthMetrics {
    pub roi_growth: f64,
    pub conversion_growth: f64,
    pub spend_growth: f64,
}
