//! Modelo tipado das campanhas após limpeza e enriquecimento.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Nomes das colunas do arquivo de entrada
pub mod columns {
    pub const CAMPAIGN_ID: &str = "Campaign_ID";
    pub const DATE: &str = "Date";
    pub const CHANNEL: &str = "Channel_Used";
    pub const SEGMENT: &str = "Customer_Segment";
    pub const IMPRESSIONS: &str = "Impressions";
    pub const CLICKS: &str = "Clicks";
    pub const ACQUISITION_COST: &str = "Acquisition_Cost";
    pub const CONVERSION_RATE: &str = "Conversion_Rate";
    pub const ROI: &str = "ROI";
    pub const ENGAGEMENT_SCORE: &str = "Engagement_Score";

    /// Colunas exigidas no cabeçalho do CSV
    pub const REQUIRED: [&str; 10] = [
        CAMPAIGN_ID,
        DATE,
        CHANNEL,
        SEGMENT,
        IMPRESSIONS,
        CLICKS,
        ACQUISITION_COST,
        CONVERSION_RATE,
        ROI,
        ENGAGEMENT_SCORE,
    ];
}

/// Uma linha campanha-dia já limpa
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRecord {
    /// Identificador textual; IDs numéricos do CSV viram texto
    pub campaign_id: String,
    pub date: NaiveDate,
    pub channel: String,
    pub segment: String,
    pub impressions: u64,
    pub clicks: u64,
    pub acquisition_cost: f64,
    pub conversion_rate: f64,
    pub roi: f64,
    pub engagement_score: f64,
}

/// Métricas derivadas de uma linha.
///
/// Denominadores não são protegidos: zero cliques ou zero impressões
/// produzem valores não finitos (infinito ou NaN).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub total_conversions: f64,
    pub cpa: f64,
}

impl DerivedMetrics {
    pub fn compute(record: &CampaignRecord) -> Self {
        let clicks = record.clicks as f64;
        let impressions = record.impressions as f64;
        let cost = record.acquisition_cost;
        let total_conversions = record.conversion_rate * clicks;

        Self {
            ctr: clicks / impressions,
            cpc: cost / clicks,
            cpm: cost / impressions * 1000.0,
            total_conversions,
            cpa: cost / total_conversions,
        }
    }
}

/// Métricas de eficiência por linha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyMetrics {
    /// ROI * custo / custo, NaN quando o custo é zero
    pub roas: f64,
    /// Conversões por unidade monetária gasta
    pub cost_efficiency: f64,
    pub efficiency_score: f64,
}

impl EfficiencyMetrics {
    pub fn compute(record: &CampaignRecord, derived: &DerivedMetrics) -> Self {
        let cost = record.acquisition_cost;
        Self {
            roas: record.roi * cost / cost,
            cost_efficiency: derived.total_conversions / cost,
            efficiency_score: record.roi * 0.4
                + record.conversion_rate * 0.3
                + derived.ctr * 0.2
                + (record.engagement_score / 10.0) * 0.1,
        }
    }
}

/// Faixa de ROI: limites inferiores inclusivos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RoiCategory {
    Low,
    Medium,
    High,
}

impl RoiCategory {
    pub fn from_roi(roi: f64) -> Self {
        if roi >= 7.0 {
            RoiCategory::High
        } else if roi >= 5.0 {
            RoiCategory::Medium
        } else {
            RoiCategory::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoiCategory::High => "high",
            RoiCategory::Medium => "medium",
            RoiCategory::Low => "low",
        }
    }
}

/// Faixa de engajamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EngagementCategory {
    LowEngagement,
    Engaging,
    VeryEngaging,
}

impl EngagementCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            EngagementCategory::VeryEngaging
        } else if score >= 6.0 {
            EngagementCategory::Engaging
        } else {
            EngagementCategory::LowEngagement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngagementCategory::VeryEngaging => "very engaging",
            EngagementCategory::Engaging => "engaging",
            EngagementCategory::LowEngagement => "low engagement",
        }
    }
}

/// Faixa de taxa de conversão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ConversionCategory {
    Low,
    Medium,
    High,
}

impl ConversionCategory {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 0.10 {
            ConversionCategory::High
        } else if rate >= 0.05 {
            ConversionCategory::Medium
        } else {
            ConversionCategory::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConversionCategory::High => "high",
            ConversionCategory::Medium => "medium",
            ConversionCategory::Low => "low",
        }
    }
}

macro_rules! display_label {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(RoiCategory, EngagementCategory, ConversionCategory);

/// Registro limpo acrescido das métricas e categorias derivadas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: CampaignRecord,
    pub metrics: DerivedMetrics,
    pub efficiency: EfficiencyMetrics,
    pub roi_category: RoiCategory,
    pub engagement_category: EngagementCategory,
    pub conversion_category: ConversionCategory,
}

impl EnrichedRecord {
    pub fn new(record: CampaignRecord) -> Self {
        let metrics = DerivedMetrics::compute(&record);
        let efficiency = EfficiencyMetrics::compute(&record, &metrics);
        Self {
            roi_category: RoiCategory::from_roi(record.roi),
            engagement_category: EngagementCategory::from_score(record.engagement_score),
            conversion_category: ConversionCategory::from_rate(record.conversion_rate),
            record,
            metrics,
            efficiency,
        }
    }
}

/// Tabela de trabalho enriquecida. Cada etapa produz uma tabela nova.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignTable {
    records: Vec<EnrichedRecord>,
}

impl CampaignTable {
    pub fn new(records: Vec<EnrichedRecord>) -> Self {
        Self { records }
    }

    pub fn from_records(records: Vec<CampaignRecord>) -> Self {
        Self::new(records.into_iter().map(EnrichedRecord::new).collect())
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnrichedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CampaignTable {
    type Item = &'a EnrichedRecord;
    type IntoIter = std::slice::Iter<'a, EnrichedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
