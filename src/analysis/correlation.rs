//! Matriz de correlação entre métricas numéricas.

use std::fmt;
use std::str::FromStr;
use crate::campaign::{CampaignTable, EnrichedRecord};
use crate::error::{ComputationError, MarketingError, Result};

const OPERATION: &str = "correlation_matrix";

/// Métricas numéricas disponíveis para correlação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Impressions,
    Clicks,
    AcquisitionCost,
    ConversionRate,
    Roi,
    EngagementScore,
    Ctr,
    Cpc,
    Cpm,
    TotalConversions,
    Cpa,
}

impl Metric {
    pub fn value(&self, row: &EnrichedRecord) -> f64 {
        let r = &row.record;
        let m = &row.metrics;
        match self {
            Metric::Impressions => r.impressions as f64,
            Metric::Clicks => r.clicks as f64,
            Metric::AcquisitionCost => r.acquisition_cost,
            Metric::ConversionRate => r.conversion_rate,
            Metric::Roi => r.roi,
            Metric::EngagementScore => r.engagement_score,
            Metric::Ctr => m.ctr,
            Metric::Cpc => m.cpc,
            Metric::Cpm => m.cpm,
            Metric::TotalConversions => m.total_conversions,
            Metric::Cpa => m.cpa,
        }
    }

    /// Nome da coluna correspondente
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Impressions => "Impressions",
            Metric::Clicks => "Clicks",
            Metric::AcquisitionCost => "Acquisition_Cost",
            Metric::ConversionRate => "Conversion_Rate",
            Metric::Roi => "ROI",
            Metric::EngagementScore => "Engagement_Score",
            Metric::Ctr => "CTR",
            Metric::Cpc => "CPC",
            Metric::Cpm => "CPM",
            Metric::TotalConversions => "Total_Conversions",
            Metric::Cpa => "CPA",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MarketingError;

    fn from_str(s: &str) -> Result<Self> {
        let metric = match s.trim().to_ascii_lowercase().as_str() {
            "impressions" => Metric::Impressions,
            "clicks" => Metric::Clicks,
            "acquisition_cost" | "cost" => Metric::AcquisitionCost,
            "conversion_rate" => Metric::ConversionRate,
            "roi" => Metric::Roi,
            "engagement_score" => Metric::EngagementScore,
            "ctr" => Metric::Ctr,
            "cpc" => Metric::Cpc,
            "cpm" => Metric::Cpm,
            "total_conversions" => Metric::TotalConversions,
            "cpa" => Metric::Cpa,
            _ => {
                return Err(ComputationError::UnknownMetric {
                    operation: OPERATION,
                    name: s.to_string(),
                }
                .into())
            }
        };
        Ok(metric)
    }
}

/// Coeficiente de Pearson sobre pares em que ambos os valores são finitos.
///
/// NaN quando há menos de dois pares ou variância nula.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Matriz de correlação quadrada, na ordem das métricas informadas
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    pub values: Vec<Vec<f64>>,
}

/// Calcula a matriz de correlação, opcionalmente filtrando segmentos.
///
/// Uma única métrica é um caso degenerado e é rejeitada.
pub fn correlation_matrix(
    table: &CampaignTable,
    metrics: &[Metric],
    segments: Option<&[String]>,
) -> Result<CorrelationMatrix> {
    if metrics.len() < 2 {
        return Err(ComputationError::InvalidParameter {
            operation: OPERATION,
            reason: format!("são necessárias ao menos 2 métricas, recebidas {}", metrics.len()),
        }
        .into());
    }

    let rows: Vec<&EnrichedRecord> = table
        .iter()
        .filter(|r| segments.map_or(true, |s| s.iter().any(|seg| *seg == r.record.segment)))
        .collect();

    let columns: Vec<Vec<f64>> = metrics
        .iter()
        .map(|m| rows.iter().map(|r| m.value(r)).collect())
        .collect();

    let values = (0..metrics.len())
        .map(|i| {
            (0..metrics.len())
                .map(|j| {
                    if i == j {
                        // sem variância a autocorrelação também é indefinida
                        if pearson(&columns[i], &columns[i]).is_nan() {
                            f64::NAN
                        } else {
                            1.0
                        }
                    } else {
                        pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    Ok(CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::fixtures::record;
    use crate::campaign::CampaignTable;

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0, f64::INFINITY, 3.0], &[1.0, 5.0, 3.0]) > 0.99);
    }

    #[test]
    fn test_single_metric_is_rejected() {
        let table = CampaignTable::from_records(vec![record("A", "s", 1.0)]);
        let err = correlation_matrix(&table, &[Metric::Roi], None).unwrap_err();
        assert!(matches!(
            err,
            MarketingError::Computation(ComputationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_segment_filter() {
        let mut a = record("A", "keep", 1.0);
        a.conversion_rate = 0.01;
        let mut b = record("A", "keep", 2.0);
        b.conversion_rate = 0.02;
        let mut c = record("A", "drop", 3.0);
        c.conversion_rate = 0.0;
        let table = CampaignTable::from_records(vec![a, b, c]);

        let keep = vec!["keep".to_string()];
        let matrix =
            correlation_matrix(&table, &[Metric::Roi, Metric::ConversionRate], Some(&keep)).unwrap();
        assert_eq!(matrix.values.len(), 2);
        assert!((matrix.values[0][1] - 1.0).abs() < 1e-12);
        assert_eq!(matrix.values[1][1], 1.0);
    }

    #[test]
    fn test_diagonal_is_undefined_without_variance() {
        let table = CampaignTable::from_records(vec![record("A", "s", 1.0), record("B", "s", 2.0)]);

        let matrix = correlation_matrix(&table, &[Metric::Roi, Metric::Clicks], None).unwrap();
        assert_eq!(matrix.values[0][0], 1.0);
        assert!(matrix.values[1][1].is_nan());

        let none = vec!["inexistente".to_string()];
        let empty =
            correlation_matrix(&table, &[Metric::Roi, Metric::Ctr], Some(&none)).unwrap();
        assert!(empty.values.iter().flatten().all(|v| v.is_nan()));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("ROI".parse::<Metric>().unwrap(), Metric::Roi);
        assert_eq!("Conversion_Rate".parse::<Metric>().unwrap(), Metric::ConversionRate);
        assert!("bounce_rate".parse::<Metric>().is_err());
    }
}
