//! Tendências sobre a série diária.

use crate::analysis::summary::{DailySummary, GrowthMetrics};

/// Variação percentual entre o primeiro e o último valor.
///
/// Retorna 0.0 com menos de dois pontos ou quando o valor inicial é zero.
pub fn percentage_change(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&start), Some(&end)) if values.len() >= 2 && start != 0.0 => {
            (end - start) / start * 100.0
        }
        _ => 0.0,
    }
}

/// Crescimento de ROI, conversão e gasto ao longo da série
pub fn growth_metrics(daily: &[DailySummary]) -> GrowthMetrics {
    let roi: Vec<f64> = daily.iter().map(|d| d.avg_roi).collect();
    let conversion: Vec<f64> = daily.iter().map(|d| d.avg_conversion).collect();
    let spend: Vec<f64> = daily.iter().map(|d| d.daily_spend).collect();

    GrowthMetrics {
        roi_growth: percentage_change(&roi),
        conversion_growth: percentage_change(&conversion),
        spend_growth: percentage_change(&spend),
    }
}

/// Média móvel do ROI médio diário para uma janela
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverage {
    pub window: usize,
    /// Um valor por dia; `None` enquanto a janela não está completa
    pub values: Vec<Option<f64>>,
}

/// Médias móveis do ROI diário para cada janela informada
pub fn moving_averages(daily: &[DailySummary], windows: &[usize]) -> Vec<MovingAverage> {
    windows
        .iter()
        .filter(|w| **w > 0)
        .map(|&window| {
            let values = (0..daily.len())
                .map(|i| {
                    if i + 1 < window {
                        None
                    } else {
                        let slice = &daily[i + 1 - window..=i];
                        Some(slice.iter().map(|d| d.avg_roi).sum::<f64>() / window as f64)
                    }
                })
                .collect();
            MovingAverage { window, values }
        })
        .collect()
}
