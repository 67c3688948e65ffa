//! Construtores das figuras. Funções puras: não alteram as tabelas de entrada
//! e aceitam listas vazias, produzindo figuras vazias porém válidas.

use serde_json::{json, Value};
use super::{
    Bar, BoxPlot, Figure, Funnel, Heatmap, Line, Marker, Scatter, Trace, Values, PRIMARY_COLOR,
    SECONDARY_COLOR,
};
use crate::analysis::correlation::{correlation_matrix, Metric};
use crate::analysis::summary::{DailySummary, GroupSummary};
use crate::campaign::CampaignTable;
use crate::error::Result;

/// Diâmetro máximo das bolhas, em pixels
const MAX_BUBBLE_SIZE: f64 = 40.0;

fn horizontal_legend() -> Value {
    json!({
        "orientation": "h",
        "yanchor": "bottom",
        "y": 1.02,
        "xanchor": "right",
        "x": 1
    })
}

fn dates(daily: &[DailySummary]) -> Values {
    daily
        .iter()
        .map(|d| d.date.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .into()
}

fn keys(groups: &[GroupSummary<String>]) -> Values {
    groups.iter().map(|g| g.key.clone()).collect::<Vec<_>>().into()
}

fn line(color: &str) -> Option<Line> {
    Some(Line {
        color: color.to_string(),
        width: 2.0,
    })
}

/// `sizeref` para bolhas por área; contagem máxima zero usa 1.0
fn bubble_sizeref(counts: &[f64]) -> f64 {
    let max = counts.iter().cloned().fold(0.0, f64::max);
    if max > 0.0 {
        2.0 * max / (MAX_BUBBLE_SIZE * MAX_BUBBLE_SIZE)
    } else {
        1.0
    }
}

/// ROI médio e taxa de conversão ao longo do tempo, em eixos y distintos
pub fn temporal_trends(daily: &[DailySummary]) -> Figure {
    let x = dates(daily);
    Figure::new(json!({
        "title": { "text": "Evolução temporal do desempenho" },
        "hovermode": "x unified",
        "xaxis": { "title": { "text": "Data" } },
        "yaxis": { "title": { "text": "ROI" } },
        "yaxis2": {
            "title": { "text": "Taxa de conversão" },
            "overlaying": "y",
            "side": "right"
        },
        "legend": horizontal_legend()
    }))
    .with_trace(Trace::Scatter(Scatter {
        x: x.clone(),
        y: daily.iter().map(|d| d.avg_roi).collect::<Vec<_>>().into(),
        name: "ROI médio".to_string(),
        mode: "lines",
        line: line(PRIMARY_COLOR),
        marker: None,
        text: None,
        xaxis: None,
        yaxis: None,
    }))
    .with_trace(Trace::Scatter(Scatter {
        x,
        y: daily.iter().map(|d| d.avg_conversion).collect::<Vec<_>>().into(),
        name: "Taxa de conversão".to_string(),
        mode: "lines",
        line: line(SECONDARY_COLOR),
        marker: None,
        text: None,
        xaxis: None,
        yaxis: Some("y2".to_string()),
    }))
}

/// Barras de ROI médio e linha de engajamento por canal
pub fn channel_comparison(channels: &[GroupSummary<String>]) -> Figure {
    let x = keys(channels);
    Figure::new(json!({
        "title": { "text": "Desempenho por canal" },
        "barmode": "group",
        "xaxis": { "title": { "text": "Canal" } },
        "yaxis": { "title": { "text": "ROI médio" } },
        "yaxis2": {
            "title": { "text": "Score de engajamento" },
            "overlaying": "y",
            "side": "right"
        },
        "legend": horizontal_legend()
    }))
    .with_trace(Trace::Bar(Bar {
        x: x.clone(),
        y: channels.iter().map(|c| c.avg_roi).collect::<Vec<_>>().into(),
        name: "ROI médio".to_string(),
        marker: Some(Marker {
            color: Some(PRIMARY_COLOR.to_string()),
            ..Marker::default()
        }),
        xaxis: None,
        yaxis: None,
    }))
    .with_trace(Trace::Scatter(Scatter {
        x,
        y: channels.iter().map(|c| c.avg_engagement).collect::<Vec<_>>().into(),
        name: "Score de engajamento".to_string(),
        mode: "lines+markers",
        line: line(SECONDARY_COLOR),
        marker: None,
        text: None,
        xaxis: None,
        yaxis: Some("y2".to_string()),
    }))
}

/// Matriz de bolhas conversão × ROI, uma série por segmento
pub fn segment_matrix(segments: &[GroupSummary<String>]) -> Figure {
    let counts: Vec<f64> = segments.iter().map(|s| s.campaign_count as f64).collect();
    let sizeref = bubble_sizeref(&counts);

    segments.iter().fold(
        Figure::new(json!({
            "title": { "text": "Matriz de desempenho dos segmentos" },
            "xaxis": { "title": { "text": "Taxa de conversão média" } },
            "yaxis": { "title": { "text": "ROI médio" } },
            "showlegend": true,
            "legend": horizontal_legend()
        })),
        |figure, segment| {
            figure.with_trace(Trace::Scatter(Scatter {
                x: vec![segment.avg_conversion].into(),
                y: vec![segment.avg_roi].into(),
                name: segment.key.clone(),
                mode: "markers",
                line: None,
                marker: Some(Marker {
                    size: Some(vec![segment.campaign_count as f64]),
                    sizemode: Some("area"),
                    sizeref: Some(sizeref),
                    sizemin: Some(4.0),
                    ..Marker::default()
                }),
                text: Some(vec![format!("Engajamento: {:.2}", segment.avg_engagement)]),
                xaxis: None,
                yaxis: None,
            }))
        },
    )
}

/// Painel 2×2: tendência temporal, canais, segmentos e distribuição do ROI
pub fn performance_overview(
    daily: &[DailySummary],
    channels: &[GroupSummary<String>],
    segments: &[GroupSummary<String>],
) -> Figure {
    let left = [0.0, 0.45];
    let right = [0.55, 1.0];
    let top = [0.575, 1.0];
    let bottom = [0.0, 0.425];

    let subplot_title = |text: &str, x: f64, y: f64| {
        json!({
            "text": text,
            "x": x,
            "y": y,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "bottom",
            "showarrow": false
        })
    };

    let layout = json!({
        "title": { "text": "Síntese do desempenho de marketing" },
        "height": 800,
        "showlegend": true,
        "legend": horizontal_legend(),
        "xaxis": { "domain": left, "anchor": "y" },
        "yaxis": { "domain": top, "anchor": "x" },
        "yaxis5": { "overlaying": "y", "side": "right", "anchor": "x" },
        "xaxis2": { "domain": right, "anchor": "y2" },
        "yaxis2": { "domain": top, "anchor": "x2" },
        "xaxis3": { "domain": left, "anchor": "y3" },
        "yaxis3": { "domain": bottom, "anchor": "x3" },
        "xaxis4": { "domain": right, "anchor": "y4" },
        "yaxis4": { "domain": bottom, "anchor": "x4" },
        "annotations": [
            subplot_title("Tendências temporais", 0.225, 1.0),
            subplot_title("Desempenho por canal", 0.775, 1.0),
            subplot_title("Desempenho por segmento", 0.225, 0.425),
            subplot_title("Distribuição das métricas", 0.775, 0.425)
        ]
    });

    let x = dates(daily);
    let counts: Vec<f64> = segments.iter().map(|s| s.campaign_count as f64).collect();
    let sizeref = bubble_sizeref(&counts);

    Figure::new(layout)
        .with_trace(Trace::Scatter(Scatter {
            x: x.clone(),
            y: daily.iter().map(|d| d.avg_roi).collect::<Vec<_>>().into(),
            name: "ROI".to_string(),
            mode: "lines",
            line: line(PRIMARY_COLOR),
            marker: None,
            text: None,
            xaxis: Some("x".to_string()),
            yaxis: Some("y".to_string()),
        }))
        .with_trace(Trace::Scatter(Scatter {
            x,
            y: daily.iter().map(|d| d.avg_conversion).collect::<Vec<_>>().into(),
            name: "Conversão".to_string(),
            mode: "lines",
            line: line(SECONDARY_COLOR),
            marker: None,
            text: None,
            xaxis: Some("x".to_string()),
            yaxis: Some("y5".to_string()),
        }))
        .with_trace(Trace::Bar(Bar {
            x: keys(channels),
            y: channels.iter().map(|c| c.avg_roi).collect::<Vec<_>>().into(),
            name: "ROI por canal".to_string(),
            marker: None,
            xaxis: Some("x2".to_string()),
            yaxis: Some("y2".to_string()),
        }))
        .with_trace(Trace::Scatter(Scatter {
            x: segments.iter().map(|s| s.avg_conversion).collect::<Vec<_>>().into(),
            y: segments.iter().map(|s| s.avg_roi).collect::<Vec<_>>().into(),
            name: "Segmentos".to_string(),
            mode: "markers",
            line: None,
            marker: Some(Marker {
                size: Some(counts),
                sizemode: Some("area"),
                sizeref: Some(sizeref),
                sizemin: Some(4.0),
                ..Marker::default()
            }),
            text: Some(segments.iter().map(|s| s.key.clone()).collect()),
            xaxis: Some("x3".to_string()),
            yaxis: Some("y3".to_string()),
        }))
        .with_trace(Trace::BoxPlot(BoxPlot {
            y: daily.iter().map(|d| d.avg_roi).collect(),
            name: "Distribuição do ROI".to_string(),
            boxpoints: "outliers",
            xaxis: Some("x4".to_string()),
            yaxis: Some("y4".to_string()),
        }))
}

/// Somatórios das etapas do funil, na ordem fixa de exibição
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FunnelStages {
    pub impressions: f64,
    pub clicks: f64,
    /// Σ cliques × engajamento / 10
    pub interactions: f64,
    /// Σ cliques × taxa de conversão
    pub conversions: f64,
}

impl FunnelStages {
    pub fn from_table(table: &CampaignTable) -> Self {
        table.iter().fold(Self::default(), |mut acc, row| {
            let r = &row.record;
            let clicks = r.clicks as f64;
            acc.impressions += r.impressions as f64;
            acc.clicks += clicks;
            acc.interactions += clicks * r.engagement_score / 10.0;
            acc.conversions += clicks * r.conversion_rate;
            acc
        })
    }

    pub fn stages(&self) -> [(&'static str, f64); 4] {
        [
            ("Impressões", self.impressions),
            ("Cliques", self.clicks),
            ("Interações", self.interactions),
            ("Conversões", self.conversions),
        ]
    }
}

/// Funil impressões → cliques → interações → conversões
pub fn conversion_funnel(stages: &FunnelStages) -> Figure {
    let stages = stages.stages();
    Figure::new(json!({
        "title": { "text": "Funil de conversão" },
        "showlegend": false
    }))
    .with_trace(Trace::Funnel(Funnel {
        x: stages.iter().map(|(_, v)| *v).collect(),
        y: stages.iter().map(|(name, _)| name.to_string()).collect(),
        textinfo: "value+percent initial",
    }))
}

/// Mapa de calor das correlações entre métricas.
///
/// Exige ao menos duas métricas; o filtro de segmentos é aplicado antes.
pub fn metric_correlation(
    table: &CampaignTable,
    metrics: &[Metric],
    segments: Option<&[String]>,
) -> Result<Figure> {
    let matrix = correlation_matrix(table, metrics, segments)?;
    let names: Vec<String> = matrix.metrics.iter().map(|m| m.name().to_string()).collect();

    Ok(Figure::new(json!({
        "title": { "text": "Correlação entre métricas" },
        "xaxis": { "title": { "text": "Métricas" } },
        "yaxis": { "title": { "text": "Métricas" } }
    }))
    .with_trace(Trace::Heatmap(Heatmap {
        z: matrix.values,
        x: names.clone(),
        y: names,
        colorscale: "RdBu",
        zmin: -1.0,
        zmax: 1.0,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::fixtures::record;
    use crate::error::{ComputationError, MarketingError};
    use chrono::NaiveDate;

    fn group(key: &str, roi: f64, count: usize) -> GroupSummary<String> {
        GroupSummary {
            key: key.to_string(),
            avg_conversion: 0.1,
            avg_roi: roi,
            campaign_count: count,
            avg_engagement: 5.0,
            total_cost: 100.0,
        }
    }

    #[test]
    fn test_empty_inputs_produce_valid_figures() {
        let figures = [
            temporal_trends(&[]),
            channel_comparison(&[]),
            segment_matrix(&[]),
            performance_overview(&[], &[], &[]),
        ];

        for figure in &figures {
            let json = figure.to_json().unwrap();
            let value: Value = serde_json::from_str(&json).unwrap();
            assert!(value["data"].is_array());
            assert!(figure.title().is_some());
        }
        assert!(segment_matrix(&[]).data.is_empty());
        assert_eq!(performance_overview(&[], &[], &[]).data.len(), 5);
    }

    #[test]
    fn test_temporal_uses_secondary_axis() {
        let daily = vec![DailySummary {
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            avg_roi: 5.0,
            avg_conversion: 0.1,
            total_clicks: 10,
            daily_spend: 100.0,
            campaign_count: 1,
        }];
        let value = serde_json::to_value(temporal_trends(&daily)).unwrap();
        assert_eq!(value["data"][0]["x"][0], "2021-01-01");
        assert_eq!(value["data"][1]["yaxis"], "y2");
        assert_eq!(value["layout"]["yaxis2"]["overlaying"], "y");
    }

    #[test]
    fn test_segment_matrix_does_not_mutate_input() {
        let segments = vec![group("Tech", 6.0, 0), group("Foodies", 4.0, 0)];
        let before = segments.clone();
        let figure = segment_matrix(&segments);

        assert_eq!(segments, before);
        assert_eq!(figure.data.len(), 2);
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["marker"]["sizeref"], 1.0);
    }

    #[test]
    fn test_funnel_stages() {
        let mut a = record("Email", "A", 5.0);
        a.impressions = 100;
        a.clicks = 10;
        a.engagement_score = 5.0;
        a.conversion_rate = 0.2;
        let table = CampaignTable::from_records(vec![a.clone(), a]);

        let stages = FunnelStages::from_table(&table);
        assert_eq!(stages.impressions, 200.0);
        assert_eq!(stages.clicks, 20.0);
        assert!((stages.interactions - 10.0).abs() < 1e-12);
        assert!((stages.conversions - 4.0).abs() < 1e-12);

        let value = serde_json::to_value(conversion_funnel(&stages)).unwrap();
        assert_eq!(value["data"][0]["type"], "funnel");
        assert_eq!(value["data"][0]["y"][0], "Impressões");
        assert_eq!(value["data"][0]["y"][3], "Conversões");
    }

    #[test]
    fn test_heatmap_requires_two_metrics() {
        let table = CampaignTable::from_records(vec![record("A", "s", 1.0), record("B", "s", 2.0)]);

        let err = metric_correlation(&table, &[Metric::Roi], None).unwrap_err();
        assert!(matches!(
            err,
            MarketingError::Computation(ComputationError::InvalidParameter { .. })
        ));

        let figure = metric_correlation(&table, &[Metric::Roi, Metric::Clicks], None).unwrap();
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], "heatmap");
        assert_eq!(value["data"][0]["z"][0][0], 1.0);
        // cliques constantes: correlação indefinida serializada como null
        assert!(value["data"][0]["z"][0][1].is_null());
    }
}
