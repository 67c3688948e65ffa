//! Gráficos no formato de figura do Plotly.
//!
//! Cada figura é serializada em JSON e gravada como uma página HTML
//! independente que carrega o plotly.js de uma CDN.

pub mod figures;

use askama::Template;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use crate::analysis::summary::Kpis;
use crate::error::Result;
use crate::report::write_document;

pub use figures::{
    channel_comparison, conversion_funnel, metric_correlation, performance_overview,
    segment_matrix, temporal_trends, FunnelStages,
};

/// Subdiretório de `reports` onde os gráficos são gravados
pub const VISUALIZATIONS_DIR: &str = "visualizations";

/// Nomes fixos dos quatro gráficos principais
pub const TEMPORAL_TRENDS: &str = "temporal_trends";
pub const CHANNEL_COMPARISON: &str = "channel_comparison";
pub const SEGMENT_MATRIX: &str = "segment_matrix";
pub const PERFORMANCE_OVERVIEW: &str = "performance_overview";
pub const CONVERSION_FUNNEL: &str = "conversion_funnel";
pub const METRIC_CORRELATION: &str = "metric_correlation";

pub const PRIMARY_COLOR: &str = "#1f77b4";
pub const SECONDARY_COLOR: &str = "#ff7f0e";

/// Série de valores de um eixo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Text(Vec<String>),
    Number(Vec<f64>),
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Values::Text(v)
    }
}

impl From<Vec<f64>> for Values {
    fn from(v: Vec<f64>) -> Self {
        Values::Number(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemin: Option<f64>,
}

/// Linha ou dispersão
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Values,
    pub y: Values,
    pub name: String,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub x: Values,
    pub y: Values,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub y: Vec<f64>,
    pub name: String,
    pub boxpoints: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Funnel {
    pub x: Vec<f64>,
    pub y: Vec<String>,
    pub textinfo: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub z: Vec<Vec<f64>>,
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub colorscale: &'static str,
    pub zmin: f64,
    pub zmax: f64,
}

/// Um traço da figura, identificado pelo campo `type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(Scatter),
    Bar(Bar),
    #[serde(rename = "box")]
    BoxPlot(BoxPlot),
    Funnel(Funnel),
    Heatmap(Heatmap),
}

/// Figura completa (traços + layout)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Value,
}

impl Figure {
    pub fn new(layout: Value) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    /// Título da figura, se definido no layout
    pub fn title(&self) -> Option<&str> {
        self.layout
            .get("title")
            .and_then(|t| t.get("text").or(Some(t)))
            .and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Template)]
#[template(path = "chart.html")]
struct ChartPage<'a> {
    title: &'a str,
    figure_json: String,
}

/// Grava a figura como página HTML independente
pub async fn write_chart_html(figure: &Figure, path: &Path) -> Result<PathBuf> {
    // "</script>" dentro do JSON fecharia a tag do template
    let figure_json = figure.to_json()?.replace("</", "<\\/");
    let page = ChartPage {
        title: figure.title().unwrap_or("Gráfico"),
        figure_json,
    };
    let html = page.render()?;

    write_document(path, &html).await?;

    tracing::debug!(path = %path.display(), "Gráfico gravado");
    Ok(path.to_path_buf())
}

/// Caminho do arquivo HTML de um gráfico nomeado
pub fn chart_path(reports_dir: &Path, name: &str) -> PathBuf {
    reports_dir
        .join(VISUALIZATIONS_DIR)
        .join(format!("{}.html", name))
}

/// Monta os quatro gráficos principais a partir dos KPIs
pub fn performance_figures(kpis: &Kpis) -> Vec<(&'static str, Figure)> {
    vec![
        (TEMPORAL_TRENDS, temporal_trends(&kpis.temporal)),
        (CHANNEL_COMPARISON, channel_comparison(&kpis.channels)),
        (SEGMENT_MATRIX, segment_matrix(&kpis.segments)),
        (
            PERFORMANCE_OVERVIEW,
            performance_overview(&kpis.temporal, &kpis.channels, &kpis.segments),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_trace_type_tag() {
        let trace = Trace::BoxPlot(BoxPlot {
            y: vec![1.0, f64::NAN],
            name: "ROI".to_string(),
            boxpoints: "outliers",
            xaxis: None,
            yaxis: None,
        });
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["type"], "box");
        assert_eq!(value["y"], json!([1.0, null]));
        assert!(value.get("xaxis").is_none());
    }

    #[test]
    fn test_figure_title() {
        let figure = Figure::new(json!({ "title": { "text": "Canais" } }));
        assert_eq!(figure.title(), Some("Canais"));
        assert_eq!(Figure::new(json!({})).title(), None);
    }

    #[tokio::test]
    async fn test_write_chart_html_escapes_script_end() {
        let dir = tempdir().unwrap();
        let path = chart_path(dir.path(), "teste");
        let figure = Figure::new(json!({ "title": { "text": "</script><b>" } }));

        let written = write_chart_html(&figure, &path).await.unwrap();
        let html = std::fs::read_to_string(&written).unwrap();

        assert!(written.ends_with("visualizations/teste.html"));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("<\\/script>"));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
