//! Relatório HTML autocontido.

use askama::Template;
use async_trait::async_trait;
use std::path::PathBuf;
use super::{write_document, ReportContext, ReportView};
use crate::error::Result;
use crate::traits::DocumentRenderer;

/// Nome fixo do relatório HTML dentro de `reports`
pub const REPORT_FILE: &str = "report.html";

#[derive(Template)]
#[template(path = "report.html")]
struct ReportPage<'a> {
    view: &'a ReportView,
}

/// Renderiza o relatório HTML em `<reports>/report.html`
pub struct HtmlReportRenderer {
    reports_dir: PathBuf,
}

impl HtmlReportRenderer {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.reports_dir.join(REPORT_FILE)
    }

    /// Gera o HTML sem gravar em disco
    pub fn render_to_string(&self, context: &ReportContext) -> Result<String> {
        let view = context.view();
        Ok(ReportPage { view: &view }.render()?)
    }
}

#[async_trait]
impl DocumentRenderer for HtmlReportRenderer {
    async fn render(&self, context: &ReportContext) -> Result<PathBuf> {
        let html = self.render_to_string(context)?;
        let path = self.output_path();
        write_document(&path, &html).await?;

        tracing::info!(path = %path.display(), bytes = html.len(), "Relatório HTML gerado");
        Ok(path)
    }

    fn name(&self) -> &str {
        "html"
    }
}
