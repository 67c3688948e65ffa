//! Relatório via Quarto.
//!
//! O documento `.qmd` é gerado a partir do template, copiado para o diretório
//! de relatórios e renderizado pela ferramenta externa. A chamada bloqueia a
//! execução até o processo terminar; não há timeout.

use askama::Template;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use super::{write_document, ReportContext, ReportView};
use crate::error::{ExternalToolError, MarketingError, RenderError, Result};
use crate::traits::DocumentRenderer;

/// Nome do documento Quarto gerado
pub const QMD_FILE: &str = "marketing_report.qmd";

#[derive(Template)]
#[template(path = "quarto_report.qmd", escape = "none")]
struct QuartoDocument<'a> {
    view: &'a ReportView,
    format: &'a str,
}

/// Extensão do arquivo gerado para um formato de saída.
///
/// Extensões de formato (`gfm+footnotes`) são ignoradas; formatos
/// desconhecidos usam o próprio nome como extensão.
pub fn output_extension(format: &str) -> &str {
    let base = format
        .split(|c| c == '+' || c == '-')
        .next()
        .unwrap_or(format);

    match base {
        "html" | "html4" | "html5" | "revealjs" | "dashboard" | "slidy" | "s5" | "dzslides" => {
            "html"
        }
        "pdf" | "beamer" | "typst" => "pdf",
        "gfm" | "commonmark" | "markdown" | "md" | "hugo" => "md",
        "latex" | "context" => "tex",
        "asciidoc" => "adoc",
        "docx" | "pptx" | "odt" | "epub" | "rtf" | "ipynb" | "jats" => base,
        _ => format,
    }
}

/// Escapa `|` para não quebrar as linhas das tabelas Markdown
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Textos livres das tabelas prontos para Markdown sem escape automático
fn markdown_view(mut view: ReportView) -> ReportView {
    let rows = view
        .top_channels
        .iter_mut()
        .chain(view.top_segments.iter_mut())
        .chain(view.segment_channel.iter_mut())
        .chain(view.segment_channel_all.iter_mut());
    for row in rows {
        row.label = escape_cell(&row.label);
    }

    for cohort in &mut view.cohorts {
        cohort.segment = escape_cell(&cohort.segment);
    }

    view
}

/// Renderizador que delega ao executável `quarto`
pub struct QuartoRenderer {
    templates_dir: PathBuf,
    reports_dir: PathBuf,
    command: String,
    format: String,
}

impl QuartoRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            reports_dir: reports_dir.into(),
            command: "quarto".to_string(),
            format: "html".to_string(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Caminho do `.qmd` gravado no diretório de templates
    pub fn template_path(&self) -> PathBuf {
        self.templates_dir.join(QMD_FILE)
    }

    /// Caminho da cópia renderizada pela ferramenta
    pub fn document_path(&self) -> PathBuf {
        self.reports_dir.join(QMD_FILE)
    }

    /// Artefato esperado após a renderização
    pub fn output_path(&self) -> PathBuf {
        self.document_path().with_extension(output_extension(&self.format))
    }

    fn render_document(&self, context: &ReportContext) -> Result<String> {
        let view = markdown_view(context.view());
        let document = QuartoDocument {
            view: &view,
            format: &self.format,
        };
        Ok(document.render()?)
    }

    async fn run_tool(&self, document: &Path) -> Result<()> {
        tracing::info!(
            command = %self.command,
            document = %document.display(),
            format = %self.format,
            "Executando ferramenta de renderização"
        );

        let output = Command::new(&self.command)
            .arg("render")
            .arg(document)
            .arg("--to")
            .arg(&self.format)
            .output()
            .await
            .map_err(|e| -> MarketingError {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExternalToolError::NotFound {
                        command: self.command.clone(),
                    }
                    .into()
                } else {
                    ExternalToolError::SpawnFailed {
                        command: self.command.clone(),
                        message: e.to_string(),
                    }
                    .into()
                }
            })?;

        if !output.status.success() {
            return Err(ExternalToolError::Failed {
                command: self.command.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentRenderer for QuartoRenderer {
    async fn render(&self, context: &ReportContext) -> Result<PathBuf> {
        let contents = self.render_document(context)?;

        let template = self.template_path();
        write_document(&template, &contents).await?;

        let document = self.document_path();
        let copy_error = |e: std::io::Error| -> MarketingError {
            RenderError::WriteError {
                path: document.display().to_string(),
                message: e.to_string(),
            }
            .into()
        };
        tokio::fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(copy_error)?;
        tokio::fs::copy(&template, &document)
            .await
            .map_err(copy_error)?;

        self.run_tool(&document).await?;

        let output = self.output_path();
        tracing::info!(path = %output.display(), "Relatório Quarto gerado");
        Ok(output)
    }

    fn name(&self) -> &str {
        "quarto"
    }
}
