use crate::analysis::aggregate::calculate_kpis;
use crate::analysis::summary::{AdvancedAnalysis, Kpis};
use crate::analysis::trends::{growth_metrics, moving_averages};
use crate::campaign::CampaignTable;
use crate::chart::{self, FunnelStages};
use crate::config::AnalysisConfig;
use crate::error::{ComputationError, MarketingError, Result};
use crate::events::LoggingEventEmitter;
use crate::extract::csv::CsvExtractor;
use crate::query::{run_advanced_analysis, SqliteEngine};
use crate::report::{HtmlReportRenderer, QuartoRenderer, ReportContext};
use crate::traits::{DocumentRenderer, EventEmitter, Extractor, QueryEngine, Transformer};
use crate::transform::common::CompositeTransformer;
use crate::transform::{default_cleaning, derive::derive_metrics};
use crate::types::{PipelineEvent, PipelineResult, PipelineState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Pipeline de análise: carga, limpeza, agregação, consultas, gráficos e
/// relatório, executados em sequência.
///
/// Cada execução consome o pipeline; o motor de consultas é fechado logo após
/// a etapa de consultas ou liberado no drop em caso de erro anterior.
pub struct Pipeline<E, T, Q> {
    extractor: E,
    transformer: T,
    engine: Option<Q>,
    config: AnalysisConfig,
    renderers: Vec<Box<dyn DocumentRenderer>>,
    state: PipelineState,
    event_emitter: Arc<dyn EventEmitter>,
    pipeline_id: String,
}

/// Pipeline padrão: CSV, limpeza padrão e SQLite em memória
pub type StandardPipeline = Pipeline<CsvExtractor, CompositeTransformer, SqliteEngine>;

impl Pipeline<(), (), ()> {
    /// Cria um novo builder de pipeline
    pub fn builder() -> PipelineBuilder<(), (), ()> {
        PipelineBuilder::new()
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: AnalysisConfig) -> PipelineBuilder<(), (), ()> {
        PipelineBuilder::with_config(config)
    }

    /// Monta o pipeline padrão a partir da configuração
    pub fn standard(config: AnalysisConfig) -> Result<StandardPipeline> {
        let extractor = CsvExtractor::new(&config.paths.data_file);
        let engine = SqliteEngine::open_in_memory()?;

        Ok(PipelineBuilder::with_config(config)
            .extract(extractor)
            .transform(default_cleaning())
            .query_engine(engine)
            .build())
    }
}

impl<E, T, Q> Pipeline<E, T, Q>
where
    E: Extractor,
    T: Transformer,
    Q: QueryEngine,
{
    /// Retorna o ID do pipeline
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    /// Altera o estado do pipeline e emite evento
    async fn set_state(&mut self, new_state: PipelineState) -> Result<()> {
        let old_state = std::mem::replace(&mut self.state, new_state.clone());

        let event = PipelineEvent::StateChanged {
            pipeline_id: self.pipeline_id.clone(),
            old_state,
            new_state,
            timestamp: SystemTime::now(),
        };

        self.event_emitter.emit(event).await?;
        Ok(())
    }

    /// Marca o pipeline como falho e devolve o erro para propagação
    async fn fail(&mut self, error: MarketingError) -> MarketingError {
        let message = error.to_string();
        tracing::error!(stage = error.stage(), error = %message, "Etapa falhou");

        if let Err(e) = self.set_state(PipelineState::Failed(message.clone())).await {
            tracing::warn!(error = %e, "Falha ao emitir mudança de estado");
        }

        let event = PipelineEvent::Error {
            pipeline_id: self.pipeline_id.clone(),
            stage: error.stage(),
            error: message,
            timestamp: SystemTime::now(),
        };
        if let Err(e) = self.event_emitter.emit(event).await {
            tracing::warn!(error = %e, "Falha ao emitir evento de erro");
        }

        error
    }

    /// Registra uma falha não fatal da etapa final
    async fn warn(&self, failures: &mut Vec<String>, message: String) -> Result<()> {
        tracing::warn!(error = %message, "Falha não fatal");
        failures.push(message.clone());

        self.event_emitter
            .emit(PipelineEvent::Warning {
                pipeline_id: self.pipeline_id.clone(),
                message,
                timestamp: SystemTime::now(),
            })
            .await
    }

    /// Executa o pipeline completo
    pub async fn execute(mut self) -> Result<PipelineResult> {
        let start_time = Instant::now();

        self.event_emitter
            .emit(PipelineEvent::Started {
                pipeline_id: self.pipeline_id.clone(),
                timestamp: SystemTime::now(),
            })
            .await?;

        tracing::info!(
            pipeline_id = %self.pipeline_id,
            data_file = %self.config.paths.data_file.display(),
            "Iniciando execução do pipeline"
        );

        // Carga
        self.set_state(PipelineState::Loading).await?;
        let extracted = self.extractor.extract().await;
        let raw = match extracted {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e).await),
        };
        let rows_loaded = raw.len();
        tracing::info!(rows = rows_loaded, "Dados carregados");

        // Limpeza
        self.set_state(PipelineState::Cleaning).await?;
        let transformed = self.transformer.transform(&raw).await;
        let cleaned = match transformed {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e).await),
        };
        drop(raw);
        tracing::info!(rows = cleaned.len(), transformer = self.transformer.name(), "Dados limpos");

        // Métricas derivadas e agregações
        self.set_state(PipelineState::Aggregating).await?;
        let aggregated = derive_metrics(&cleaned).and_then(|table| {
            let kpis = calculate_kpis(&table)?;
            Ok((table, kpis))
        });
        let (table, kpis) = match aggregated {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e).await),
        };
        drop(cleaned);

        // Consultas declarativas
        self.set_state(PipelineState::Querying).await?;
        let advanced = match self.run_queries(&table) {
            Ok(advanced) => advanced,
            Err(e) => return Err(self.fail(e).await),
        };

        let growth = growth_metrics(&kpis.temporal);
        let averages = moving_averages(&kpis.temporal, &self.config.analysis.moving_average_windows);
        tracing::info!(
            roi_growth = growth.roi_growth,
            conversion_growth = growth.conversion_growth,
            spend_growth = growth.spend_growth,
            windows = averages.len(),
            "Tendências calculadas"
        );

        // Gráficos e documentos não interrompem a execução
        let mut render_failures = Vec::new();

        self.set_state(PipelineState::Charting).await?;
        let chart_files = self
            .write_charts(&table, &kpis, &mut render_failures)
            .await?;

        let mut report_files = Vec::new();
        if self.config.renderer.enabled {
            self.set_state(PipelineState::Rendering).await?;
            let context = ReportContext {
                kpis: kpis.clone(),
                advanced: advanced.clone(),
                growth,
                chart_files: chart_files.clone(),
                reports_dir: self.config.paths.reports_dir.clone(),
                top_n: self.config.analysis.top_n,
            };

            for renderer in &self.renderers {
                match renderer.render(&context).await {
                    Ok(path) => report_files.push(path),
                    Err(e) => {
                        let message = format!("[{}] {}: {}", e.stage(), renderer.name(), e);
                        self.warn(&mut render_failures, message).await?;
                    }
                }
            }
        } else {
            tracing::info!("Geração de documentos desativada");
        }

        let result = PipelineResult {
            rows_loaded,
            rows_analyzed: table.len(),
            kpis,
            advanced,
            growth,
            moving_averages: averages,
            chart_files,
            report_files,
            render_failures,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        };

        self.set_state(PipelineState::Completed).await?;

        self.event_emitter
            .emit(PipelineEvent::Completed {
                pipeline_id: self.pipeline_id.clone(),
                rows_analyzed: result.rows_analyzed,
                files_written: result.chart_files.len() + result.report_files.len(),
                execution_time_ms: result.execution_time_ms,
                timestamp: SystemTime::now(),
            })
            .await?;

        tracing::info!(
            rows = result.rows_analyzed,
            charts = result.chart_files.len(),
            reports = result.report_files.len(),
            failures = result.render_failures.len(),
            execution_time_ms = result.execution_time_ms,
            "Pipeline executado"
        );

        Ok(result)
    }

    /// Registra a tabela, executa as consultas e fecha o motor
    fn run_queries(&mut self, table: &CampaignTable) -> Result<AdvancedAnalysis> {
        let mut engine = self.engine.take().ok_or_else(|| {
            MarketingError::from(ComputationError::TableNotRegistered {
                operation: "pipeline",
            })
        })?;

        let advanced = run_advanced_analysis(&mut engine, table)?;
        engine.close()?;
        Ok(advanced)
    }

    /// Grava os gráficos; falhas individuais são registradas e não abortam
    async fn write_charts(
        &self,
        table: &CampaignTable,
        kpis: &Kpis,
        failures: &mut Vec<String>,
    ) -> Result<Vec<PathBuf>> {
        let reports_dir = &self.config.paths.reports_dir;
        let mut figures = chart::performance_figures(kpis);

        if self.config.analysis.funnel_chart {
            figures.push((
                chart::CONVERSION_FUNNEL,
                chart::conversion_funnel(&FunnelStages::from_table(table)),
            ));
        }

        if !self.config.analysis.correlation_metrics.is_empty() {
            let heatmap = self.config.correlation_metrics().and_then(|metrics| {
                chart::metric_correlation(
                    table,
                    &metrics,
                    self.config.analysis.correlation_segments.as_deref(),
                )
            });
            match heatmap {
                Ok(figure) => figures.push((chart::METRIC_CORRELATION, figure)),
                Err(e) => {
                    let message = format!("[chart] {}: {}", chart::METRIC_CORRELATION, e);
                    self.warn(failures, message).await?;
                }
            }
        }

        let mut written = Vec::with_capacity(figures.len());
        for (name, figure) in &figures {
            let path = chart::chart_path(reports_dir, name);
            match chart::write_chart_html(figure, &path).await {
                Ok(path) => written.push(path),
                Err(e) => {
                    let message = format!("[chart] {}: {}", name, e);
                    self.warn(failures, message).await?;
                }
            }
        }

        tracing::info!(
            charts = written.len(),
            dir = %reports_dir.join(chart::VISUALIZATIONS_DIR).display(),
            "Gráficos gravados"
        );
        Ok(written)
    }
}

/// Builder para criação de pipelines
pub struct PipelineBuilder<E, T, Q> {
    extractor: E,
    transformer: T,
    engine: Q,
    config: AnalysisConfig,
    renderers: Option<Vec<Box<dyn DocumentRenderer>>>,
    event_emitter: Option<Arc<dyn EventEmitter>>,
}

impl PipelineBuilder<(), (), ()> {
    /// Cria um novo builder
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Cria um builder com configuração personalizada
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            extractor: (),
            transformer: (),
            engine: (),
            config,
            renderers: None,
            event_emitter: None,
        }
    }
}

impl<E, T, Q> PipelineBuilder<E, T, Q> {
    /// Define o extrator
    pub fn extract<NewE: Extractor>(self, extractor: NewE) -> PipelineBuilder<NewE, T, Q> {
        PipelineBuilder {
            extractor,
            transformer: self.transformer,
            engine: self.engine,
            config: self.config,
            renderers: self.renderers,
            event_emitter: self.event_emitter,
        }
    }

    /// Define o transformador de limpeza
    pub fn transform<NewT: Transformer>(self, transformer: NewT) -> PipelineBuilder<E, NewT, Q> {
        PipelineBuilder {
            extractor: self.extractor,
            transformer,
            engine: self.engine,
            config: self.config,
            renderers: self.renderers,
            event_emitter: self.event_emitter,
        }
    }

    /// Define o motor de consultas
    pub fn query_engine<NewQ: QueryEngine>(self, engine: NewQ) -> PipelineBuilder<E, T, NewQ> {
        PipelineBuilder {
            extractor: self.extractor,
            transformer: self.transformer,
            engine,
            config: self.config,
            renderers: self.renderers,
            event_emitter: self.event_emitter,
        }
    }

    /// Define a configuração
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Adiciona um renderizador de documento, substituindo os padrões
    pub fn renderer<R: DocumentRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderers
            .get_or_insert_with(Vec::new)
            .push(Box::new(renderer));
        self
    }

    /// Define o event emitter
    pub fn event_emitter<EventEmitterType: EventEmitter + 'static>(
        mut self,
        emitter: EventEmitterType,
    ) -> Self {
        self.event_emitter = Some(Arc::new(emitter));
        self
    }

    /// Define o diretório de relatórios
    pub fn reports_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.reports_dir = path.into();
        self
    }

    /// Habilita ou desabilita a geração de documentos
    pub fn render_documents(mut self, enabled: bool) -> Self {
        self.config.renderer.enabled = enabled;
        self
    }
}

/// Renderizadores definidos pela configuração
fn default_renderers(config: &AnalysisConfig) -> Vec<Box<dyn DocumentRenderer>> {
    let mut renderers: Vec<Box<dyn DocumentRenderer>> = Vec::new();
    let paths = &config.paths;

    if config.renderer.html {
        renderers.push(Box::new(HtmlReportRenderer::new(&paths.reports_dir)));
    }

    if config.renderer.quarto {
        renderers.push(Box::new(
            QuartoRenderer::new(&paths.templates_dir, &paths.reports_dir)
                .with_command(config.renderer.command.as_str())
                .with_format(config.renderer.output_format.as_str()),
        ));
    }

    renderers
}

impl<E, T, Q> PipelineBuilder<E, T, Q>
where
    E: Extractor,
    T: Transformer,
    Q: QueryEngine,
{
    /// Constrói o pipeline
    pub fn build(self) -> Pipeline<E, T, Q> {
        let renderers = self
            .renderers
            .unwrap_or_else(|| default_renderers(&self.config));
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        Pipeline {
            extractor: self.extractor,
            transformer: self.transformer,
            engine: Some(self.engine),
            config: self.config,
            renderers,
            state: PipelineState::default(),
            event_emitter: self
                .event_emitter
                .unwrap_or_else(|| Arc::new(LoggingEventEmitter::default())),
            pipeline_id: format!("pipeline-{}-{}", std::process::id(), millis),
        }
    }
}

/// Implementação de Default para PipelineBuilder
impl Default for PipelineBuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}
