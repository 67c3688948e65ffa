//! mktrs: análise de campanhas de marketing.
//!
//! Executa o pipeline completo e imprime um resumo dos resultados.

use clap::Parser;
use mktrs::config::{AnalysisConfigBuilder, LogFormat};
use mktrs::report::{format_currency, format_decimal, format_percentage};
use mktrs::telemetry::init_tracing;
use mktrs::{AnalysisConfig, MarketingError, Pipeline, PipelineResult};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mktrs")]
#[command(about = "Análise de campanhas de marketing: KPIs, gráficos e relatório")]
#[command(version)]
struct Cli {
    /// Arquivo TOML de configuração
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// CSV de campanhas (sobrescreve a configuração)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Diretório de relatórios (sobrescreve a configuração)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Gera apenas os gráficos, sem documentos
    #[arg(long, default_value_t = false)]
    no_render: bool,

    /// Nível de log (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Logs em JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn load_config(cli: &Cli) -> mktrs::Result<AnalysisConfig> {
    let base = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base).env_overrides();

    if let Some(data) = &cli.data {
        builder = builder.data_file(data);
    }
    if let Some(output) = &cli.output {
        builder = builder.reports_dir(output);
    }
    if cli.no_render {
        builder = builder.render_documents(false);
    }
    if let Some(level) = &cli.log_level {
        builder = builder.log_level(level);
    }
    if cli.json_logs {
        builder = builder.log_format(LogFormat::Json);
    }

    builder.build()
}

fn print_summary(result: &PipelineResult) {
    let overall = &result.kpis.overall;

    println!("✓ Análise concluída em {} ms", result.execution_time_ms);
    println!("  Campanhas analisadas: {}", result.rows_analyzed);
    println!("  ROI médio:            {}", format_decimal(overall.avg_roi));
    println!(
        "  Conversão média:      {}",
        format_percentage(overall.avg_conversion_rate * 100.0)
    );
    println!("  CTR médio:            {}", format_percentage(overall.avg_ctr * 100.0));
    println!("  Investimento total:   {}", format_currency(overall.total_spend));

    if let Some(best) = result.kpis.channels.first() {
        println!("  Melhor canal:         {} (ROI {})", best.key, format_decimal(best.avg_roi));
    }

    println!(
        "  Crescimento do ROI:   {}",
        format_percentage(result.growth.roi_growth)
    );
    println!("  Gráficos gravados:    {}", result.chart_files.len());

    for path in &result.report_files {
        println!("  Relatório:            {}", path.display());
    }
}

fn report_error(err: &MarketingError) {
    eprintln!("✗ [{}] {}", err.stage(), err);
}

async fn run(config: AnalysisConfig) -> mktrs::Result<PipelineResult> {
    Pipeline::standard(config)?.execute().await
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.observability) {
        eprintln!("⚠ Tracing não inicializado: {}", e);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            report_error(&MarketingError::Io(e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(result) => {
            print_summary(&result);
            for failure in &result.render_failures {
                eprintln!("⚠ {}", failure);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
