use mktrs::chart;
use mktrs::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, NamedTempFile};

const HEADER: &str = "Campaign_ID,Company,Campaign_Type,Target_Audience,Duration,Channel_Used,Conversion_Rate,Acquisition_Cost,ROI,Location,Language,Clicks,Impressions,Engagement_Score,Customer_Segment,Date";

fn campaigns_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    writeln!(file, "1,Innovate Industries,Email,Men 18-24,30 days,Email,0.1,\"$50.00\",6,Chicago,English,10,100,7,A,2021-01-01").unwrap();
    writeln!(file, "2,Innovate Industries,Email,Women 25-34,30 days,Email,0.05,\"$100.00\",4,Chicago,English,20,200,5,B,2021-01-02").unwrap();
    writeln!(file, "3,Alpha Innovations,Influencer,Men 18-24,15 days,Social,0.2,\"$25.00\",9,Miami,Spanish,5,50,9,A,2021-01-02").unwrap();
    file
}

fn config(data: &Path, reports: &Path) -> AnalysisConfig {
    AnalysisConfig::builder()
        .data_file(data)
        .reports_dir(reports)
        .templates_dir(reports.join("templates"))
        .renderer_command("mktrs-renderer-inexistente")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_three_campaigns_end_to_end() {
    let data = campaigns_csv();
    let out = tempdir().unwrap();
    let emitter = InMemoryEventEmitter::new();

    let config = config(data.path(), out.path());
    let pipeline = Pipeline::with_config(config)
        .extract(CsvExtractor::new(data.path()))
        .transform(default_cleaning())
        .query_engine(SqliteEngine::open_in_memory().unwrap())
        .event_emitter(emitter.clone())
        .build();

    let result = pipeline.execute().await.unwrap();

    let overall = &result.kpis.overall;
    assert_eq!(overall.campaign_count, 3);
    assert!((overall.avg_roi - 6.333).abs() < 1e-3);
    assert!((overall.total_spend - 175.0).abs() < 1e-9);

    let channels = &result.kpis.channels;
    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].key, "Social");
    assert_eq!(channels[0].avg_roi, 9.0);
    assert_eq!(channels[0].campaign_count, 1);
    assert_eq!(channels[1].key, "Email");
    assert_eq!(channels[1].avg_roi, 5.0);
    assert_eq!(channels[1].campaign_count, 2);

    // dois dias distintos na série temporal
    assert_eq!(result.kpis.temporal.len(), 2);
    assert_eq!(result.moving_averages.len(), 2);

    // nenhum grupo segmento × canal atinge o tamanho mínimo
    assert!(result.advanced.segment_channel.is_empty());

    // gráficos e HTML gravados apesar da ferramenta ausente
    for name in [
        chart::TEMPORAL_TRENDS,
        chart::CHANNEL_COMPARISON,
        chart::SEGMENT_MATRIX,
        chart::PERFORMANCE_OVERVIEW,
    ] {
        assert!(chart::chart_path(out.path(), name).exists(), "{} ausente", name);
    }
    let html = std::fs::read_to_string(out.path().join("report.html")).unwrap();
    assert!(html.contains("Social"));
    assert!(html.contains("$175.00"));

    assert!(result.has_render_failures());
    assert!(result.render_failures.iter().all(|f| f.contains("[render]")));
    assert!(out.path().join("marketing_report.qmd").exists());

    assert!(emitter
        .get_events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::Completed { rows_analyzed: 3, .. })));
}

#[tokio::test]
async fn test_malformed_cost_stops_before_any_output() {
    let mut data = NamedTempFile::new().unwrap();
    writeln!(data, "{}", HEADER).unwrap();
    writeln!(data, "1,Acme,Email,All,30 days,Email,0.1,\"$1,2x0.00\",6,Miami,English,10,100,7,A,2021-01-01").unwrap();
    let out = tempdir().unwrap();

    let err = Pipeline::standard(config(data.path(), out.path()))
        .unwrap()
        .execute()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "clean");
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Acquisition_Cost"));
    assert!(!out.path().join("report.html").exists());
}

#[tokio::test]
async fn test_text_campaign_ids_run_end_to_end() {
    let mut data = NamedTempFile::new().unwrap();
    writeln!(data, "{}", HEADER).unwrap();
    writeln!(data, "CMP-001,Acme,Email,All,30 days,Email,0.1,\"$50.00\",6,Miami,English,10,100,7,A,2021-01-01").unwrap();
    writeln!(data, "CMP-002,Acme,Email,All,30 days,Email,0.2,\"$40.00\",4,Miami,English,20,100,5,A,2021-01-15").unwrap();
    let out = tempdir().unwrap();

    let mut config = config(data.path(), out.path());
    config.renderer.enabled = false;

    let result = Pipeline::standard(config).unwrap().execute().await.unwrap();

    assert_eq!(result.rows_analyzed, 2);
    assert_eq!(result.advanced.cohorts.len(), 1);
    assert_eq!(result.advanced.cohorts[0].campaigns, 2);
    assert_eq!(result.kpis.segment_channel_all.len(), 1);
}

#[test]
fn test_cli_reports_fatal_error_with_stage_prefix() {
    let out = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mktrs"))
        .arg("--data")
        .arg(out.path().join("ausente.csv"))
        .arg("--output")
        .arg(out.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("✗ [load]"), "stderr: {}", stderr);
}

#[test]
fn test_cli_render_failure_is_not_fatal() {
    let data = campaigns_csv();
    let out = tempdir().unwrap();

    let mut config_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        config_file,
        "[paths]\ntemplates_dir = \"{}\"\n\n[renderer]\ncommand = \"mktrs-renderer-inexistente\"",
        out.path().join("templates").display()
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mktrs"))
        .arg("--config")
        .arg(config_file.path())
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(out.path())
        .arg("--log-level")
        .arg("error")
        .env_remove("RUST_LOG")
        .env_remove("MKTRS_DATA_FILE")
        .env_remove("MKTRS_REPORTS_DIR")
        .env_remove("MKTRS_TEMPLATES_DIR")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Campanhas analisadas: 3"), "stdout: {}", stdout);
    assert!(stdout.contains("Social"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("⚠"), "stderr: {}", stderr);
    assert!(out.path().join("report.html").exists());
}

#[test]
fn test_cli_no_render_skips_documents() {
    let data = campaigns_csv();
    let out = tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mktrs"))
        .arg("--data")
        .arg(data.path())
        .arg("--output")
        .arg(out.path())
        .arg("--no-render")
        .arg("--json-logs")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(!out.path().join("report.html").exists());
    assert!(chart::chart_path(out.path(), chart::TEMPORAL_TRENDS).exists());
}
