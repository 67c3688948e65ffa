//! Motor de consultas declarativas sobre a tabela enriquecida.

pub mod sqlite;

pub use sqlite::SqliteEngine;

use crate::analysis::summary::AdvancedAnalysis;
use crate::campaign::CampaignTable;
use crate::error::Result;
use crate::traits::QueryEngine;

/// Registra a tabela e executa as duas consultas avançadas
pub fn run_advanced_analysis<Q: QueryEngine>(
    engine: &mut Q,
    table: &CampaignTable,
) -> Result<AdvancedAnalysis> {
    engine.register(table)?;

    let analysis = AdvancedAnalysis {
        segment_channel: engine.segment_channel_crosstab()?,
        cohorts: engine.cohort_analysis()?,
    };

    tracing::info!(
        segment_channel_groups = analysis.segment_channel.len(),
        cohorts = analysis.cohorts.len(),
        "Análise avançada concluída"
    );

    Ok(analysis)
}
