//! Tipagem das linhas limpas e cálculo das métricas derivadas.

use crate::campaign::{columns, CampaignRecord, CampaignTable};
use crate::error::{ComputationError, Result};
use crate::types::{DataRow, DataValue};

const OPERATION: &str = "derive_metrics";

fn field<'a>(row: &'a DataRow, column: &str, index: usize) -> Result<&'a DataValue> {
    row.get(column).ok_or_else(|| {
        ComputationError::MissingColumn {
            operation: OPERATION,
            column: column.to_string(),
            row: index + 1,
        }
        .into()
    })
}

fn invalid(column: &str, index: usize, value: &DataValue) -> crate::error::MarketingError {
    ComputationError::InvalidType {
        operation: OPERATION,
        column: column.to_string(),
        row: index + 1,
        found: format!("{} {:?}", value.type_name(), value.as_string().unwrap_or_default()),
    }
    .into()
}

fn float_field(row: &DataRow, column: &str, index: usize) -> Result<f64> {
    let value = field(row, column, index)?;
    value.as_float().ok_or_else(|| invalid(column, index, value))
}

fn count_field(row: &DataRow, column: &str, index: usize) -> Result<u64> {
    let value = field(row, column, index)?;
    value
        .as_integer()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| invalid(column, index, value))
}

fn text_field(row: &DataRow, column: &str, index: usize) -> Result<String> {
    match field(row, column, index)? {
        DataValue::String(s) => Ok(s.trim().to_string()),
        // rótulos que parecem números continuam sendo categorias
        value @ (DataValue::Integer(_) | DataValue::Float(_)) => {
            value.as_string().ok_or_else(|| invalid(column, index, value))
        }
        other => Err(invalid(column, index, other)),
    }
}

/// Converte uma linha limpa em registro tipado.
///
/// Exige que o custo já seja numérico e a data já esteja convertida.
pub fn record_from_row(row: &DataRow, index: usize) -> Result<CampaignRecord> {
    let date_value = field(row, columns::DATE, index)?;
    let date = date_value
        .as_date()
        .ok_or_else(|| invalid(columns::DATE, index, date_value))?;

    Ok(CampaignRecord {
        campaign_id: text_field(row, columns::CAMPAIGN_ID, index)?,
        date,
        channel: text_field(row, columns::CHANNEL, index)?,
        segment: text_field(row, columns::SEGMENT, index)?,
        impressions: count_field(row, columns::IMPRESSIONS, index)?,
        clicks: count_field(row, columns::CLICKS, index)?,
        acquisition_cost: float_field(row, columns::ACQUISITION_COST, index)?,
        conversion_rate: float_field(row, columns::CONVERSION_RATE, index)?,
        roi: float_field(row, columns::ROI, index)?,
        engagement_score: float_field(row, columns::ENGAGEMENT_SCORE, index)?,
    })
}

/// Tipa a tabela limpa e calcula métricas e categorias de cada linha
pub fn derive_metrics(rows: &[DataRow]) -> Result<CampaignTable> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| record_from_row(row, i))
        .collect::<Result<Vec<_>>>()?;

    let non_finite = records
        .iter()
        .filter(|r| r.impressions == 0 || r.clicks == 0)
        .count();
    if non_finite > 0 {
        tracing::warn!(
            rows = non_finite,
            "Linhas com zero impressões ou cliques geram métricas não finitas"
        );
    }

    Ok(CampaignTable::from_records(records))
}
