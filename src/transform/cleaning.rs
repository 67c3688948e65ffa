//! Limpeza de colunas monetárias e de datas.

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::error::{CleaningError, Result};
use crate::types::{DataRow, DataValue};
use crate::traits::Transformer;

/// Converte texto monetário em número: remove espaços nas pontas,
/// o símbolo de moeda e os separadores de milhar.
pub fn parse_monetary(text: &str) -> Option<f64> {
    let normalized: String = text
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();

    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Limpa uma coluna monetária e retorna uma tabela nova.
///
/// Células já numéricas são aceitas como estão. Qualquer outra célula que não
/// resulte em um número após a limpeza interrompe a operação.
pub fn clean_monetary_value(rows: &[DataRow], column: &str) -> Result<Vec<DataRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<DataRow> {
            let cleaned = match row.get(column) {
                Some(DataValue::String(text)) => parse_monetary(text).ok_or_else(|| {
                    CleaningError::InvalidMonetary {
                        column: column.to_string(),
                        row: i + 1,
                        value: text.clone(),
                    }
                })?,
                Some(value @ (DataValue::Integer(_) | DataValue::Float(_))) => {
                    value.as_float().unwrap_or(f64::NAN)
                }
                Some(other) => {
                    return Err(CleaningError::InvalidMonetary {
                        column: column.to_string(),
                        row: i + 1,
                        value: other.as_string().unwrap_or_default(),
                    }
                    .into())
                }
                None => {
                    return Err(CleaningError::MissingColumn {
                        column: column.to_string(),
                        row: i + 1,
                    }
                    .into())
                }
            };

            let mut new_row = row.clone();
            new_row.insert(column.to_string(), DataValue::Float(cleaned));
            Ok(new_row)
        })
        .collect()
}

/// Converte uma coluna de datas ISO (YYYY-MM-DD) e retorna uma tabela nova
pub fn parse_date_column(rows: &[DataRow], column: &str) -> Result<Vec<DataRow>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<DataRow> {
            let date = match row.get(column) {
                Some(DataValue::Date(d)) => *d,
                Some(DataValue::String(text)) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                    .map_err(|_| CleaningError::InvalidDate {
                        column: column.to_string(),
                        row: i + 1,
                        value: text.clone(),
                    })?,
                Some(other) => {
                    return Err(CleaningError::InvalidDate {
                        column: column.to_string(),
                        row: i + 1,
                        value: other.as_string().unwrap_or_default(),
                    }
                    .into())
                }
                None => {
                    return Err(CleaningError::MissingColumn {
                        column: column.to_string(),
                        row: i + 1,
                    }
                    .into())
                }
            };

            let mut new_row = row.clone();
            new_row.insert(column.to_string(), DataValue::Date(date));
            Ok(new_row)
        })
        .collect()
}

/// Transformador que limpa uma coluna monetária
#[derive(Debug, Clone)]
pub struct CleanMonetaryTransform {
    column: String,
}

impl CleanMonetaryTransform {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

#[async_trait]
impl Transformer for CleanMonetaryTransform {
    async fn transform(&self, data: &[DataRow]) -> Result<Vec<DataRow>> {
        clean_monetary_value(data, &self.column)
    }

    fn name(&self) -> &str {
        "clean_monetary_value"
    }
}

/// Transformador que converte uma coluna de texto em datas
#[derive(Debug, Clone)]
pub struct ParseDateTransform {
    column: String,
}

impl ParseDateTransform {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

#[async_trait]
impl Transformer for ParseDateTransform {
    async fn transform(&self, data: &[DataRow]) -> Result<Vec<DataRow>> {
        parse_date_column(data, &self.column)
    }

    fn name(&self) -> &str {
        "parse_date_column"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketingError;

    fn row_with(column: &str, value: DataValue) -> DataRow {
        let mut row = DataRow::new();
        row.insert(column.to_string(), value);
        row
    }

    #[test]
    fn test_parse_monetary() {
        assert_eq!(parse_monetary("$1,234.00"), Some(1234.0));
        assert_eq!(parse_monetary("$999"), Some(999.0));
        assert_eq!(parse_monetary("  $16,174.50 "), Some(16174.5));
        assert_eq!(parse_monetary("$"), None);
        assert_eq!(parse_monetary("abc"), None);
        assert_eq!(parse_monetary("$12a"), None);
    }

    #[test]
    fn test_clean_monetary_value() {
        let rows = vec![
            row_with("cost", DataValue::from("$1,234.00")),
            row_with("cost", DataValue::from("$999")),
            row_with("cost", DataValue::Integer(50)),
        ];

        let cleaned = clean_monetary_value(&rows, "cost").unwrap();
        assert_eq!(cleaned[0].get("cost"), Some(&DataValue::Float(1234.0)));
        assert_eq!(cleaned[1].get("cost"), Some(&DataValue::Float(999.0)));
        assert_eq!(cleaned[2].get("cost"), Some(&DataValue::Float(50.0)));

        // semântica de valor: a entrada não muda
        assert_eq!(rows[0].get("cost"), Some(&DataValue::from("$1,234.00")));
    }

    #[test]
    fn test_clean_monetary_value_names_offending_column() {
        let rows = vec![
            row_with("cost", DataValue::from("$10")),
            row_with("cost", DataValue::from("dez reais")),
        ];

        match clean_monetary_value(&rows, "cost") {
            Err(MarketingError::Cleaning(CleaningError::InvalidMonetary { column, row, value })) => {
                assert_eq!(column, "cost");
                assert_eq!(row, 2);
                assert_eq!(value, "dez reais");
            }
            other => panic!("esperado InvalidMonetary, obtido {:?}", other),
        }
    }

    #[test]
    fn test_clean_monetary_value_rejects_null() {
        let rows = vec![row_with("cost", DataValue::Null)];
        assert!(matches!(
            clean_monetary_value(&rows, "cost"),
            Err(MarketingError::Cleaning(CleaningError::InvalidMonetary { .. }))
        ));
    }

    #[test]
    fn test_parse_date_column() {
        let rows = vec![row_with("Date", DataValue::from("2021-12-31"))];
        let parsed = parse_date_column(&rows, "Date").unwrap();
        assert_eq!(
            parsed[0].get("Date"),
            Some(&DataValue::Date(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()))
        );

        let bad = vec![row_with("Date", DataValue::from("31/12/2021"))];
        assert!(matches!(
            parse_date_column(&bad, "Date"),
            Err(MarketingError::Cleaning(CleaningError::InvalidDate { .. }))
        ));

        let missing = vec![row_with("Other", DataValue::from("2021-12-31"))];
        assert!(matches!(
            parse_date_column(&missing, "Date"),
            Err(MarketingError::Cleaning(CleaningError::MissingColumn { .. }))
        ));
    }
}
