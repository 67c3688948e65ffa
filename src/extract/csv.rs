use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::campaign::columns;
use crate::error::{DataLoadError, MarketingError, Result};
use crate::types::{DataRow, DataValue};
use crate::traits::Extractor;

/// Extrator para o arquivo CSV de campanhas
#[derive(Debug, Clone)]
pub struct CsvExtractor {
    file_path: PathBuf,
    delimiter: u8,
    required_columns: Vec<String>,
}

impl CsvExtractor {
    /// Cria um novo extrator CSV exigindo as colunas do conjunto de campanhas
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            delimiter: b',',
            required_columns: columns::REQUIRED.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Define o delimitador
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Substitui a lista de colunas obrigatórias
    pub fn with_required_columns<I, S>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = required.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Converte valor CSV para DataValue.
    ///
    /// Texto monetário ("$1,234.00") e datas permanecem como texto até a limpeza.
    fn parse_value(value: &str) -> DataValue {
        let trimmed = value.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return DataValue::Null;
        }

        if let Ok(int_val) = trimmed.parse::<i64>() {
            return DataValue::Integer(int_val);
        }

        if let Ok(float_val) = trimmed.parse::<f64>() {
            return DataValue::Float(float_val);
        }

        DataValue::String(value.to_string())
    }

    fn check_headers(&self, headers: &csv::StringRecord) -> Result<()> {
        let missing: Vec<String> = self
            .required_columns
            .iter()
            .filter(|required| !headers.iter().any(|h| h.trim() == required.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataLoadError::MissingColumns(missing).into())
        }
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    async fn extract(&self) -> Result<Vec<DataRow>> {
        let content = tokio::fs::read(&self.file_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MarketingError::DataLoad(DataLoadError::FileNotFound(
                    self.file_path.display().to_string(),
                ))
            } else {
                MarketingError::DataLoad(DataLoadError::Malformed(format!(
                    "{}: {}",
                    self.file_path.display(),
                    e
                )))
            }
        })?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(content.as_slice());

        let headers = csv_reader.headers()?.clone();
        self.check_headers(&headers)?;

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let mut row = DataRow::new();

            for (i, field) in record.iter().enumerate() {
                if let Some(header) = headers.get(i) {
                    row.insert(header.trim().to_string(), Self::parse_value(field));
                }
            }

            rows.push(row);
        }

        tracing::debug!(
            file = %self.file_path.display(),
            rows = rows.len(),
            "CSV lido"
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Campaign_ID,Channel_Used,Conversion_Rate,Acquisition_Cost,ROI,Clicks,Impressions,Engagement_Score,Customer_Segment,Date";

    #[tokio::test]
    async fn test_csv_extractor_rejects_ragged_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", HEADER).unwrap();
        writeln!(temp_file, "1,Email,0.04,\"$16,174.00\",6.29,506,1922,6,Health & Wellness,2021-01-01").unwrap();
        writeln!(temp_file, "2,Google Ads,0.12,$11,566.00,5.61,116,7523,7,Fashionistas,2021-01-02").unwrap();

        let extractor = CsvExtractor::new(temp_file.path());
        let result = extractor.extract().await;

        // a segunda linha tem um campo a mais sem aspas
        assert!(matches!(
            result,
            Err(MarketingError::DataLoad(DataLoadError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_csv_extractor_parses_types() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", HEADER).unwrap();
        writeln!(temp_file, "1,Email,0.04,\"$16,174.00\",6.29,506,1922,6,Health & Wellness,2021-01-01").unwrap();

        let extractor = CsvExtractor::new(temp_file.path());
        let result = extractor.extract().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get("Campaign_ID"), Some(&DataValue::Integer(1)));
        assert_eq!(result[0].get("Conversion_Rate"), Some(&DataValue::Float(0.04)));
        assert_eq!(
            result[0].get("Acquisition_Cost"),
            Some(&DataValue::String("$16,174.00".to_string()))
        );
        assert_eq!(
            result[0].get("Date"),
            Some(&DataValue::String("2021-01-01".to_string()))
        );
    }

    #[tokio::test]
    async fn test_csv_extractor_missing_file() {
        let extractor = CsvExtractor::new("/nao/existe/campanhas.csv");
        let result = extractor.extract().await;
        assert!(matches!(
            result,
            Err(MarketingError::DataLoad(DataLoadError::FileNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_csv_extractor_missing_columns() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Campaign_ID,Channel_Used").unwrap();
        writeln!(temp_file, "1,Email").unwrap();

        let extractor = CsvExtractor::new(temp_file.path());
        match extractor.extract().await {
            Err(MarketingError::DataLoad(DataLoadError::MissingColumns(missing))) => {
                assert!(missing.contains(&"ROI".to_string()));
                assert!(!missing.contains(&"Channel_Used".to_string()));
            }
            other => panic!("esperado MissingColumns, obtido {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_csv_extractor_custom_delimiter() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name;age").unwrap();
        writeln!(temp_file, "Alice;30").unwrap();

        let extractor = CsvExtractor::new(temp_file.path())
            .with_delimiter(b';')
            .with_required_columns(["name"]);
        let result = extractor.extract().await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get("name"), Some(&DataValue::String("Alice".to_string())));
        assert_eq!(result[0].get("age"), Some(&DataValue::Integer(30)));
    }
}
