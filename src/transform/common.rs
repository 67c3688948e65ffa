use async_trait::async_trait;
use crate::error::Result;
use crate::types::DataRow;
use crate::traits::Transformer;

/// Transformador que combina múltiplas transformações em sequência
pub struct CompositeTransformer {
    transformers: Vec<Box<dyn Transformer + Send + Sync>>,
}

impl CompositeTransformer {
    pub fn new() -> Self {
        Self {
            transformers: Vec::new(),
        }
    }

    pub fn add<T: Transformer + Send + Sync + 'static>(mut self, transformer: T) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl Default for CompositeTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transformer for CompositeTransformer {
    async fn transform(&self, data: &[DataRow]) -> Result<Vec<DataRow>> {
        let mut current = data.to_vec();
        for transformer in &self.transformers {
            current = transformer.transform(&current).await?;
            tracing::debug!(step = transformer.name(), rows = current.len(), "Transformação aplicada");
        }
        Ok(current)
    }

    fn name(&self) -> &str {
        "composite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::cleaning::{CleanMonetaryTransform, ParseDateTransform};
    use crate::types::DataValue;

    #[tokio::test]
    async fn test_composite_transformer_applies_in_order() {
        let mut row = DataRow::new();
        row.insert("cost".to_string(), DataValue::from("$1,500.00"));
        row.insert("day".to_string(), DataValue::from("2021-03-04"));
        let data = vec![row];

        let transform = CompositeTransformer::new()
            .add(CleanMonetaryTransform::new("cost"))
            .add(ParseDateTransform::new("day"));
        assert_eq!(transform.len(), 2);

        let result = transform.transform(&data).await.unwrap();
        assert_eq!(result[0].get("cost"), Some(&DataValue::Float(1500.0)));
        assert!(result[0].get("day").and_then(|v| v.as_date()).is_some());

        // a tabela de entrada permanece intacta
        assert_eq!(data[0].get("cost"), Some(&DataValue::from("$1,500.00")));
    }

    #[tokio::test]
    async fn test_empty_composite_is_identity() {
        let mut row = DataRow::new();
        row.insert("a".to_string(), DataValue::Integer(1));
        let result = CompositeTransformer::default().transform(&[row.clone()]).await.unwrap();
        assert_eq!(result, vec![row]);
    }
}
