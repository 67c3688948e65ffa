pub mod cleaning;
pub mod common;
pub mod derive;

use crate::campaign::columns;
use common::CompositeTransformer;
use cleaning::{CleanMonetaryTransform, ParseDateTransform};

/// Cadeia de limpeza padrão: custo monetário e depois datas
pub fn default_cleaning() -> CompositeTransformer {
    CompositeTransformer::new()
        .add(CleanMonetaryTransform::new(columns::ACQUISITION_COST))
        .add(ParseDateTransform::new(columns::DATE))
}
