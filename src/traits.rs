use async_trait::async_trait;
use std::path::PathBuf;
use crate::analysis::summary::{CohortSummary, GroupSummary, SegmentChannel};
use crate::campaign::CampaignTable;
use crate::error::Result;
use crate::report::ReportContext;
use crate::types::DataRow;

/// Trait para componentes que extraem dados
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extrai todas as linhas da fonte
    async fn extract(&self) -> Result<Vec<DataRow>>;
}

/// Trait para componentes que transformam dados.
///
/// Cada chamada produz uma tabela nova; a entrada do chamador não é alterada.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transforma a tabela inteira
    async fn transform(&self, data: &[DataRow]) -> Result<Vec<DataRow>>;

    /// Nome usado nos logs
    fn name(&self) -> &str;
}

/// Motor analítico externo que recebe a tabela enriquecida e executa
/// consultas declarativas sobre ela.
pub trait QueryEngine {
    /// Registra a tabela enriquecida, substituindo um registro anterior
    fn register(&mut self, table: &CampaignTable) -> Result<()>;

    /// Cruzamento segmento × canal, apenas grupos com pelo menos 10 linhas
    fn segment_channel_crosstab(&self) -> Result<Vec<GroupSummary<SegmentChannel>>>;

    /// Coortes por (mês, segmento), ordenadas por mês e segmento
    fn cohort_analysis(&self) -> Result<Vec<CohortSummary>>;

    /// Libera o recurso explicitamente
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Trait para componentes que geram o documento final
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Gera o documento e retorna o caminho do artefato principal
    async fn render(&self, context: &ReportContext) -> Result<PathBuf>;

    /// Nome usado nos logs e nas mensagens de falha
    fn name(&self) -> &str;
}

/// Trait para emissão de eventos do pipeline
#[async_trait]
pub trait EventEmitter: Send + Sync {
    /// Emite um evento do pipeline
    async fn emit(&self, event: crate::types::PipelineEvent) -> Result<()>;
}
