//! Sistema de eventos para observabilidade do pipeline

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::Result;
use crate::traits::EventEmitter;
use crate::types::PipelineEvent;
use tracing::{error, info, warn};

/// Implementação simples de EventEmitter que registra eventos via tracing
#[derive(Debug, Clone, Default)]
pub struct LoggingEventEmitter;

impl LoggingEventEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventEmitter for LoggingEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::Started { pipeline_id, timestamp } => {
                info!(
                    pipeline_id = %pipeline_id,
                    timestamp = ?timestamp,
                    "Pipeline iniciado"
                );
            }
            PipelineEvent::StateChanged {
                pipeline_id,
                old_state,
                new_state,
                timestamp,
            } => {
                info!(
                    pipeline_id = %pipeline_id,
                    old_state = %old_state,
                    new_state = %new_state,
                    timestamp = ?timestamp,
                    "Estado do pipeline alterado"
                );
            }
            PipelineEvent::Warning {
                pipeline_id,
                message,
                timestamp,
            } => {
                warn!(
                    pipeline_id = %pipeline_id,
                    message = %message,
                    timestamp = ?timestamp,
                    "Falha não fatal no pipeline"
                );
            }
            PipelineEvent::Error {
                pipeline_id,
                stage,
                error,
                timestamp,
            } => {
                error!(
                    pipeline_id = %pipeline_id,
                    stage = stage,
                    error = %error,
                    timestamp = ?timestamp,
                    "Erro no pipeline"
                );
            }
            PipelineEvent::Completed {
                pipeline_id,
                rows_analyzed,
                files_written,
                execution_time_ms,
                timestamp,
            } => {
                info!(
                    pipeline_id = %pipeline_id,
                    rows_analyzed = rows_analyzed,
                    files_written = files_written,
                    execution_time_ms = execution_time_ms,
                    timestamp = ?timestamp,
                    "Pipeline concluído"
                );
            }
        }

        Ok(())
    }
}

/// EventEmitter que armazena eventos em memória para testes
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventEmitter {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl InMemoryEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PipelineEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Retorna todos os eventos capturados
    pub fn get_events(&self) -> Vec<PipelineEvent> {
        self.lock().clone()
    }

    /// Limpa todos os eventos armazenados
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Retorna o número de eventos capturados
    pub fn event_count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl EventEmitter for InMemoryEventEmitter {
    async fn emit(&self, event: PipelineEvent) -> Result<()> {
        self.lock().push(event);
        Ok(())
    }
}
