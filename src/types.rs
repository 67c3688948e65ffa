use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use chrono::NaiveDate;

use crate::analysis::summary::{AdvancedAnalysis, GrowthMetrics, Kpis};
use crate::analysis::trends::MovingAverage;

/// Representa uma linha de dados genérica, antes da tipagem
pub type DataRow = HashMap<String, DataValue>;

/// Valores de dados suportados nas etapas de extração e limpeza
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
    /// Data sem horário (YYYY-MM-DD)
    Date(NaiveDate),
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl DataValue {
    /// Converte para string se possível
    pub fn as_string(&self) -> Option<String> {
        match self {
            DataValue::String(s) => Some(s.clone()),
            DataValue::Integer(i) => Some(i.to_string()),
            DataValue::Float(f) => Some(f.to_string()),
            DataValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            DataValue::Null => None,
        }
    }

    /// Converte para inteiro se possível, sem coerção de texto
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DataValue::Integer(i) => Some(*i),
            DataValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Converte para float se possível, sem coerção de texto
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Converte para data (NaiveDate) se já tiver sido limpa
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DataValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Verifica se é nulo
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Nome do tipo, usado em mensagens de erro
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "String",
            DataValue::Integer(_) => "Integer",
            DataValue::Float(_) => "Float",
            DataValue::Null => "Null",
            DataValue::Date(_) => "Date",
        }
    }
}

/// Resultado de uma execução completa do pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub rows_loaded: usize,
    pub rows_analyzed: usize,
    pub kpis: Kpis,
    pub advanced: AdvancedAnalysis,
    pub growth: GrowthMetrics,
    pub moving_averages: Vec<MovingAverage>,
    pub chart_files: Vec<PathBuf>,
    pub report_files: Vec<PathBuf>,
    /// Falhas não fatais da etapa de renderização
    pub render_failures: Vec<String>,
    pub execution_time_ms: u64,
}

impl PipelineResult {
    pub fn has_render_failures(&self) -> bool {
        !self.render_failures.is_empty()
    }
}

/// Estados do pipeline para rastreamento de execução
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Loading,
    Cleaning,
    Aggregating,
    Querying,
    Charting,
    Rendering,
    Completed,
    Failed(String),
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Ocioso"),
            PipelineState::Loading => write!(f, "Carregando"),
            PipelineState::Cleaning => write!(f, "Limpando"),
            PipelineState::Aggregating => write!(f, "Agregando"),
            PipelineState::Querying => write!(f, "Consultando"),
            PipelineState::Charting => write!(f, "Gerando gráficos"),
            PipelineState::Rendering => write!(f, "Renderizando"),
            PipelineState::Completed => write!(f, "Concluído"),
            PipelineState::Failed(error) => write!(f, "Falhou: {}", error),
        }
    }
}

/// Eventos do pipeline para monitoramento externo
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Pipeline iniciado
    Started {
        pipeline_id: String,
        timestamp: std::time::SystemTime,
    },
    /// Estado alterado
    StateChanged {
        pipeline_id: String,
        old_state: PipelineState,
        new_state: PipelineState,
        timestamp: std::time::SystemTime,
    },
    /// Falha não fatal (etapa de renderização)
    Warning {
        pipeline_id: String,
        message: String,
        timestamp: std::time::SystemTime,
    },
    /// Erro fatal
    Error {
        pipeline_id: String,
        stage: &'static str,
        error: String,
        timestamp: std::time::SystemTime,
    },
    /// Pipeline concluído
    Completed {
        pipeline_id: String,
        rows_analyzed: usize,
        files_written: usize,
        execution_time_ms: u64,
        timestamp: std::time::SystemTime,
    },
}
