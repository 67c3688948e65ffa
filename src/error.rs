use thiserror::Error;

/// Tipo Result principal da biblioteca
pub type Result<T> = std::result::Result<T, MarketingError>;

/// Erro principal do pipeline de análise
#[derive(Error, Debug)]
pub enum MarketingError {
    #[error("Erro de carregamento: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Erro de limpeza: {0}")]
    Cleaning(#[from] CleaningError),

    #[error("Erro de cálculo: {0}")]
    Computation(#[from] ComputationError),

    #[error("Erro de ferramenta externa: {0}")]
    ExternalTool(#[from] ExternalToolError),

    #[error("Erro de renderização: {0}")]
    Render(#[from] RenderError),

    #[error("Erro de configuração: {0}")]
    Config(#[from] ConfigError),

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro genérico: {0}")]
    Generic(#[from] anyhow::Error),
}

/// Erros ao ler o arquivo de entrada
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("CSV malformado: {0}")]
    Malformed(String),

    #[error("UTF-8 inválido: {0}")]
    InvalidEncoding(String),

    #[error("Colunas obrigatórias ausentes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Erros de limpeza de colunas monetárias e de datas
#[derive(Error, Debug)]
pub enum CleaningError {
    #[error("Valor monetário inválido na coluna '{column}' (linha {row}): '{value}'")]
    InvalidMonetary {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Data inválida na coluna '{column}' (linha {row}): '{value}'")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Coluna '{column}' ausente na linha {row}")]
    MissingColumn { column: String, row: usize },
}

/// Erros de cálculo (métricas derivadas, agregações e consultas)
#[derive(Error, Debug)]
pub enum ComputationError {
    #[error("{operation}: coluna '{column}' ausente na linha {row}")]
    MissingColumn {
        operation: &'static str,
        column: String,
        row: usize,
    },

    #[error("{operation}: coluna '{column}' com tipo inesperado na linha {row}: {found}")]
    InvalidType {
        operation: &'static str,
        column: String,
        row: usize,
        found: String,
    },

    #[error("{operation}: nenhum registro para agregar")]
    EmptyInput { operation: &'static str },

    #[error("{operation}: parâmetro inválido: {reason}")]
    InvalidParameter {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation}: métrica desconhecida '{name}'")]
    UnknownMetric {
        operation: &'static str,
        name: String,
    },

    #[error("{operation}: nenhuma tabela registrada no motor de consultas")]
    TableNotRegistered { operation: &'static str },

    #[error("{operation}: falha na consulta: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },
}

/// Erros da ferramenta externa de renderização de documentos
#[derive(Error, Debug)]
pub enum ExternalToolError {
    #[error("'{command}' não está instalado ou não está no PATH")]
    NotFound { command: String },

    #[error("'{command}' não pôde ser iniciado: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("'{command}' terminou com código {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Erros ao gerar os artefatos finais (gráficos e documentos)
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Erro de template: {0}")]
    Template(String),

    #[error("Erro de escrita em '{path}': {message}")]
    WriteError { path: String, message: String },
}

/// Erros relacionados à configuração
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Valor inválido para {param}: {value}")]
    InvalidValue { param: String, value: String },

    #[error("Erro de parsing de configuração: {0}")]
    ParseError(String),
}

impl MarketingError {
    /// Indica se o erro deve abortar a execução.
    ///
    /// Somente a etapa final (gráficos e documento) degrada de forma graciosa.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MarketingError::ExternalTool(_) | MarketingError::Render(_))
    }

    /// Prefixo curto da etapa, usado nas mensagens exibidas ao usuário
    pub fn stage(&self) -> &'static str {
        match self {
            MarketingError::DataLoad(_) => "load",
            MarketingError::Cleaning(_) => "clean",
            MarketingError::Computation(ComputationError::TableNotRegistered { .. })
            | MarketingError::Computation(ComputationError::Query { .. }) => "query",
            MarketingError::Computation(_) => "compute",
            MarketingError::ExternalTool(_) | MarketingError::Render(_) => "render",
            MarketingError::Config(_) => "config",
            MarketingError::Io(_) | MarketingError::Serialization(_) | MarketingError::Generic(_) => {
                "pipeline"
            }
        }
    }

    /// Retorna o código de erro
    pub fn error_code(&self) -> &'static str {
        match self {
            MarketingError::DataLoad(_) => "DATA_LOAD_ERROR",
            MarketingError::Cleaning(_) => "CLEANING_ERROR",
            MarketingError::Computation(_) => "COMPUTATION_ERROR",
            MarketingError::ExternalTool(_) => "EXTERNAL_TOOL_ERROR",
            MarketingError::Render(_) => "RENDER_ERROR",
            MarketingError::Config(_) => "CONFIG_ERROR",
            MarketingError::Io(_) => "IO_ERROR",
            MarketingError::Serialization(_) => "SERIALIZATION_ERROR",
            MarketingError::Generic(_) => "GENERIC_ERROR",
        }
    }
}

impl From<config::ConfigError> for MarketingError {
    fn from(err: config::ConfigError) -> Self {
        MarketingError::Config(ConfigError::ParseError(err.to_string()))
    }
}

impl From<csv::Error> for MarketingError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                MarketingError::DataLoad(DataLoadError::FileNotFound(io_err.to_string()))
            }
            csv::ErrorKind::Utf8 { .. } => {
                MarketingError::DataLoad(DataLoadError::InvalidEncoding(err.to_string()))
            }
            _ => MarketingError::DataLoad(DataLoadError::Malformed(err.to_string())),
        }
    }
}

impl From<rusqlite::Error> for MarketingError {
    fn from(err: rusqlite::Error) -> Self {
        MarketingError::Computation(ComputationError::Query {
            operation: "query_engine",
            message: err.to_string(),
        })
    }
}

impl From<askama::Error> for MarketingError {
    fn from(err: askama::Error) -> Self {
        MarketingError::Render(RenderError::Template(err.to_string()))
    }
}
