use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Step of the stop/remove/start sequence used to recreate a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStep {
    Stop,
    Remove,
    Start,
}

impl fmt::Display for RestartStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Remove => write!(f, "rm"),
            Self::Start => write!(f, "up"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("arquivo docker-compose não encontrado: {0:?}")]
    ComposeFileMissing(PathBuf),

    #[error("não foi possível listar os serviços do projeto compose")]
    Config(#[source] anyhow::Error),

    #[error("Docker daemon indisponível - o Docker está rodando?")]
    Unavailable(#[source] anyhow::Error),

    #[error("falha ao construir {}", .services.join(", "))]
    Build {
        services: Vec<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("serviço '{0}' não existe no arquivo docker-compose")]
    UnknownService(String),

    #[error("falha ao consultar o container de {service}")]
    Query {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("falha ao baixar a imagem de {service}")]
    Pull {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("falha ao inspecionar a imagem de {service}")]
    Inspect {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("falha ao reiniciar {service} (etapa {step})")]
    Restart {
        service: String,
        step: RestartStep,
        #[source]
        source: anyhow::Error,
    },
}

impl UpdateError {
    /// The error message followed by every underlying cause, `: `-separated.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
