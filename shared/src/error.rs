use thiserror::Error;

/// Failure of a call against the remote API, or of the input validation
/// that runs before it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a decodable body.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered `success: false`; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Text for the notification toast. Transport failures get the
    /// per-operation `fallback`; the other kinds carry their own text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Transport(_) => fallback.to_string(),
            Self::Rejected(message) | Self::Invalid(message) if message.is_empty() => {
                fallback.to_string()
            }
            Self::Rejected(message) | Self::Invalid(message) => message.clone(),
        }
    }
}

/// A companion window refused to be read or navigated, usually because it
/// now shows a cross-origin page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("window location is not accessible: {0}")]
    Inaccessible(String),
    #[error("window is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_use_the_fallback_message() {
        let err = ApiError::Transport("fetch error: offline".into());
        assert_eq!(err.user_message("Erro ao iniciar lurk"), "Erro ao iniciar lurk");
    }

    #[test]
    fn rejected_errors_surface_server_text() {
        let err = ApiError::Rejected("Usuário não encontrado".into());
        assert_eq!(err.user_message("ignored"), "Usuário não encontrado");
    }

    #[test]
    fn empty_rejection_falls_back() {
        let err = ApiError::Rejected(String::new());
        assert_eq!(err.user_message("Erro ao salvar nick"), "Erro ao salvar nick");
    }
}
