//! バックエンドとのやり取りで発生するエラー

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// リポジトリ (バックエンドAPI) のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepositoryError {
    /// ネットワーク到達不能など、レスポンスを得られなかった
    #[error("Error communicating with server: {message}")]
    Transport { message: String },
    /// レスポンスが封筒形式 `{success, data?, error?}` として解釈できない
    #[error("Malformed server response: {message}")]
    MalformedResponse { message: String },
    /// バックエンドが `success: false` で返した業務エラー (そのまま表示する)
    #[error("{message}")]
    Rejected { message: String },
}

impl RepositoryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// 通信系のエラーか (オフライン時のフォールバック対象)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::MalformedResponse { .. }
        )
    }

    /// バックエンドが明示的に拒否したか
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_classification() {
        let transport = RepositoryError::transport("connection refused");
        assert!(transport.is_transient());
        assert!(!transport.is_rejection());

        let rejected = RepositoryError::rejected("Command with that name already exists");
        assert!(rejected.is_rejection());
        assert!(!rejected.is_transient());
        assert_eq!(rejected.to_string(), "Command with that name already exists");
    }
}
