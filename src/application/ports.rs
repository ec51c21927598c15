//! ユースケースが外側に要求するインターフェース

use crate::domain::shared::{Notice, RepositoryError};

/// 利用者への通知先 (コンソール、テスト用の記録など)
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 破壊的な操作の前に利用者へ確認する
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 確認付き削除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// 削除はできたが、未割り当てにしたボタンの保存に失敗した。
    /// バックエンド側のマッピングは削除済みコマンドを指したまま
    DeletedMappingsStale,
    /// 利用者が取り消した。リクエストは送っていない
    Declined,
}

/// バックエンド呼び出しの失敗を通知に変換する
///
/// 通信エラーは一律の文言、業務エラーはバックエンドの理由をそのまま付ける。
pub(crate) fn failure_notice(context: &str, error: &RepositoryError) -> Notice {
    match error {
        RepositoryError::Rejected { message } => Notice::error(format!("{context}: {message}")),
        RepositoryError::Transport { .. } | RepositoryError::MalformedResponse { .. } => {
            Notice::error("Error communicating with server")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_notice_wording() {
        let rejected = failure_notice(
            "Failed to save command",
            &RepositoryError::rejected("Command with that name already exists"),
        );
        assert_eq!(
            rejected.message,
            "Failed to save command: Command with that name already exists"
        );

        let transport = failure_notice(
            "Failed to save command",
            &RepositoryError::transport("connection refused"),
        );
        assert_eq!(transport.message, "Error communicating with server");
    }
}
