use super::{Preset, PresetDraft, PresetId};
use crate::domain::shared::RepositoryError;
use async_trait::async_trait;

/// プリセットの永続化 (`/presets`)
///
/// 保存・適用・削除はバックエンドのメッセージ (あれば) を返す。
#[async_trait]
pub trait PresetRepository: Send + Sync {
    async fn list_presets(&self) -> Result<Vec<Preset>, RepositoryError>;
    /// サーバー側の現在のマッピングをこの名前でスナップショットする
    async fn save_preset(&self, draft: &PresetDraft) -> Result<Option<String>, RepositoryError>;
    /// サーバー側のマッピングをプリセットの内容で上書きする
    async fn load_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError>;
    async fn delete_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError>;
}
