use super::{BulkMappingPayload, ButtonColor, ButtonSlot, MappingSnapshot};
use crate::domain::shared::RepositoryError;
use async_trait::async_trait;

/// ボタンマッピングの永続化 (`/button-mappings`)
#[async_trait]
pub trait MappingRepository: Send + Sync {
    async fn load_mappings(&self) -> Result<MappingSnapshot, RepositoryError>;
    /// コマンドが割り当てられたスロットのみを一括保存する
    async fn save_mappings(&self, payload: &BulkMappingPayload) -> Result<(), RepositoryError>;
    /// 1スロット分の色だけを保存する (一括保存とは独立)
    async fn save_color(&self, slot: ButtonSlot, color: &ButtonColor) -> Result<(), RepositoryError>;
}
