use crate::application::ports::{Notifier, failure_notice};
use crate::application::SharedSession;
use crate::domain::command::CommandId;
use crate::domain::mapping::{ButtonColor, ButtonSlot, MappingError, MappingRepository, SlotLabel};
use crate::domain::shared::Notice;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// ボタンマッピング表の読み込みと変更
///
/// 変更はすべてセッションに反映してからバックエンドへ保存する。
pub struct ManageMappingsUseCase {
    repo: Arc<dyn MappingRepository>,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
}

impl ManageMappingsUseCase {
    pub fn new(
        repo: Arc<dyn MappingRepository>,
        session: SharedSession,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            session,
            notifier,
        }
    }

    /// バックエンドの内容で表全体を置き換える
    ///
    /// 通信エラーはログにだけ残す。拒否された場合は通知する。
    pub async fn load(&self) -> Result<(), MappingError> {
        match self.repo.load_mappings().await {
            Ok(snapshot) => {
                debug!(count = snapshot.mappings.len(), "Loaded button mappings");
                self.session.write().await.replace_mappings(snapshot);
                Ok(())
            }
            Err(e) => {
                if e.is_rejection() {
                    self.notifier
                        .notify(failure_notice("Failed to load button mappings", &e));
                } else {
                    warn!(error = %e, "Could not load button mappings");
                }
                Err(e.into())
            }
        }
    }

    /// スロットにコマンドを割り当てる (`None` で解除) して表全体を保存する
    pub async fn set_command(
        &self,
        slot: ButtonSlot,
        command_id: Option<CommandId>,
    ) -> Result<SlotLabel, MappingError> {
        let label = {
            let mut session = self.session.write().await;
            session.set_slot_command(slot, command_id);
            session.slot_label(slot)
        };
        info!(slot = %slot, command_id = ?command_id.map(CommandId::get), label = %label, "Button mapping changed");
        self.persist().await?;
        Ok(label)
    }

    /// 現在の表を一括保存する。未割り当てのスロットは送らない
    pub async fn persist(&self) -> Result<(), MappingError> {
        let payload = self.session.read().await.mappings().bulk_payload();
        debug!(slots = payload.len(), "Saving button mappings");
        self.repo.save_mappings(&payload).await.map_err(|e| {
            self.notifier
                .notify(failure_notice("Failed to save button mappings", &e));
            MappingError::from(e)
        })
    }

    /// 1スロットの色を変更し、そのスロットだけを保存する
    pub async fn set_color(&self, slot: ButtonSlot, color: ButtonColor) -> Result<(), MappingError> {
        self.session
            .write()
            .await
            .set_slot_color(slot, color.clone());
        info!(slot = %slot, color = %color, "Button color changed");

        match self.repo.save_color(slot, &color).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(format!(
                    "Button {slot} color set to {}",
                    color.resolve_hex()
                )));
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to save button color", &e));
                Err(e.into())
            }
        }
    }
}
