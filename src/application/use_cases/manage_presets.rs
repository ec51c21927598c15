use super::ManageMappingsUseCase;
use crate::application::ports::{Confirmer, DeleteOutcome, Notifier, failure_notice};
use crate::application::SharedSession;
use crate::domain::preset::{Preset, PresetDraft, PresetError, PresetId, PresetRepository};
use crate::domain::shared::Notice;
use std::sync::Arc;
use tracing::{debug, info};

/// プリセットの保存・一覧・適用・削除
pub struct ManagePresetsUseCase {
    repo: Arc<dyn PresetRepository>,
    mappings: Arc<ManageMappingsUseCase>,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
}

impl ManagePresetsUseCase {
    pub fn new(
        repo: Arc<dyn PresetRepository>,
        mappings: Arc<ManageMappingsUseCase>,
        session: SharedSession,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            repo,
            mappings,
            session,
            notifier,
            confirmer,
        }
    }

    /// 一覧を取得する。空の一覧はエラーではない
    pub async fn list(&self) -> Result<Vec<Preset>, PresetError> {
        match self.repo.list_presets().await {
            Ok(presets) => {
                debug!(count = presets.len(), "Loaded presets");
                self.session
                    .write()
                    .await
                    .replace_presets(presets.clone());
                Ok(presets)
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to load presets", &e));
                Err(e.into())
            }
        }
    }

    /// バックエンド側の現在のマッピングを名前付きで保存する
    pub async fn save(&self, name: &str, description: Option<&str>) -> Result<(), PresetError> {
        let draft = PresetDraft::new(name, description).map_err(|e| {
            self.notifier.notify(Notice::error(e.to_string()));
            e
        })?;

        match self.repo.save_preset(&draft).await {
            Ok(message) => {
                info!(name = %draft.name, "Preset saved");
                self.notifier.notify(Notice::success(message.unwrap_or_else(|| {
                    format!("Preset \"{}\" saved successfully", draft.name)
                })));
                let _ = self.list().await;
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to save preset", &e));
                Err(e.into())
            }
        }
    }

    /// プリセットを適用し、マッピング表を読み込み直す (マージはしない)
    pub async fn load(&self, id: PresetId) -> Result<(), PresetError> {
        match self.repo.load_preset(id).await {
            Ok(message) => {
                info!(preset_id = id.get(), "Preset loaded");
                self.notifier.notify(Notice::success(
                    message.unwrap_or_else(|| "Preset loaded successfully".to_string()),
                ));
                if let Err(e) = self.mappings.load().await {
                    debug!(error = %e, "Reloading mappings after preset load failed");
                }
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to load preset", &e));
                Err(e.into())
            }
        }
    }

    pub async fn delete(&self, id: PresetId) -> Result<DeleteOutcome, PresetError> {
        let name = self
            .session
            .read()
            .await
            .presets()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{id}"));
        let prompt = format!("Are you sure you want to delete preset \"{name}\"?");
        if !self.confirmer.confirm(&prompt) {
            debug!(preset_id = id.get(), "Preset deletion declined");
            return Ok(DeleteOutcome::Declined);
        }

        match self.repo.delete_preset(id).await {
            Ok(message) => {
                info!(preset_id = id.get(), "Preset deleted");
                self.notifier.notify(Notice::success(
                    message.unwrap_or_else(|| format!("Preset \"{name}\" deleted")),
                ));
                let _ = self.list().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to delete preset", &e));
                Err(e.into())
            }
        }
    }
}
