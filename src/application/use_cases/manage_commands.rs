use super::ManageMappingsUseCase;
use crate::application::ports::{Confirmer, DeleteOutcome, Notifier, failure_notice};
use crate::application::{OfflineFallback, SharedSession};
use crate::domain::command::{Command, CommandDraft, CommandError, CommandId, CommandRepository};
use crate::domain::shared::Notice;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// コマンドレジストリの一覧・作成・更新・削除
pub struct ManageCommandsUseCase {
    repo: Arc<dyn CommandRepository>,
    mappings: Arc<ManageMappingsUseCase>,
    session: SharedSession,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    fallback: OfflineFallback,
}

impl ManageCommandsUseCase {
    pub fn new(
        repo: Arc<dyn CommandRepository>,
        mappings: Arc<ManageMappingsUseCase>,
        session: SharedSession,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        fallback: OfflineFallback,
    ) -> Self {
        Self {
            repo,
            mappings,
            session,
            notifier,
            confirmer,
            fallback,
        }
    }

    /// レジストリを読み込み直す
    ///
    /// 通信できず代替データが有効なら、サンプルのコマンドで埋める。
    /// バックエンドが拒否した場合は代替データを使わない。
    pub async fn load(&self) -> Result<Vec<Command>, CommandError> {
        match self.repo.list_commands().await {
            Ok(commands) => {
                debug!(count = commands.len(), "Loaded commands");
                self.session
                    .write()
                    .await
                    .replace_commands(commands.clone(), false);
                Ok(commands)
            }
            Err(e) if e.is_transient() && self.fallback.is_enabled() => {
                warn!(error = %e, "Backend unreachable, using offline sample commands");
                self.notifier.notify(failure_notice("Failed to load commands", &e));
                self.notifier
                    .notify(Notice::warning("Showing offline sample commands"));
                let commands = self.fallback.commands().to_vec();
                self.session
                    .write()
                    .await
                    .replace_commands(commands.clone(), true);
                Ok(commands)
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to load commands", &e));
                Err(e.into())
            }
        }
    }

    pub async fn create(&self, name: &str, value: i64) -> Result<Option<Command>, CommandError> {
        let draft = self.validate(name, value)?;
        match self.repo.create_command(&draft).await {
            Ok(created) => {
                info!(name = %draft.name, value = %draft.value, "Command created");
                self.notifier
                    .notify(Notice::success("Command saved successfully"));
                self.reload_quietly().await;
                Ok(created)
            }
            Err(e) => {
                self.notifier.notify(failure_notice("Failed to save command", &e));
                Err(e.into())
            }
        }
    }

    pub async fn update(&self, id: CommandId, name: &str, value: i64) -> Result<(), CommandError> {
        let draft = self.validate(name, value)?;
        match self.repo.update_command(id, &draft).await {
            Ok(()) => {
                info!(command_id = id.get(), name = %draft.name, value = %draft.value, "Command updated");
                self.notifier
                    .notify(Notice::success("Command updated successfully"));
                self.reload_quietly().await;
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(failure_notice("Failed to update command", &e));
                Err(e.into())
            }
        }
    }

    /// 確認のうえ削除し、参照していたスロットを未割り当てにして保存する
    pub async fn delete(&self, id: CommandId) -> Result<DeleteOutcome, CommandError> {
        let label = self
            .session
            .read()
            .await
            .command_name(id)
            .unwrap_or_else(|| format!("#{id}"));
        let prompt = format!("Are you sure you want to delete command \"{label}\"?");
        if !self.confirmer.confirm(&prompt) {
            debug!(command_id = id.get(), "Command deletion declined");
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(e) = self.repo.delete_command(id).await {
            self.notifier
                .notify(failure_notice("Failed to delete command", &e));
            return Err(e.into());
        }
        info!(command_id = id.get(), "Command deleted");
        self.notifier.notify(Notice::success("Command deleted"));
        self.reload_quietly().await;

        let cleared = self.session.write().await.scrub_command(id);
        if !cleared.is_empty() {
            info!(command_id = id.get(), slots = ?cleared, "Unmapped buttons of deleted command");
            // 保存の失敗は ManageMappingsUseCase が通知する
            if let Err(e) = self.mappings.persist().await {
                warn!(command_id = id.get(), error = %e, "Button mappings still reference deleted command");
                return Ok(DeleteOutcome::DeletedMappingsStale);
            }
        }
        Ok(DeleteOutcome::Deleted)
    }

    fn validate(&self, name: &str, value: i64) -> Result<CommandDraft, CommandError> {
        CommandDraft::new(name, value).map_err(|e| {
            self.notifier.notify(Notice::error(e.to_string()));
            e
        })
    }

    async fn reload_quietly(&self) {
        if let Err(e) = self.load().await {
            debug!(error = %e, "Reload after change failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::Fixture;
    use crate::domain::mapping::ButtonSlot;
    use crate::domain::shared::{NoticeLevel, RepositoryError};
    use crate::infrastructure::BackendCall;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_invalid_input_rejected_without_request() {
        let fixture = Fixture::new().await;
        let commands = fixture.services.commands.clone();

        let err = assert_err!(commands.create("Looper", 65_536).await);
        assert_eq!(err, CommandError::ValueOutOfRange(65_536));
        assert_err!(commands.create("Looper", -1).await);
        let err = assert_err!(commands.update(CommandId::new(1), "   ", 10).await);
        assert!(err.is_validation());

        assert!(fixture.backend.calls().await.is_empty());
        assert!(
            fixture
                .notifier
                .notices()
                .iter()
                .all(|n| n.level == NoticeLevel::Error)
        );
    }

    #[tokio::test]
    async fn test_saved_command_round_trips() {
        let fixture = Fixture::new().await;
        let commands = fixture.services.commands.clone();

        assert_ok!(commands.create("  Looper  ", 64).await);
        let reloaded = assert_ok!(commands.load().await);
        let looper = reloaded
            .iter()
            .find(|c| c.name.as_str() == "Looper")
            .expect("created command is listed");
        assert_eq!(looper.value.get(), 64);

        let session = fixture.session.read().await;
        assert!(session.commands().iter().any(|c| c.id == looper.id));
        assert!(!session.commands_from_fallback());
    }

    #[tokio::test]
    async fn test_delete_unmaps_referencing_slots() {
        let fixture = Fixture::new().await;
        let slot1 = ButtonSlot::new(1).unwrap();
        let slot2 = ButtonSlot::new(2).unwrap();
        let mappings = fixture.services.mappings.clone();
        assert_ok!(mappings.set_command(slot1, Some(CommandId::new(2))).await);
        assert_ok!(mappings.set_command(slot2, Some(CommandId::new(3))).await);
        fixture.backend.clear_calls().await;

        let outcome = assert_ok!(fixture.services.commands.delete(CommandId::new(2)).await);
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let session = fixture.session.read().await;
        assert_eq!(session.mappings().slot(slot1).command_id, None);
        assert_eq!(session.mappings().slot(slot2).command_id, Some(CommandId::new(3)));
        drop(session);

        let stored = fixture.backend.stored_mappings().await;
        assert!(!stored.slot(slot1).is_mapped());
        assert!(
            fixture
                .backend
                .calls()
                .await
                .iter()
                .any(|c| matches!(c, BackendCall::SaveMappings(p) if !p.contains_slot(slot1)))
        );
    }

    #[tokio::test]
    async fn test_delete_reports_stale_mappings_when_save_fails() {
        let fixture = Fixture::new().await;
        let slot1 = ButtonSlot::new(1).unwrap();
        assert_ok!(
            fixture
                .services
                .mappings
                .set_command(slot1, Some(CommandId::new(2)))
                .await
        );
        fixture
            .backend
            .fail_mapping_saves(Some(RepositoryError::rejected("disk full")))
            .await;
        fixture.notifier.clear();

        let outcome = assert_ok!(fixture.services.commands.delete(CommandId::new(2)).await);
        assert_eq!(outcome, DeleteOutcome::DeletedMappingsStale);

        // 手元では未割り当て、バックエンドは削除済みコマンドを指したまま
        assert_eq!(
            fixture.session.read().await.mappings().slot(slot1).command_id,
            None
        );
        assert_eq!(
            fixture.backend.stored_mappings().await.slot(slot1).command_id,
            Some(CommandId::new(2))
        );
        assert!(
            fixture
                .notifier
                .notices()
                .iter()
                .any(|n| n.level == NoticeLevel::Error
                    && n.message == "Failed to save button mappings: disk full")
        );
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let fixture = Fixture::declining().await;
        let outcome = assert_ok!(fixture.services.commands.delete(CommandId::new(1)).await);
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert!(fixture.backend.calls().await.is_empty());
        assert_eq!(
            fixture.confirmer.prompts(),
            vec!["Are you sure you want to delete command \"Start Recording\"?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_uses_offline_commands() {
        let fixture = Fixture::new().await;
        fixture
            .backend
            .fail_with(Some(RepositoryError::transport("connection refused")))
            .await;

        let commands = assert_ok!(fixture.services.commands.load().await);
        assert_eq!(commands.len(), 3);
        assert!(fixture.session.read().await.commands_from_fallback());
        assert_eq!(
            fixture.notifier.notices()[0].message,
            "Error communicating with server"
        );
    }

    #[tokio::test]
    async fn test_rejection_never_replaced_by_fallback() {
        let fixture = Fixture::new().await;
        fixture
            .backend
            .fail_with(Some(RepositoryError::rejected("database is locked")))
            .await;

        let err = assert_err!(fixture.services.commands.load().await);
        assert_eq!(
            err,
            CommandError::Repository(RepositoryError::rejected("database is locked"))
        );
        assert!(!fixture.session.read().await.commands_from_fallback());
        assert_eq!(
            fixture.notifier.notices()[0].message,
            "Failed to load commands: database is locked"
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_surfaces_backend_reason() {
        let fixture = Fixture::new().await;
        assert_err!(fixture.services.commands.create("Play/Pause", 7).await);
        assert_eq!(
            fixture.notifier.notices()[0].message,
            "Failed to save command: Command with that name already exists"
        );
    }
}
