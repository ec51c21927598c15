use crate::application::ports::{Notifier, failure_notice};
use crate::domain::port::{PortError, PortId, PortRepository, ProbeState};
use crate::domain::shared::{Notice, RepositoryError};
use std::sync::Arc;
use tracing::{debug, info};

/// ポートの2段階疎通確認
///
/// 第1段階で開けることを確認できたときだけ、第2段階のシリアル通信を試す。
pub struct TestPortUseCase {
    repo: Arc<dyn PortRepository>,
    notifier: Arc<dyn Notifier>,
}

impl TestPortUseCase {
    pub fn new(repo: Arc<dyn PortRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    pub async fn execute(&self, port: &PortId) -> Result<ProbeState, PortError> {
        info!(port = %port, "Testing USB port");
        self.notifier
            .notify(Notice::info(format!("Testing USB port {port}...")));

        let connected = match self.repo.test_connection(port).await {
            Ok(connected) => connected,
            // バックエンドが拒否した場合は到達不能として扱う
            Err(RepositoryError::Rejected { message }) => {
                debug!(port = %port, reason = %message, "Basic probe rejected");
                false
            }
            Err(e) => return Err(self.communication_failure(e)),
        };
        let mut state = ProbeState::Unknown.after_basic_probe(connected);

        if state.needs_serial_probe() {
            let serial = match self.repo.test_serial(port).await {
                Ok(device_response) => Ok(device_response),
                Err(RepositoryError::Rejected { message }) => Err(message),
                Err(e) => return Err(self.communication_failure(e)),
            };
            state = state.after_serial_probe(serial);
        }

        debug!(port = %port, state = ?state, "USB port test finished");
        self.notifier.notify(state.notice(port));
        Ok(state)
    }

    fn communication_failure(&self, error: RepositoryError) -> PortError {
        self.notifier
            .notify(failure_notice("Failed to test USB port", &error));
        error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::Fixture;
    use crate::domain::shared::NoticeLevel;
    use crate::infrastructure::{BackendCall, PortProbe};
    use tokio_test::{assert_err, assert_ok};

    fn com3() -> PortId {
        PortId::new("COM3").unwrap()
    }

    #[tokio::test]
    async fn test_serial_phase_skipped_when_unreachable() {
        let fixture = Fixture::new().await;
        fixture.backend.set_probe(com3(), PortProbe::unreachable()).await;

        let state = assert_ok!(fixture.services.test_port.execute(&com3()).await);
        assert_eq!(state, ProbeState::Unreachable);
        assert_eq!(
            fixture.backend.calls().await,
            vec![BackendCall::TestConnection(com3())]
        );
        let last = fixture.notifier.notices().pop().unwrap();
        assert_eq!(last.level, NoticeLevel::Warning);
        assert_eq!(last.message, "Port COM3 is unavailable or busy");
    }

    #[tokio::test]
    async fn test_device_response_reported() {
        let fixture = Fixture::new().await;
        fixture
            .backend
            .set_probe(com3(), PortProbe::ready(Some("MIDI Device active")))
            .await;

        let state = assert_ok!(fixture.services.test_port.execute(&com3()).await);
        assert!(state.is_ready());
        assert_eq!(
            fixture.backend.calls().await,
            vec![
                BackendCall::TestConnection(com3()),
                BackendCall::TestSerial(com3())
            ]
        );
        let last = fixture.notifier.notices().pop().unwrap();
        assert_eq!(last.level, NoticeLevel::Success);
        assert!(last.message.ends_with("Device responded: MIDI Device active"));
    }

    #[tokio::test]
    async fn test_serial_failure_reason_surfaced() {
        let fixture = Fixture::new().await;
        fixture
            .backend
            .set_probe(com3(), PortProbe::serial_broken("Handshake timed out"))
            .await;

        let state = assert_ok!(fixture.services.test_port.execute(&com3()).await);
        assert_eq!(
            state,
            ProbeState::SerialFailed {
                reason: "Handshake timed out".into()
            }
        );
        assert_eq!(
            fixture.notifier.notices().pop().unwrap().message,
            "Port COM3 is available but serial communication failed: Handshake timed out"
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_reported() {
        let fixture = Fixture::new().await;
        fixture
            .backend
            .fail_with(Some(RepositoryError::transport("connection refused")))
            .await;

        assert_err!(fixture.services.test_port.execute(&com3()).await);
        let last = fixture.notifier.notices().pop().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert_eq!(last.message, "Error communicating with server");
    }
}
