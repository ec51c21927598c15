//! 設定用バックエンドの HTTP クライアント
//!
//! すべてのリポジトリトレイトをひとつのクライアントで実装する。
//! レスポンスは `success` フィールドで判定し、HTTP ステータスは色の保存でのみ使う。

use super::dto::{
    Accepted, ApiEnvelope, ColorUpdate, ConnectionTestData, DeviceResponseData, HealthResponse,
    MappingRecord, PortRecord, PortTestRequest, snapshot_from_records,
};
use crate::domain::command::{Command, CommandDraft, CommandId, CommandRepository};
use crate::domain::configuration::{
    BackendHealth, ConfigurationRepository, PushOutcome, PushRequest,
};
use crate::domain::mapping::{
    BulkMappingPayload, ButtonColor, ButtonSlot, MappingRepository, MappingSnapshot,
};
use crate::domain::port::{PortId, PortListing, PortRepository, UsbPort};
use crate::domain::preset::{Preset, PresetDraft, PresetId, PresetRepository};
use crate::domain::shared::RepositoryError;
use crate::measure_time;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

/// バックエンド API クライアント
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl BackendClient {
    /// `base_url` は `http://host:port/api` の形式 (末尾のスラッシュは無視)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// 既存の [`reqwest::Client`] を再利用する
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ---- private helpers ----

    /// リクエストを送り、封筒形式のレスポンスを解釈する
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Accepted<T>, RepositoryError> {
        let response = measure_time!(operation, { request.send().await })
            .map_err(|e| RepositoryError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::transport(e.to_string()))?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            warn!(operation, status = status.as_u16(), error = %e, "Response is not an API envelope");
            RepositoryError::malformed(format!("HTTP {}: {e}", status.as_u16()))
        })?;
        debug!(operation, status = status.as_u16(), success = envelope.success, "Backend responded");
        envelope.into_accepted()
    }

    /// 封筒の中身を読まず、HTTP ステータスだけで判定する
    async fn send_checked(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<(), RepositoryError> {
        let response = measure_time!(operation, { request.send().await })
            .map_err(|e| RepositoryError::transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!(operation, status = status.as_u16(), body = %body, "Backend returned an error status");
            return Err(RepositoryError::rejected(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRepository for BackendClient {
    async fn list_commands(&self) -> Result<Vec<Command>, RepositoryError> {
        let request = self.client.get(self.url("/commands"));
        let accepted = self.send_envelope("list_commands", request).await?;
        Ok(accepted.data.unwrap_or_default())
    }

    async fn create_command(&self, draft: &CommandDraft) -> Result<Option<Command>, RepositoryError> {
        let request = self.client.post(self.url("/commands")).json(draft);
        let accepted = self.send_envelope("create_command", request).await?;
        Ok(accepted.data)
    }

    async fn update_command(&self, id: CommandId, draft: &CommandDraft) -> Result<(), RepositoryError> {
        let request = self
            .client
            .put(self.url(&format!("/commands/{id}")))
            .json(draft);
        self.send_envelope::<serde_json::Value>("update_command", request)
            .await?;
        Ok(())
    }

    async fn delete_command(&self, id: CommandId) -> Result<(), RepositoryError> {
        let request = self.client.delete(self.url(&format!("/commands/{id}")));
        self.send_envelope::<serde_json::Value>("delete_command", request)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MappingRepository for BackendClient {
    async fn load_mappings(&self) -> Result<MappingSnapshot, RepositoryError> {
        let request = self.client.get(self.url("/button-mappings"));
        let accepted: Accepted<BTreeMap<String, MappingRecord>> =
            self.send_envelope("load_mappings", request).await?;
        Ok(snapshot_from_records(accepted.data.unwrap_or_default()))
    }

    async fn save_mappings(&self, payload: &BulkMappingPayload) -> Result<(), RepositoryError> {
        let request = self.client.post(self.url("/button-mappings")).json(payload);
        self.send_envelope::<serde_json::Value>("save_mappings", request)
            .await?;
        Ok(())
    }

    async fn save_color(&self, slot: ButtonSlot, color: &ButtonColor) -> Result<(), RepositoryError> {
        let body = ColorUpdate {
            button_number: slot.number(),
            color: &color.value,
            is_preset: color.is_preset,
        };
        let request = self
            .client
            .post(self.url("/button-mappings/color"))
            .json(&body);
        self.send_checked("save_color", request).await
    }
}

#[async_trait]
impl PresetRepository for BackendClient {
    async fn list_presets(&self) -> Result<Vec<Preset>, RepositoryError> {
        let request = self.client.get(self.url("/presets"));
        let accepted = self.send_envelope("list_presets", request).await?;
        Ok(accepted.data.unwrap_or_default())
    }

    async fn save_preset(&self, draft: &PresetDraft) -> Result<Option<String>, RepositoryError> {
        let request = self.client.post(self.url("/presets")).json(draft);
        let accepted = self
            .send_envelope::<serde_json::Value>("save_preset", request)
            .await?;
        Ok(accepted.message)
    }

    async fn load_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError> {
        let request = self.client.get(self.url(&format!("/presets/{id}")));
        let accepted = self
            .send_envelope::<serde_json::Value>("load_preset", request)
            .await?;
        Ok(accepted.message)
    }

    async fn delete_preset(&self, id: PresetId) -> Result<Option<String>, RepositoryError> {
        let request = self.client.delete(self.url(&format!("/presets/{id}")));
        let accepted = self
            .send_envelope::<serde_json::Value>("delete_preset", request)
            .await?;
        Ok(accepted.message)
    }
}

#[async_trait]
impl PortRepository for BackendClient {
    async fn list_ports(&self) -> Result<PortListing, RepositoryError> {
        let request = self.client.get(self.url("/usb-ports"));
        let accepted: Accepted<Vec<PortRecord>> =
            self.send_envelope("list_ports", request).await?;
        let ports = accepted
            .data
            .unwrap_or_default()
            .into_iter()
            .map(UsbPort::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let listing = PortListing::new(ports);
        Ok(match accepted.message {
            Some(message) => listing.with_message(message),
            None => listing,
        })
    }

    async fn test_connection(&self, port: &PortId) -> Result<bool, RepositoryError> {
        let request = self
            .client
            .post(self.url("/usb-ports/test"))
            .json(&PortTestRequest {
                port_id: port.as_str(),
            });
        let accepted: Accepted<ConnectionTestData> =
            self.send_envelope("test_connection", request).await?;
        Ok(accepted.require_data()?.is_connected)
    }

    async fn test_serial(&self, port: &PortId) -> Result<Option<String>, RepositoryError> {
        let request = self
            .client
            .post(self.url("/usb-ports/test-serial"))
            .json(&PortTestRequest {
                port_id: port.as_str(),
            });
        let accepted: Accepted<DeviceResponseData> =
            self.send_envelope("test_serial", request).await?;
        Ok(accepted
            .data
            .and_then(|data| data.device_response)
            .filter(|r| !r.is_empty()))
    }
}

#[async_trait]
impl ConfigurationRepository for BackendClient {
    async fn push_configuration(&self, request: &PushRequest) -> Result<PushOutcome, RepositoryError> {
        let http_request = self.client.post(self.url("/configuration")).json(request);
        let accepted: Accepted<DeviceResponseData> =
            self.send_envelope("push_configuration", http_request).await?;
        Ok(PushOutcome {
            message: accepted.message,
            device_response: accepted.data.and_then(|data| data.device_response),
        })
    }

    async fn check_health(&self) -> Result<BackendHealth, RepositoryError> {
        let response = measure_time!("check_health", {
            self.client.get(self.url("/health")).send().await
        })
        .map_err(|e| RepositoryError::transport(e.to_string()))?;
        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| RepositoryError::malformed(e.to_string()))?;
        Ok(BackendHealth {
            status: health.status,
            timestamp: health.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    /// テスト用のバックエンドを一時ポートで起動する
    async fn spawn_stub(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    fn recording_router(received: Received) -> Router {
        let bulk = received.clone();
        let color = received.clone();
        let push = received.clone();
        Router::new()
            .route(
                "/api/commands",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "data": [
                            {"id": 1, "name": "Play/Pause", "value": 102, "created_at": "2024-05-01 10:00:00"},
                            {"id": 2, "name": "Start Recording", "value": 100}
                        ]
                    }))
                })
                .post(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({"success": false, "error": "Command with that name already exists"})),
                    )
                }),
            )
            .route(
                "/api/commands/{id}",
                put(|Path(id): Path<i64>| async move {
                    Json(json!({"success": id == 1, "error": "Command not found"}))
                }),
            )
            .route(
                "/api/button-mappings",
                get(|| async {
                    Json(json!({"success": true, "data": {"1": 2, "2": {"command_id": 1, "color": "red", "is_preset": true}}}))
                })
                .post(move |Json(body): Json<Value>| {
                    let bulk = bulk.clone();
                    async move {
                        bulk.lock().unwrap().push(("bulk".into(), body));
                        Json(json!({"success": true, "message": "Button mappings updated"}))
                    }
                }),
            )
            .route(
                "/api/button-mappings/color",
                post(move |Json(body): Json<Value>| {
                    let color = color.clone();
                    async move {
                        color.lock().unwrap().push(("color".into(), body));
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                }),
            )
            .route(
                "/api/usb-ports",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "data": [],
                        "message": "No USB/Serial ports available."
                    }))
                }),
            )
            .route(
                "/api/usb-ports/test",
                post(|| async {
                    Json(json!({"success": true, "data": {"port_id": "COM3", "is_connected": true}}))
                }),
            )
            .route(
                "/api/usb-ports/test-serial",
                post(|| async {
                    Json(json!({"success": true, "data": {"device_response": "MIDI Device active"}}))
                }),
            )
            .route(
                "/api/configuration",
                post(move |Json(body): Json<Value>| {
                    let push = push.clone();
                    async move {
                        push.lock().unwrap().push(("push".into(), body));
                        Json(json!({"success": true, "message": "Configuration sent", "data": {"device_response": "config_ack"}}))
                    }
                }),
            )
            .route(
                "/api/presets",
                get(|| async { "<html>not json</html>" }),
            )
            .route(
                "/api/health",
                get(|| async {
                    Json(json!({"status": "healthy", "timestamp": "2024-05-01T10:00:00.123456"}))
                }),
            )
    }

    #[tokio::test]
    async fn test_client_against_stub_backend() {
        let received: Received = Arc::new(Mutex::new(Vec::new()));
        let base_url = spawn_stub(recording_router(received.clone())).await;
        let client = BackendClient::new(format!("{base_url}/"));
        assert_eq!(client.base_url(), base_url);

        // 一覧
        let commands = assert_ok!(client.list_commands().await);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].value.get(), 102);

        // 4xx でも封筒があれば業務エラー
        let draft = CommandDraft::new("Play/Pause", 1).unwrap();
        let err = assert_err!(client.create_command(&draft).await);
        assert_eq!(err, RepositoryError::rejected("Command with that name already exists"));
        let err = assert_err!(client.update_command(CommandId::new(5), &draft).await);
        assert!(err.is_rejection());
        assert_ok!(client.update_command(CommandId::new(1), &draft).await);

        // マッピング
        let snapshot = assert_ok!(client.load_mappings().await);
        assert_eq!(snapshot.mappings.len(), 2);
        let mut table = crate::domain::mapping::ButtonMappingTable::new();
        table.set_command(ButtonSlot::new(1).unwrap(), Some(CommandId::new(7)));
        table.set_command(ButtonSlot::new(3).unwrap(), Some(CommandId::new(9)));
        assert_ok!(client.save_mappings(&table.bulk_payload()).await);

        // 色の保存は HTTP ステータスで判定
        let color = ButtonColor::parse("#ABCDEF").unwrap();
        assert_err!(client.save_color(ButtonSlot::new(2).unwrap(), &color).await);

        // ポート
        let listing = assert_ok!(client.list_ports().await);
        assert!(listing.ports.is_empty());
        assert_eq!(listing.message.as_deref(), Some("No USB/Serial ports available."));
        let port = PortId::new("COM3").unwrap();
        assert!(assert_ok!(client.test_connection(&port).await));
        assert_eq!(
            assert_ok!(client.test_serial(&port).await).as_deref(),
            Some("MIDI Device active")
        );

        // 送信
        let outcome = assert_ok!(
            client
                .push_configuration(&PushRequest { usb_port: port })
                .await
        );
        assert_eq!(outcome.device_response.as_deref(), Some("config_ack"));

        // 封筒でないレスポンス
        let err = assert_err!(client.list_presets().await);
        assert!(matches!(err, RepositoryError::MalformedResponse { .. }));

        let health = assert_ok!(client.check_health().await);
        assert!(health.is_healthy());

        let received = received.lock().unwrap();
        assert_eq!(received[0], ("bulk".to_string(), json!({"1": 7, "3": 9})));
        assert_eq!(
            received[1],
            (
                "color".to_string(),
                json!({"button_number": 2, "color": "#abcdef", "is_preset": false})
            )
        );
        assert_eq!(received[2], ("push".to_string(), json!({"usbPort": "COM3"})));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // 一時ポートを確保してすぐ閉じる
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = BackendClient::new(format!("http://{addr}/api"));
        let err = assert_err!(client.list_commands().await);
        assert!(err.is_transient());
        assert!(!err.is_rejection());
    }
}
