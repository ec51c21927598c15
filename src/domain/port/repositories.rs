use super::{PortId, PortListing};
use crate::domain::shared::RepositoryError;
use async_trait::async_trait;

/// ポート列挙と疎通確認 (`/usb-ports`)
#[async_trait]
pub trait PortRepository: Send + Sync {
    async fn list_ports(&self) -> Result<PortListing, RepositoryError>;
    /// 第1段階: ポートを開けるか (`is_connected`)
    async fn test_connection(&self, port: &PortId) -> Result<bool, RepositoryError>;
    /// 第2段階: シリアルハンドシェイク。デバイスの応答文字列があれば返す
    async fn test_serial(&self, port: &PortId) -> Result<Option<String>, RepositoryError>;
}
