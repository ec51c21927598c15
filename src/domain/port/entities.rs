use super::value_objects::*;
use crate::domain::shared::Entity;
use serde::{Deserialize, Serialize};

/// 検出されたシリアル/USB ポート
///
/// 一覧取得のたびに作り直され、永続化されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbPort {
    pub id: PortId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl UsbPort {
    pub fn new(id: PortId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            manufacturer: None,
            product: None,
        }
    }

    pub fn with_details(
        mut self,
        description: Option<String>,
        manufacturer: Option<String>,
        product: Option<String>,
    ) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        self.description = non_empty(description);
        self.manufacturer = non_empty(manufacturer);
        self.product = non_empty(product);
        self
    }
}

impl Entity for UsbPort {
    type Id = PortId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// ポート一覧の取得結果
///
/// `message` はバックエンドからの補足 (ポートが無い場合の案内など)。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortListing {
    pub ports: Vec<UsbPort>,
    pub message: Option<String>,
}

impl PortListing {
    pub fn new(ports: Vec<UsbPort>) -> Self {
        Self {
            ports,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
