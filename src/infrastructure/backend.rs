//! 設定用バックエンドへのアダプター
//!
//! HTTP クライアントとプロセス内バックエンドの2実装を持つ。

pub mod dto;
pub mod http_client;
pub mod in_memory;

pub use http_client::{BackendClient, DEFAULT_API_BASE_URL};
pub use in_memory::{BackendCall, InMemoryBackend, PortProbe};
