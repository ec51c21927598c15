//! インフラストラクチャ層
//!
//! ドメインのリポジトリトレイトを外部システムに結びつける

pub mod backend;

pub use backend::{BackendCall, BackendClient, InMemoryBackend, PortProbe};
