//! 共有カーネル
//!
//! 複数の集約で使用される共通の値オブジェクト・エラー・通知を定義

pub mod errors;
pub mod notifications;
pub mod value_objects;

pub use errors::RepositoryError;
pub use notifications::{Notice, NoticeLevel};
pub use value_objects::{Entity, Timestamp};
