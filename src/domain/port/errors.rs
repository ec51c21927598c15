use super::PortId;
use crate::domain::shared::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("Port id must not be empty")]
    EmptyId,

    #[error("USB port {0} is not available")]
    NotAvailable(PortId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
