pub mod http;

pub use http::{interpret_list_response, interpret_save_response, HttpVoucherService};

use crate::error::Result;
use crate::record::VoucherRecord;
use async_trait::async_trait;

/// Result of a save that reached the server and was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The server already holds this voucher code and stored nothing.
    Duplicate,
}

#[async_trait]
pub trait SaveService: Send + Sync {
    async fn save(&self, record: &VoucherRecord) -> Result<SaveOutcome>;
}

#[async_trait]
pub trait ListService: Send + Sync {
    async fn list(&self) -> Result<Vec<VoucherRecord>>;
}
