//! Payer notifications

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Outbound channel telling a brewer their entries are paid
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn entries_paid(&self, user_id: Uuid, contest_id: Uuid, entry_codes: Vec<i32>) -> anyhow::Result<()>;
}

/// Writes notifications to the log; mail delivery plugs in behind the same trait
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn entries_paid(&self, user_id: Uuid, contest_id: Uuid, entry_codes: Vec<i32>) -> anyhow::Result<()> {
        info!(%user_id, %contest_id, ?entry_codes, "Entries paid");
        Ok(())
    }
}
