use async_trait::async_trait;

use super::{DeliveryOutcome, Digest, DigestSink};

/// Stands in when no webhook is configured. Always reports Skipped so the
/// cycle log still shows the digest was considered.
pub struct NoopSink;

#[async_trait]
impl DigestSink for NoopSink {
    async fn deliver(&self, _digest: &Digest) -> DeliveryOutcome {
        DeliveryOutcome::skipped("no digest sink configured")
    }
}
