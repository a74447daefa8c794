//! Virality: engagement velocity with a freshness decay.

use chrono::{DateTime, Utc};
use pressroom_common::Item;

use super::ScoringRules;

/// Engagement per hour, normalised against the configured divisor, then
/// decayed linearly to zero over the decay window. Views never count.
pub(crate) fn score(rules: &ScoringRules, item: &Item, now: DateTime<Utc>) -> f64 {
    let engagement = item.engagement() as f64;
    if engagement <= 0.0 {
        return 0.0;
    }

    let age_hours = (now - item.published_at).num_seconds() as f64 / 3600.0;
    let velocity = engagement / age_hours.max(1.0);
    let raw = (velocity / rules.virality_velocity_divisor * 100.0).min(100.0);

    // Items older than the decay window score zero no matter how fast they
    // moved. A future published_at clamps to full freshness rather than
    // overshooting.
    let freshness = (1.0 - age_hours / rules.virality_decay_hours).clamp(0.0, 1.0);

    raw * freshness
}
