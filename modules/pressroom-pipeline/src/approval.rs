//! The draft review state machine.
//!
//! `next_status` is the whole policy: given where a draft is and what a
//! reviewer wants to do, it either names the next state or says why not.
//! `Approvals::apply` wraps it with loading, the guarded write, and the
//! audit trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pressroom_common::{Draft, DraftStatus, PressroomError, Result};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::traits::PipelineStore;

#[derive(Debug, Clone)]
pub enum DraftAction {
    /// Approve as-is, or with a replacement body in the same step.
    Approve { edited_body: Option<String> },
    Reject { reason: String },
    Edit { body: String },
    Schedule { at: DateTime<Utc> },
    MarkPublished { external_post_id: String },
}

impl DraftAction {
    pub fn name(&self) -> &'static str {
        match self {
            DraftAction::Approve { .. } => "approve",
            DraftAction::Reject { .. } => "reject",
            DraftAction::Edit { .. } => "edit",
            DraftAction::Schedule { .. } => "schedule",
            DraftAction::MarkPublished { .. } => "publish",
        }
    }
}

/// The transition table. Illegal (status, action) pairs fail as
/// `IneligibleTransition` before any payload checks, so a reviewer acting
/// on a stale screen sees the state problem, not a payload nitpick.
pub fn next_status(
    current: DraftStatus,
    action: &DraftAction,
    now: DateTime<Utc>,
) -> Result<DraftStatus> {
    match (current, action) {
        (DraftStatus::Pending, DraftAction::Approve { edited_body }) => {
            if let Some(body) = edited_body {
                if body.trim().is_empty() {
                    return Err(PressroomError::Validation(
                        "edited body must not be empty".to_string(),
                    ));
                }
            }
            Ok(DraftStatus::Approved)
        }
        (DraftStatus::Pending, DraftAction::Reject { reason }) => {
            if reason.trim().is_empty() {
                return Err(PressroomError::Validation(
                    "a rejection needs a reason".to_string(),
                ));
            }
            Ok(DraftStatus::Rejected)
        }
        (DraftStatus::Pending | DraftStatus::Approved, DraftAction::Edit { body }) => {
            if body.trim().is_empty() {
                return Err(PressroomError::Validation(
                    "edited body must not be empty".to_string(),
                ));
            }
            Ok(current)
        }
        (DraftStatus::Approved, DraftAction::Schedule { at }) => {
            if *at <= now {
                return Err(PressroomError::Validation(
                    "scheduled time must be in the future".to_string(),
                ));
            }
            Ok(DraftStatus::Scheduled)
        }
        (
            DraftStatus::Approved | DraftStatus::Scheduled,
            DraftAction::MarkPublished { external_post_id },
        ) => {
            if external_post_id.trim().is_empty() {
                return Err(PressroomError::Validation(
                    "external post id must not be empty".to_string(),
                ));
            }
            Ok(DraftStatus::Published)
        }
        _ => Err(PressroomError::IneligibleTransition {
            status: current,
            action: action.name().to_string(),
        }),
    }
}

pub struct Approvals {
    store: Arc<dyn PipelineStore>,
}

impl Approvals {
    pub fn new(store: Arc<dyn PipelineStore>) -> Self {
        Self { store }
    }

    /// Applies one reviewer action. The write is guarded on the status the
    /// draft held when it was loaded, so two reviewers racing on the same
    /// draft resolve to one winner and one `Conflict`.
    pub async fn apply(&self, draft_id: Uuid, action: DraftAction, actor: &str) -> Result<Draft> {
        let now = Utc::now();
        let draft = self
            .store
            .draft(draft_id)
            .await?
            .ok_or_else(|| PressroomError::NotFound(format!("draft {draft_id}")))?;

        next_status(draft.status, &action, now)?;

        let updated = match &action {
            DraftAction::Approve { edited_body } => {
                self.store
                    .approve_draft(draft_id, draft.status, actor, edited_body.as_deref(), now)
                    .await?
            }
            DraftAction::Reject { reason } => {
                self.store.reject_draft(draft_id, draft.status, reason).await?
            }
            DraftAction::Edit { body } => {
                self.store
                    .edit_draft(draft_id, draft.status, actor, body, now)
                    .await?
            }
            DraftAction::Schedule { at } => {
                self.store.schedule_draft(draft_id, draft.status, *at).await?
            }
            DraftAction::MarkPublished { external_post_id } => {
                self.store
                    .publish_draft(draft_id, draft.status, external_post_id, now)
                    .await?
            }
        };
        let updated = updated.ok_or_else(|| {
            PressroomError::Conflict(format!(
                "draft {draft_id} changed while the action was applied"
            ))
        })?;

        let details = audit_details(&draft, &updated, &action);
        if let Err(e) = self
            .store
            .record_audit(action.name(), "draft", draft_id, actor, details)
            .await
        {
            warn!(draft = %draft_id, error = %e, "Failed to record audit entry");
        }

        info!(
            draft = %draft_id,
            action = action.name(),
            from = %draft.status,
            to = %updated.status,
            actor,
            "Draft transition"
        );
        Ok(updated)
    }
}

fn audit_details(before: &Draft, after: &Draft, action: &DraftAction) -> serde_json::Value {
    let mut details = json!({
        "from": before.status.to_string(),
        "to": after.status.to_string(),
    });
    match action {
        DraftAction::Approve { edited_body } => {
            details["edited"] = json!(edited_body.is_some());
        }
        DraftAction::Reject { reason } => {
            details["reason"] = json!(reason);
        }
        DraftAction::Edit { .. } => {}
        DraftAction::Schedule { at } => {
            details["scheduled_at"] = json!(at);
        }
        DraftAction::MarkPublished { external_post_id } => {
            details["external_post_id"] = json!(external_post_id);
        }
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn approve() -> DraftAction {
        DraftAction::Approve { edited_body: None }
    }

    fn reject() -> DraftAction {
        DraftAction::Reject {
            reason: "off brand".to_string(),
        }
    }

    fn edit() -> DraftAction {
        DraftAction::Edit {
            body: "tightened copy".to_string(),
        }
    }

    fn schedule_in(hours: i64, now: DateTime<Utc>) -> DraftAction {
        DraftAction::Schedule {
            at: now + Duration::hours(hours),
        }
    }

    fn publish() -> DraftAction {
        DraftAction::MarkPublished {
            external_post_id: "tw_99".to_string(),
        }
    }

    // ==========================================================
    // Legal transitions
    // ==========================================================

    #[test]
    fn pending_draft_can_be_approved_rejected_or_edited() {
        let now = Utc::now();
        assert_eq!(
            next_status(DraftStatus::Pending, &approve(), now).unwrap(),
            DraftStatus::Approved
        );
        assert_eq!(
            next_status(DraftStatus::Pending, &reject(), now).unwrap(),
            DraftStatus::Rejected
        );
        assert_eq!(
            next_status(DraftStatus::Pending, &edit(), now).unwrap(),
            DraftStatus::Pending
        );
    }

    #[test]
    fn approved_draft_can_be_edited_scheduled_or_published() {
        let now = Utc::now();
        assert_eq!(
            next_status(DraftStatus::Approved, &edit(), now).unwrap(),
            DraftStatus::Approved
        );
        assert_eq!(
            next_status(DraftStatus::Approved, &schedule_in(2, now), now).unwrap(),
            DraftStatus::Scheduled
        );
        assert_eq!(
            next_status(DraftStatus::Approved, &publish(), now).unwrap(),
            DraftStatus::Published
        );
    }

    #[test]
    fn scheduled_draft_can_only_be_published() {
        let now = Utc::now();
        assert_eq!(
            next_status(DraftStatus::Scheduled, &publish(), now).unwrap(),
            DraftStatus::Published
        );
        for action in [approve(), reject(), edit(), schedule_in(2, now)] {
            assert!(matches!(
                next_status(DraftStatus::Scheduled, &action, now),
                Err(PressroomError::IneligibleTransition { .. })
            ));
        }
    }

    #[test]
    fn approve_may_carry_an_edit() {
        let action = DraftAction::Approve {
            edited_body: Some("better copy".to_string()),
        };
        assert_eq!(
            next_status(DraftStatus::Pending, &action, Utc::now()).unwrap(),
            DraftStatus::Approved
        );
    }

    // ==========================================================
    // Illegal transitions
    // ==========================================================

    #[test]
    fn terminal_states_accept_nothing() {
        let now = Utc::now();
        for status in [DraftStatus::Rejected, DraftStatus::Published] {
            for action in [approve(), reject(), edit(), schedule_in(2, now), publish()] {
                let err = next_status(status, &action, now).unwrap_err();
                assert!(
                    matches!(err, PressroomError::IneligibleTransition { .. }),
                    "{status} should refuse {}",
                    action.name()
                );
            }
        }
    }

    #[test]
    fn pending_cannot_skip_ahead() {
        let now = Utc::now();
        for action in [schedule_in(2, now), publish()] {
            assert!(matches!(
                next_status(DraftStatus::Pending, &action, now),
                Err(PressroomError::IneligibleTransition { .. })
            ));
        }
    }

    #[test]
    fn approved_cannot_be_approved_or_rejected_again() {
        let now = Utc::now();
        for action in [approve(), reject()] {
            assert!(matches!(
                next_status(DraftStatus::Approved, &action, now),
                Err(PressroomError::IneligibleTransition { .. })
            ));
        }
    }

    #[test]
    fn state_errors_outrank_payload_errors() {
        // an empty reason on an already-published draft is a state problem
        let bad_reject = DraftAction::Reject { reason: "  ".to_string() };
        let err = next_status(DraftStatus::Published, &bad_reject, Utc::now()).unwrap_err();
        assert!(matches!(err, PressroomError::IneligibleTransition { .. }));
    }

    // ==========================================================
    // Payload validation
    // ==========================================================

    #[test]
    fn blank_payloads_are_rejected() {
        let now = Utc::now();
        let cases = [
            DraftAction::Approve { edited_body: Some("  ".to_string()) },
            DraftAction::Reject { reason: String::new() },
            DraftAction::Edit { body: "\n".to_string() },
            DraftAction::MarkPublished { external_post_id: String::new() },
        ];
        for action in cases {
            let err = next_status(DraftStatus::Pending, &action, now)
                .or_else(|e| match e {
                    PressroomError::IneligibleTransition { .. } => {
                        next_status(DraftStatus::Approved, &action, now)
                    }
                    other => Err(other),
                })
                .unwrap_err();
            assert!(
                matches!(err, PressroomError::Validation(_)),
                "{} should fail validation",
                action.name()
            );
        }
    }

    #[test]
    fn scheduling_into_the_past_fails() {
        let now = Utc::now();
        let action = DraftAction::Schedule {
            at: now - Duration::minutes(1),
        };
        assert!(matches!(
            next_status(DraftStatus::Approved, &action, now),
            Err(PressroomError::Validation(_))
        ));

        let exactly_now = DraftAction::Schedule { at: now };
        assert!(matches!(
            next_status(DraftStatus::Approved, &exactly_now, now),
            Err(PressroomError::Validation(_))
        ));
    }
}
