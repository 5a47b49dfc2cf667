use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::status::{check_transition, LifecycleError, Status};

/// A vulnerability record as the backend stores it.
///
/// Each `*_at` timestamp is stamped by the transition that first reaches
/// the corresponding state and is never altered afterwards, so a timestamp
/// is present exactly when the record has passed through that state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub status: Status,

    pub project_id: u64,
    pub project_owner_id: u64,
    pub reporter_id: u64,
    #[serde(default)]
    pub assignee_id: Option<u64>,
    #[serde(default)]
    pub fixer_id: Option<u64>,
    #[serde(default)]
    pub retester_id: Option<u64>,
    #[serde(default)]
    pub rejector_id: Option<u64>,

    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fix_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fixed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retest_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ignored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resubmitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fix_deadline: Option<DateTime<Utc>>,

    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub ignore_reason: Option<String>,
    #[serde(default)]
    pub retest_result: Option<String>,
}

impl Vulnerability {
    /// A freshly reported vulnerability: `unfixed`, assigned to a dev
    /// engineer with a fix deadline.
    pub fn submitted(
        id: u64,
        title: impl Into<String>,
        project_id: u64,
        project_owner_id: u64,
        reporter_id: u64,
        assignee_id: u64,
        fix_deadline: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            severity: None,
            status: Status::Unfixed,
            project_id,
            project_owner_id,
            reporter_id,
            assignee_id: Some(assignee_id),
            fixer_id: None,
            retester_id: None,
            rejector_id: None,
            submitted_at: now,
            assigned_at: Some(now),
            fix_started_at: None,
            fixed_at: None,
            retest_at: None,
            completed_at: None,
            ignored_at: None,
            rejected_at: None,
            resubmitted_at: None,
            fix_deadline,
            reject_reason: None,
            ignore_reason: None,
            retest_result: None,
        }
    }

    /// Apply a transition, stamping side-effects at the current time.
    ///
    /// Re-validates legality against the current status — the caller's
    /// earlier [`legal_transitions`](super::status::legal_transitions)
    /// filtering is never trusted on its own.
    pub fn apply_transition(
        &self,
        to: Status,
        actor: &Actor,
        annotation: Option<&str>,
    ) -> Result<Vulnerability, LifecycleError> {
        self.apply_transition_at(to, actor, annotation, Utc::now())
    }

    /// Pure core of [`apply_transition`] with the timestamp injected.
    pub fn apply_transition_at(
        &self,
        to: Status,
        actor: &Actor,
        annotation: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vulnerability, LifecycleError> {
        let required = check_transition(self, to, actor)?;

        let note = match required.field() {
            None => None,
            Some(field) => {
                let text = annotation.map(str::trim).unwrap_or("");
                if text.is_empty() {
                    return Err(LifecycleError::MissingAnnotation { to, field });
                }
                Some(text.to_string())
            }
        };

        let mut updated = self.clone();
        updated.status = to;

        match (self.status, to) {
            (Status::Unfixed, Status::Fixing) => {
                updated.fix_started_at.get_or_insert(now);
                updated.fixer_id = Some(actor.id);
            }
            (Status::Unfixed | Status::Fixing, Status::Fixed) => {
                updated.fixed_at.get_or_insert(now);
                updated.fixer_id = Some(actor.id);
            }
            (Status::Fixing, Status::Ignored) => {
                updated.ignore_reason = note;
                updated.ignored_at.get_or_insert(now);
            }
            (Status::Fixed, Status::Retesting) => {
                updated.retester_id = Some(actor.id);
            }
            (Status::Retesting, Status::Completed) => {
                updated.completed_at.get_or_insert(now);
            }
            (Status::Retesting, Status::Unfixed) => {
                updated.retest_result = note;
                updated.retest_at.get_or_insert(now);
            }
            (Status::Ignored, Status::Unfixed) => {
                // Reactivation: back to the queue, nothing to stamp.
            }
            (Status::Unfixed | Status::Fixing, Status::Rejected) => {
                updated.reject_reason = note;
                updated.rejected_at.get_or_insert(now);
                updated.rejector_id = Some(actor.id);
            }
            (Status::Rejected, Status::Unfixed) => {
                updated.reject_reason = None;
                updated.resubmitted_at.get_or_insert(now);
            }
            // check_transition only admits table rows.
            (from, to) => unreachable!("no rule for {from} → {to}"),
        }

        Ok(updated)
    }
}
