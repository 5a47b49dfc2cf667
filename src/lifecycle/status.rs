use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::actor::Actor;
use super::vuln::Vulnerability;

/// The seven statuses of the vulnerability lifecycle.
///
/// Happy path: `unfixed → fixing → fixed → retesting → completed`.
/// Side branches: rejection (`unfixed`/`fixing` → `rejected` → back to
/// `unfixed` on resubmission), won't-fix (`fixing` → `ignored` → back to
/// `unfixed` on reactivation), and failed retest (`retesting` → `unfixed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unfixed,
    Fixing,
    Fixed,
    Retesting,
    Completed,
    Rejected,
    Ignored,
}

impl Status {
    /// The snake_case string the backend stores and expects.
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Unfixed => "unfixed",
            Status::Fixing => "fixing",
            Status::Fixed => "fixed",
            Status::Retesting => "retesting",
            Status::Completed => "completed",
            Status::Rejected => "rejected",
            Status::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may request a given transition, composed from role and ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    /// The dev engineer the vulnerability is assigned to.
    Assignee,
    /// Reporter, project owner, or admin — never the assignee. The fixer
    /// must not verify their own fix.
    Verifier,
    /// Admin, or the reporter acting on their own report.
    Rejecter,
    /// The original reporter, or admin.
    ReporterOrAdmin,
}

impl Guard {
    fn allows(self, actor: &Actor, vuln: &Vulnerability) -> bool {
        match self {
            Guard::Assignee => actor.is_assignee(vuln),
            Guard::Verifier => {
                actor.is_admin()
                    || ((actor.is_reporter(vuln) || actor.is_project_owner(vuln))
                        && Some(actor.id) != vuln.assignee_id)
            }
            Guard::Rejecter | Guard::ReporterOrAdmin => {
                actor.is_admin() || actor.is_reporter(vuln)
            }
        }
    }
}

/// Free-text annotation a transition requires, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    None,
    /// Why the developer won't fix it (`ignore_reason`).
    IgnoreReason,
    /// Why the retest failed (`retest_result`).
    RetestResult,
    /// Why the report was rejected (`reject_reason`).
    RejectReason,
}

impl Annotation {
    /// Backend field name for the mandatory annotation, if one is required.
    pub const fn field(self) -> Option<&'static str> {
        match self {
            Annotation::None => None,
            Annotation::IgnoreReason => Some("ignore_reason"),
            Annotation::RetestResult => Some("retest_result"),
            Annotation::RejectReason => Some("reject_reason"),
        }
    }
}

/// One row of the transition table.
struct Rule {
    from: Status,
    to: Status,
    guard: Guard,
    annotation: Annotation,
}

/// The entire lifecycle as a declarative table. Every status change in the
/// system goes through exactly one of these rows; anything not listed here
/// is illegal, including self-transitions.
const RULES: &[Rule] = &[
    Rule {
        from: Status::Unfixed,
        to: Status::Fixing,
        guard: Guard::Assignee,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Unfixed,
        to: Status::Fixed,
        guard: Guard::Assignee,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Fixing,
        to: Status::Fixed,
        guard: Guard::Assignee,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Fixing,
        to: Status::Ignored,
        guard: Guard::Assignee,
        annotation: Annotation::IgnoreReason,
    },
    Rule {
        from: Status::Fixed,
        to: Status::Retesting,
        guard: Guard::Verifier,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Retesting,
        to: Status::Completed,
        guard: Guard::Verifier,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Retesting,
        to: Status::Unfixed,
        guard: Guard::Verifier,
        annotation: Annotation::RetestResult,
    },
    Rule {
        from: Status::Ignored,
        to: Status::Unfixed,
        guard: Guard::ReporterOrAdmin,
        annotation: Annotation::None,
    },
    Rule {
        from: Status::Unfixed,
        to: Status::Rejected,
        guard: Guard::Rejecter,
        annotation: Annotation::RejectReason,
    },
    Rule {
        from: Status::Fixing,
        to: Status::Rejected,
        guard: Guard::Rejecter,
        annotation: Annotation::RejectReason,
    },
    Rule {
        from: Status::Rejected,
        to: Status::Unfixed,
        guard: Guard::Rejecter,
        annotation: Annotation::None,
    },
];

/// A transition the acting user may request right now, with the flag the
/// caller needs to decide whether to prompt for a comment first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalAction {
    pub to: Status,
    pub requires_annotation: bool,
}

/// The set of statuses `actor` may move `vuln` to from its current status.
pub fn legal_transitions(vuln: &Vulnerability, actor: &Actor) -> Vec<Status> {
    legal_actions(vuln, actor).into_iter().map(|a| a.to).collect()
}

/// Like [`legal_transitions`], but carries the mandatory-annotation flag.
pub fn legal_actions(vuln: &Vulnerability, actor: &Actor) -> Vec<LegalAction> {
    RULES
        .iter()
        .filter(|r| r.from == vuln.status && r.guard.allows(actor, vuln))
        .map(|r| LegalAction {
            to: r.to,
            requires_annotation: r.annotation != Annotation::None,
        })
        .collect()
}

/// Look up the table row for a requested transition, checking the guard.
/// Returns the required annotation kind, or the error the caller reports.
pub(crate) fn check_transition(
    vuln: &Vulnerability,
    to: Status,
    actor: &Actor,
) -> Result<Annotation, LifecycleError> {
    let rule = RULES
        .iter()
        .find(|r| r.from == vuln.status && r.to == to)
        .ok_or(LifecycleError::IllegalTransition {
            from: vuln.status,
            to,
        })?;

    if !rule.guard.allows(actor, vuln) {
        return Err(LifecycleError::IllegalTransition {
            from: vuln.status,
            to,
        });
    }

    Ok(rule.annotation)
}

/// Failures the engine can report. Both reach the user; neither is ever
/// downgraded to a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The requested status is not reachable from the current one for this
    /// actor. Surfaced as "action not permitted", never retried.
    #[error("transition {from} → {to} is not permitted")]
    IllegalTransition { from: Status, to: Status },

    /// The transition is legal but its mandatory annotation is missing or
    /// blank. Surfaced inline so the user can supply the field.
    #[error("transition to {to} requires a non-empty {field}")]
    MissingAnnotation { to: Status, field: &'static str },

    /// A non-transition operation (edit, delete) denied by the permission
    /// rules.
    #[error("{action} is not permitted for this user")]
    PermissionDenied { action: &'static str },
}
