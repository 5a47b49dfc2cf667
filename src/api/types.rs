use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{Status, Vulnerability};

/// The backend wraps every payload in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// Sparse update payload for `PUT /vulns/{id}`: the new status plus only
/// the side-effect fields the transition stamped. Everything else is
/// omitted so the backend leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retester_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejector_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retest_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resubmitted_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retest_result: Option<String>,
    /// `Some("")` clears the reason on resubmission; the backend treats
    /// an empty string as a cleared field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

/// Payload for `POST /vulns`: a new report, created in `unfixed` with an
/// assigned dev engineer and a fix deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub project_id: u64,
    pub assignee_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_deadline: Option<DateTime<Utc>>,
}

fn changed<T: Clone + PartialEq>(before: &Option<T>, after: &Option<T>) -> Option<T> {
    if after != before { after.clone() } else { None }
}

impl VulnUpdate {
    /// The delta a transition produced, as the backend expects it.
    pub fn diff(before: &Vulnerability, after: &Vulnerability) -> Self {
        let reject_reason = match (&before.reject_reason, &after.reject_reason) {
            (Some(_), None) => Some(String::new()),
            (b, a) => changed(b, a),
        };

        VulnUpdate {
            status: (after.status != before.status).then_some(after.status),
            fixer_id: changed(&before.fixer_id, &after.fixer_id),
            retester_id: changed(&before.retester_id, &after.retester_id),
            rejector_id: changed(&before.rejector_id, &after.rejector_id),
            fix_started_at: changed(&before.fix_started_at, &after.fix_started_at),
            fixed_at: changed(&before.fixed_at, &after.fixed_at),
            retest_at: changed(&before.retest_at, &after.retest_at),
            completed_at: changed(&before.completed_at, &after.completed_at),
            ignored_at: changed(&before.ignored_at, &after.ignored_at),
            rejected_at: changed(&before.rejected_at, &after.rejected_at),
            resubmitted_at: changed(&before.resubmitted_at, &after.resubmitted_at),
            ignore_reason: changed(&before.ignore_reason, &after.ignore_reason),
            retest_result: changed(&before.retest_result, &after.retest_result),
            reject_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testutil::{actor, sample_vuln};
    use crate::lifecycle::Role;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn envelope_roundtrip() {
        let json = r#"{"code":200,"message":"ok","data":{"value":1}}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.code, 200);
        assert!(resp.data.is_some());
    }

    #[test]
    fn envelope_without_data() {
        let json = r#"{"code":404,"message":"not found"}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.code, 404);
        assert!(resp.data.is_none());
    }

    #[test]
    fn fixing_diff_carries_only_stamped_fields() {
        let before = sample_vuln(Status::Unfixed);
        let after = before
            .apply_transition_at(Status::Fixing, &actor(9, Role::DevEngineer), None, at(10))
            .unwrap();

        let update = VulnUpdate::diff(&before, &after);
        let json = serde_json::to_value(&update).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["fix_started_at", "fixer_id", "status"]);
        assert_eq!(json["status"], "fixing");
        assert_eq!(json["fixer_id"], 9);
    }

    #[test]
    fn rejection_diff_includes_reason_and_attribution() {
        let before = sample_vuln(Status::Unfixed);
        let after = before
            .apply_transition_at(
                Status::Rejected,
                &actor(5, Role::SecurityEngineer),
                Some("duplicate"),
                at(0),
            )
            .unwrap();

        let update = VulnUpdate::diff(&before, &after);
        assert_eq!(update.status, Some(Status::Rejected));
        assert_eq!(update.reject_reason.as_deref(), Some("duplicate"));
        assert_eq!(update.rejector_id, Some(5));
        assert_eq!(update.rejected_at, Some(at(0)));
        assert!(update.fixed_at.is_none());
    }

    #[test]
    fn resubmission_diff_sends_cleared_reason() {
        let reporter = actor(5, Role::SecurityEngineer);
        let rejected = sample_vuln(Status::Unfixed)
            .apply_transition_at(Status::Rejected, &reporter, Some("needs detail"), at(0))
            .unwrap();
        let resubmitted = rejected
            .apply_transition_at(Status::Unfixed, &reporter, None, at(10))
            .unwrap();

        let update = VulnUpdate::diff(&rejected, &resubmitted);
        assert_eq!(update.status, Some(Status::Unfixed));
        assert_eq!(update.reject_reason.as_deref(), Some(""));
        assert_eq!(update.resubmitted_at, Some(at(10)));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["reject_reason"], "");
    }

    #[test]
    fn unchanged_fields_are_omitted_from_json() {
        let before = sample_vuln(Status::Retesting);
        let after = before
            .apply_transition_at(
                Status::Completed,
                &actor(5, Role::SecurityEngineer),
                None,
                at(99),
            )
            .unwrap();

        let json = serde_json::to_value(VulnUpdate::diff(&before, &after)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("status"));
        assert!(obj.contains_key("completed_at"));
    }
}
