use crate::api::{VulnBackend, VulnCreate, VulnUpdate};
use crate::error::VulntrackError;
use crate::lifecycle::{
    can_delete, legal_actions, Actor, LegalAction, LifecycleError, Role, Status, Vulnerability,
};

/// Drives lifecycle operations against the backend.
///
/// The backend is the system of record: every operation fetches the
/// authoritative record first, so legality is always re-checked at commit
/// time rather than trusted from whatever state the caller rendered its
/// buttons from.
pub struct LifecycleService<B: VulnBackend> {
    backend: B,
}

impl<B: VulnBackend> LifecycleService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, vuln_id: u64) -> Result<Vulnerability, VulntrackError> {
        Ok(self.backend.fetch_vuln(vuln_id).await?)
    }

    /// Submit a new report. Reporting is a security-engineer action; admins
    /// may report as well.
    pub async fn report(
        &self,
        create: &VulnCreate,
        actor: &Actor,
    ) -> Result<Vulnerability, VulntrackError> {
        if !matches!(actor.role, Role::SecurityEngineer | Role::SuperAdmin) {
            return Err(LifecycleError::PermissionDenied { action: "report" }.into());
        }
        Ok(self.backend.create_vuln(create).await?)
    }

    /// The transitions `actor` may request right now, from live state.
    pub async fn query_legal_actions(
        &self,
        vuln_id: u64,
        actor: &Actor,
    ) -> Result<Vec<LegalAction>, VulntrackError> {
        let vuln = self.backend.fetch_vuln(vuln_id).await?;
        Ok(legal_actions(&vuln, actor))
    }

    /// Validate and submit a transition. Nothing is considered applied
    /// unless the backend confirms it; every failure propagates.
    pub async fn submit_transition(
        &self,
        vuln_id: u64,
        to: Status,
        actor: &Actor,
        annotation: Option<&str>,
    ) -> Result<Vulnerability, VulntrackError> {
        let current = self.backend.fetch_vuln(vuln_id).await?;
        let updated = current.apply_transition(to, actor, annotation)?;
        let payload = VulnUpdate::diff(&current, &updated);
        Ok(self.backend.update_vuln(vuln_id, &payload).await?)
    }

    /// Delete a record, subject to the delete permission rules.
    pub async fn delete(&self, vuln_id: u64, actor: &Actor) -> Result<(), VulntrackError> {
        let current = self.backend.fetch_vuln(vuln_id).await?;
        if !can_delete(actor, &current) {
            return Err(LifecycleError::PermissionDenied { action: "delete" }.into());
        }
        Ok(self.backend.delete_vuln(vuln_id).await?)
    }
}
