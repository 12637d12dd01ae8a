//! Claim workflow
//!
//! Every operation resolves the actor's role and rate from the user store at
//! the moment it runs, checks the claim's current status, and persists the
//! result with a compare-and-set on that status. Two reviewers acting on the
//! same claim at once therefore cannot both succeed: the loser sees
//! `InvalidTransition` and the stored claim reflects only the winner.
//!
//! Checks run in this order, and the first failure is returned:
//!
//! 1. the claim exists
//! 2. the actor exists, is active and holds a permitted role (and owns the claim, for lecturers)
//! 3. the claim's status allows the operation
//! 4. the input is valid
//! 5. the lecturer has an authorized rate, where money is involved

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use core_kernel::{ClaimId, DocumentId, UserId};
use domain_users::{Role, UserDirectory, UserPort};

use crate::claim::{Claim, ClaimRequest, ClaimStatus};
use crate::claim_number::generate_claim_number;
use crate::document::{Document, DocumentMetadata};
use crate::error::ClaimError;
use crate::policy::WorkflowPolicy;
use crate::ports::{ClaimPort, DocumentPort};

/// Workflow operations, as reported in `InvalidTransition`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Edit,
    Submit,
    Verify,
    Return,
    Approve,
    Reject,
    AttachDocument,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Edit => "edit",
            Operation::Submit => "submit",
            Operation::Verify => "verify",
            Operation::Return => "return",
            Operation::Approve => "approve",
            Operation::Reject => "reject",
            Operation::AttachDocument => "attach a document to",
        };
        f.write_str(label)
    }
}

/// The claim state machine
#[derive(Clone)]
pub struct ClaimWorkflow {
    claims: Arc<dyn ClaimPort>,
    documents: Arc<dyn DocumentPort>,
    directory: UserDirectory,
    policy: WorkflowPolicy,
}

impl ClaimWorkflow {
    pub fn new(
        claims: Arc<dyn ClaimPort>,
        documents: Arc<dyn DocumentPort>,
        users: Arc<dyn UserPort>,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            claims,
            documents,
            directory: UserDirectory::new(users),
            policy,
        }
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    /// Creates a draft claim priced at the lecturer's current rate
    ///
    /// # Errors
    ///
    /// * `Unauthorized` unless `actor` is an active lecturer
    /// * `ValidationFailed` for a blank description or hours out of range
    /// * `RateNotConfigured` if HR has not set the lecturer's rate
    #[instrument(skip(self, request), fields(actor = %actor))]
    pub async fn create(&self, actor: UserId, request: ClaimRequest) -> Result<Claim, ClaimError> {
        self.directory.require_role(actor, &[Role::Lecturer]).await?;
        let request = self.validated(request)?;
        let rate = self.directory.authorized_rate(actor).await?;

        let number = generate_claim_number(&self.policy.claim_number_prefix, Utc::now().date_naive());
        let claim = Claim::draft(actor, number, request, rate)?;
        self.claims.insert_claim(&claim).await?;

        info!(
            claim_id = %claim.id,
            claim_number = %claim.claim_number,
            total = %claim.total_amount(),
            "Claim created"
        );
        Ok(claim)
    }

    /// Replaces the lecturer's input on a draft or returned claim
    ///
    /// The claim is re-priced at the lecturer's rate as it stands now, so a
    /// rate change by HR applies to every claim edited afterwards. A
    /// returned claim goes back to draft and loses its reviewer comments.
    #[instrument(skip(self, request), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn edit(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        request: ClaimRequest,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.require_owner(&claim, actor).await?;
        let expected = ensure(&claim, Operation::Edit, ClaimStatus::can_edit)?;
        let request = self.validated(request)?;
        let rate = self.directory.authorized_rate(actor).await?;

        claim.apply_edit(request, rate)?;
        self.persist(&claim, expected, Operation::Edit).await?;

        info!(total = %claim.total_amount(), status = %claim.status, "Claim edited");
        Ok(claim)
    }

    /// Sends a draft or returned claim to the coordinator queue
    #[instrument(skip(self), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn submit(&self, claim_id: ClaimId, actor: UserId) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.require_owner(&claim, actor).await?;
        let expected = ensure(&claim, Operation::Submit, ClaimStatus::can_submit)?;

        if self.policy.require_document_on_submit
            && self.documents.count_for_claim(claim_id).await? == 0
        {
            return Err(ClaimError::validation(
                "attach at least one supporting document before submitting",
            ));
        }
        self.directory.authorized_rate(actor).await?;

        let now = Utc::now();
        claim.status = ClaimStatus::Submitted;
        claim.submitted_at = Some(now);
        claim.updated_at = now;
        self.persist(&claim, expected, Operation::Submit).await?;

        info!("Claim submitted");
        Ok(claim)
    }

    /// Coordinator verifies a submitted claim and forwards it to managers
    #[instrument(skip(self, comments), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn verify(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        comments: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.directory.require_role(actor, &[Role::Coordinator]).await?;
        let expected = ensure(&claim, Operation::Verify, ClaimStatus::can_verify)?;

        claim.status = ClaimStatus::Verified;
        claim.reviewer_comments = normalized(comments);
        claim.coordinator_id = Some(actor);
        claim.touch();
        self.persist(&claim, expected, Operation::Verify).await?;

        info!("Claim verified");
        Ok(claim)
    }

    /// Coordinator sends a submitted claim back to the lecturer
    ///
    /// Comments are mandatory so the lecturer knows what to fix.
    #[instrument(skip(self, comments), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn return_claim(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        comments: &str,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.directory.require_role(actor, &[Role::Coordinator]).await?;
        let expected = ensure(&claim, Operation::Return, ClaimStatus::can_return)?;
        let comments = required_text(comments, "comments are required when returning a claim")?;

        claim.status = ClaimStatus::Returned;
        claim.reviewer_comments = Some(comments);
        claim.coordinator_id = Some(actor);
        claim.touch();
        self.persist(&claim, expected, Operation::Return).await?;

        info!("Claim returned to lecturer");
        Ok(claim)
    }

    /// Manager approves a verified claim
    #[instrument(skip(self, comments), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn approve(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        comments: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.directory.require_role(actor, &[Role::Manager]).await?;
        let expected = ensure(&claim, Operation::Approve, ClaimStatus::can_approve)?;

        claim.status = ClaimStatus::Approved;
        claim.reviewer_comments = normalized(comments);
        claim.manager_id = Some(actor);
        claim.touch();
        self.persist(&claim, expected, Operation::Approve).await?;

        info!(total = %claim.total_amount(), "Claim approved");
        Ok(claim)
    }

    /// A coordinator or manager rejects a submitted or verified claim
    ///
    /// The rejecting reviewer is recorded by the stage the claim was in:
    /// the coordinator for `Submitted`, the manager for `Verified`.
    #[instrument(skip(self, reason), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn reject(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        reason: &str,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        self.directory
            .require_role(actor, &[Role::Coordinator, Role::Manager])
            .await?;
        let expected = ensure(&claim, Operation::Reject, ClaimStatus::can_reject)?;
        let reason = required_text(reason, "a reason is required when rejecting a claim")?;

        claim.status = ClaimStatus::Rejected;
        claim.rejection_reason = Some(reason);
        match expected {
            ClaimStatus::Submitted => claim.coordinator_id = Some(actor),
            _ => claim.manager_id = Some(actor),
        }
        claim.touch();
        self.persist(&claim, expected, Operation::Reject).await?;

        info!(stage = %expected, "Claim rejected");
        Ok(claim)
    }

    /// Stores an encrypted supporting document on an editable claim
    #[instrument(skip(self, metadata, encrypted), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn attach_document(
        &self,
        claim_id: ClaimId,
        actor: UserId,
        metadata: DocumentMetadata,
        encrypted: Vec<u8>,
    ) -> Result<Document, ClaimError> {
        let claim = self.load(claim_id).await?;
        self.require_owner(&claim, actor).await?;
        ensure(&claim, Operation::AttachDocument, ClaimStatus::can_edit)?;

        // The stored size is the payload's, whatever the caller declared.
        let metadata = DocumentMetadata {
            size_bytes: encrypted.len() as u64,
            ..metadata
        };
        if let Some(reason) = self.policy.document_violation(&metadata) {
            return Err(ClaimError::validation(reason));
        }

        let document = self.documents.attach(claim_id, metadata, encrypted).await?;
        info!(document_id = %document.id, file_name = %document.file_name, "Document attached");
        Ok(document)
    }

    /// Documents attached to a claim the actor may view
    pub async fn documents(&self, claim_id: ClaimId, actor: UserId) -> Result<Vec<Document>, ClaimError> {
        self.view(claim_id, actor).await?;
        Ok(self.documents.list_for_claim(claim_id).await?)
    }

    /// Returns a document and its encrypted payload
    ///
    /// Visibility follows the claim the document belongs to.
    #[instrument(skip(self), fields(actor = %actor, document_id = %document_id))]
    pub async fn download_document(
        &self,
        document_id: DocumentId,
        actor: UserId,
    ) -> Result<(Document, Vec<u8>), ClaimError> {
        let (document, payload) = self
            .documents
            .get_document(document_id)
            .await
            .map_err(|e| ClaimError::from_port("Document", document_id, e))?;
        self.view(document.claim_id, actor).await?;

        debug!(size = payload.len(), "Document downloaded");
        Ok((document, payload))
    }

    /// Reads a claim
    ///
    /// Lecturers may only read their own claims; reviewers and HR may read any.
    #[instrument(skip(self), fields(actor = %actor, claim_id = %claim_id))]
    pub async fn view(&self, claim_id: ClaimId, actor: UserId) -> Result<Claim, ClaimError> {
        let claim = self.load(claim_id).await?;
        let profile = self
            .directory
            .require_role(actor, &[Role::Lecturer, Role::Coordinator, Role::Manager, Role::Hr])
            .await?;

        if profile.role == Role::Lecturer && !claim.is_owned_by(actor) {
            return Err(ClaimError::unauthorized("lecturers may only view their own claims"));
        }
        Ok(claim)
    }

    async fn load(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.claims
            .get_claim(claim_id)
            .await
            .map_err(|e| ClaimError::from_port("Claim", claim_id, e))
    }

    async fn require_owner(&self, claim: &Claim, actor: UserId) -> Result<(), ClaimError> {
        self.directory.require_role(actor, &[Role::Lecturer]).await?;
        if !claim.is_owned_by(actor) {
            debug!(owner = %claim.lecturer_id, "Rejected non-owner");
            return Err(ClaimError::unauthorized("only the owning lecturer may change this claim"));
        }
        Ok(())
    }

    fn validated(&self, mut request: ClaimRequest) -> Result<ClaimRequest, ClaimError> {
        request.work_description = request.work_description.trim().to_string();
        request.notes = normalized(request.notes);

        request
            .validate()
            .map_err(|e| ClaimError::validation(e.to_string()))?;

        if request.hours_worked.normalize().scale() > 2 {
            return Err(ClaimError::validation("hours worked may have at most two decimal places"));
        }
        if !self.policy.hours_in_range(request.hours_worked) {
            return Err(ClaimError::validation(format!(
                "hours worked must be between {} and {}",
                self.policy.min_hours, self.policy.max_hours
            )));
        }
        Ok(request)
    }

    /// Writes the claim if its stored status is still `expected`
    async fn persist(
        &self,
        claim: &Claim,
        expected: ClaimStatus,
        operation: Operation,
    ) -> Result<(), ClaimError> {
        match self.claims.update_claim(claim, expected).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() => {
                let current = self.load(claim.id).await?;
                warn!(
                    %operation,
                    expected = %expected,
                    current = %current.status,
                    "Lost concurrent update"
                );
                Err(ClaimError::InvalidTransition {
                    operation,
                    status: current.status,
                })
            }
            Err(e) => Err(ClaimError::from_port("Claim", claim.id, e)),
        }
    }
}

/// Returns the claim's status if `allowed`, otherwise `InvalidTransition`
fn ensure(
    claim: &Claim,
    operation: Operation,
    allowed: fn(&ClaimStatus) -> bool,
) -> Result<ClaimStatus, ClaimError> {
    if allowed(&claim.status) {
        Ok(claim.status)
    } else {
        Err(ClaimError::InvalidTransition {
            operation,
            status: claim.status,
        })
    }
}

fn normalized(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn required_text(text: &str, message: &str) -> Result<String, ClaimError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ClaimError::validation(message));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{MockClaimPort, MockDocumentPort};
    use domain_users::{MockUserPort, User};
    use rust_decimal_macros::dec;

    struct Fixture {
        workflow: ClaimWorkflow,
        lecturer: User,
        coordinator: User,
        manager: User,
    }

    async fn fixture() -> Fixture {
        let lecturer = User::lecturer("Chuma Makhathini", "chuma@example.com", "CS", dec!(350));
        let coordinator = User::new("Muzi Sithole", "muzi@example.com", Role::Coordinator, "CS");
        let manager = User::new("Ouma Stella", "ouma@example.com", Role::Manager, "IT");
        let users = MockUserPort::with_users(vec![lecturer.clone(), coordinator.clone(), manager.clone()]).await;

        let workflow = ClaimWorkflow::new(
            Arc::new(MockClaimPort::new()),
            Arc::new(MockDocumentPort::new()),
            Arc::new(users),
            WorkflowPolicy::default(),
        );
        Fixture { workflow, lecturer, coordinator, manager }
    }

    fn request(hours: rust_decimal::Decimal) -> ClaimRequest {
        ClaimRequest {
            work_description: "  PROG6212 lectures  ".into(),
            hours_worked: hours,
            notes: Some("   ".into()),
        }
    }

    #[tokio::test]
    async fn test_create_trims_input() {
        let f = fixture().await;
        let claim = f.workflow.create(f.lecturer.id, request(dec!(10))).await.unwrap();

        assert_eq!(claim.work_description, "PROG6212 lectures");
        assert_eq!(claim.notes, None);
        assert_eq!(claim.total_amount(), dec!(3500));
    }

    #[tokio::test]
    async fn test_blank_description_rejected() {
        let f = fixture().await;
        let mut req = request(dec!(10));
        req.work_description = "   ".into();

        let result = f.workflow.create(f.lecturer.id, req).await;
        assert!(matches!(result, Err(ClaimError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_full_happy_path() {
        let f = fixture().await;
        let claim = f.workflow.create(f.lecturer.id, request(dec!(10))).await.unwrap();

        f.workflow.submit(claim.id, f.lecturer.id).await.unwrap();
        f.workflow.verify(claim.id, f.coordinator.id, Some("ok".into())).await.unwrap();
        let approved = f.workflow.approve(claim.id, f.manager.id, None).await.unwrap();

        assert_eq!(approved.status, ClaimStatus::Approved);
        assert_eq!(approved.coordinator_id, Some(f.coordinator.id));
        assert_eq!(approved.manager_id, Some(f.manager.id));
    }

    #[tokio::test]
    async fn test_reject_records_stage_reviewer() {
        let f = fixture().await;
        let claim = f.workflow.create(f.lecturer.id, request(dec!(10))).await.unwrap();
        f.workflow.submit(claim.id, f.lecturer.id).await.unwrap();
        f.workflow.verify(claim.id, f.coordinator.id, None).await.unwrap();

        let rejected = f.workflow.reject(claim.id, f.manager.id, "duplicate").await.unwrap();
        assert_eq!(rejected.manager_id, Some(f.manager.id));
        assert_eq!(rejected.rejection_reason.as_deref(), Some("duplicate"));
    }

    #[tokio::test]
    async fn test_lost_race_reports_current_status() {
        let f = fixture().await;
        let claim = f.workflow.create(f.lecturer.id, request(dec!(10))).await.unwrap();
        f.workflow.submit(claim.id, f.lecturer.id).await.unwrap();

        // Simulate a reviewer who loaded the claim before it was verified.
        let mut stale = f.workflow.load(claim.id).await.unwrap();
        f.workflow.verify(claim.id, f.coordinator.id, None).await.unwrap();
        stale.status = ClaimStatus::Returned;

        let result = f.workflow.persist(&stale, ClaimStatus::Submitted, Operation::Return).await;
        assert!(matches!(
            result,
            Err(ClaimError::InvalidTransition { operation: Operation::Return, status: ClaimStatus::Verified })
        ));
    }

    #[test]
    fn test_operation_labels() {
        assert_eq!(Operation::Return.to_string(), "return");
        assert_eq!(Operation::AttachDocument.to_string(), "attach a document to");
    }
}
