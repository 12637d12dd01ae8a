//! In-memory workflow harness
//!
//! Wires the mock ports to the workflow, queries and HR administration, with
//! one active user per role plus a second lecturer.

use std::sync::Arc;

use core_kernel::ClaimId;
use domain_claims::{
    Claim, ClaimPort, ClaimQueries, ClaimWorkflow, MockClaimPort, MockDocumentPort, WorkflowPolicy,
};
use domain_users::{MockUserPort, User, UserAdministration, UserPort};

use crate::fixtures::{ClaimFixtures, UserFixtures};

pub struct WorkflowHarness {
    pub users: Arc<MockUserPort>,
    pub claims: Arc<MockClaimPort>,
    pub documents: Arc<MockDocumentPort>,
    pub workflow: ClaimWorkflow,
    pub queries: ClaimQueries,
    pub admin: UserAdministration,
    pub lecturer: User,
    pub other_lecturer: User,
    pub coordinator: User,
    pub manager: User,
    pub hr: User,
}

impl WorkflowHarness {
    /// Harness with the default workflow policy
    pub async fn new() -> Self {
        Self::with_policy(WorkflowPolicy::default()).await
    }

    pub async fn with_policy(policy: WorkflowPolicy) -> Self {
        let lecturer = UserFixtures::lecturer();
        let other_lecturer = UserFixtures::another_lecturer();
        let coordinator = UserFixtures::coordinator();
        let manager = UserFixtures::manager();
        let hr = UserFixtures::hr();

        let users = Arc::new(
            MockUserPort::with_users(vec![
                lecturer.clone(),
                other_lecturer.clone(),
                coordinator.clone(),
                manager.clone(),
                hr.clone(),
            ])
            .await,
        );
        let claims = Arc::new(MockClaimPort::new());
        let documents = Arc::new(MockDocumentPort::new());

        let workflow = ClaimWorkflow::new(claims.clone(), documents.clone(), users.clone(), policy);
        let queries = ClaimQueries::new(claims.clone(), users.clone());
        let admin = UserAdministration::new(users.clone());

        Self {
            users,
            claims,
            documents,
            workflow,
            queries,
            admin,
            lecturer,
            other_lecturer,
            coordinator,
            manager,
            hr,
        }
    }

    /// Stores an extra user
    pub async fn add_user(&self, user: &User) {
        self.users.insert_user(user).await.unwrap();
    }

    /// The claim as currently stored
    pub async fn stored(&self, id: ClaimId) -> Claim {
        self.claims.get_claim(id).await.unwrap()
    }

    /// A ten-hour draft owned by the main lecturer
    pub async fn draft(&self) -> Claim {
        self.workflow
            .create(self.lecturer.id, ClaimFixtures::ten_hours())
            .await
            .unwrap()
    }

    pub async fn submitted(&self) -> Claim {
        let claim = self.draft().await;
        self.workflow.submit(claim.id, self.lecturer.id).await.unwrap()
    }

    pub async fn verified(&self) -> Claim {
        let claim = self.submitted().await;
        self.workflow
            .verify(claim.id, self.coordinator.id, Some("hours match timetable".into()))
            .await
            .unwrap()
    }

    pub async fn approved(&self) -> Claim {
        let claim = self.verified().await;
        self.workflow.approve(claim.id, self.manager.id, None).await.unwrap()
    }
}
