//! Multi-step onboarding.
//!
//! # Steps
//! ```text
//! create_group → create_user → create_member
//! ```
//!
//! Each step runs through the retry invoker. The first step that exhausts its
//! attempts halts the run; earlier steps are left in place on the platform.

use thiserror::Error;

use crate::gitlab::{AccessLevel, Connection, GroupId, MemberId, UserId};
use crate::provisioning::operations::{CreateGroup, CreateMember, CreateUser};
use crate::resilience::{InvokeError, RetryInvoker, RetryObserver, RetryOutcome};

/// Errors that stop an onboarding run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A step used up its attempt budget.
    #[error("onboarding halted: step '{step}' failed")]
    StepFailed { step: &'static str },

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// Everything needed to onboard one user into a new group.
#[derive(Debug, Clone)]
pub struct Onboarding {
    pub group: CreateGroup,
    pub user: CreateUser,
    pub access_level: AccessLevel,
}

/// Ids produced by a completed onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Onboarded {
    pub group: GroupId,
    pub user: UserId,
    pub member: MemberId,
}

fn require<T>(outcome: RetryOutcome<T>, step: &'static str) -> Result<T, WorkflowError> {
    outcome.into_success().ok_or(WorkflowError::StepFailed { step })
}

/// Create the group, create the user, then add the user to the group.
pub async fn onboard<O: RetryObserver>(
    invoker: &RetryInvoker<O>,
    api: &Connection,
    plan: &Onboarding,
) -> Result<Onboarded, WorkflowError> {
    let group = require(invoker.invoke(&plan.group, api).await?, "create_group")?;
    let user = require(invoker.invoke(&plan.user, api).await?, "create_user")?;

    let membership = CreateMember {
        user,
        group,
        access_level: plan.access_level,
    };
    let member = require(invoker.invoke(&membership, api).await?, "create_member")?;

    tracing::info!(
        group_id = %group,
        user_id = %user,
        member_id = %member,
        "Onboarding complete"
    );
    Ok(Onboarded {
        group,
        user,
        member,
    })
}
