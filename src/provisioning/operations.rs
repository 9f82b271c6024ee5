//! Provisioning operations.
//!
//! Each struct is the typed request for one adapter. Executing it performs a
//! single logical remote call, logs one line on success and hands back a plain
//! id or flag. Failures propagate untouched; retrying is the invoker's job.

use async_trait::async_trait;

use crate::config::schema::UsersConfig;
use crate::gitlab::types::{NewGroup, NewMember, NewUser, UserUpdate};
use crate::gitlab::{
    AccessLevel, Connection, GitlabError, GitlabResult, GroupId, Member, MemberId, UserId,
};
use crate::resilience::RemoteOperation;

fn require_non_empty(field: &str, value: &str) -> GitlabResult<()> {
    if value.trim().is_empty() {
        return Err(GitlabError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Create a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroup {
    pub name: String,
    pub path: String,
}

#[async_trait]
impl RemoteOperation<Connection> for CreateGroup {
    type Output = GroupId;

    fn name(&self) -> &'static str {
        "create_group"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<GroupId> {
        require_non_empty("group name", &self.name)?;
        require_non_empty("group path", &self.path)?;

        let group = api
            .create_group(&NewGroup {
                name: self.name.clone(),
                path: self.path.clone(),
            })
            .await?;

        tracing::info!(
            name = %self.name,
            path = %self.path,
            group_id = %group.id,
            "Group created"
        );
        Ok(group.id)
    }
}

/// Password fields sent with every new user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub password: Option<String>,
    pub reset_password: bool,
    pub force_random_password: bool,
}

impl PasswordPolicy {
    /// GitLab needs one of: a password, a reset link, or a random password.
    /// With none configured, a random password is requested.
    fn effective_force_random(&self) -> bool {
        self.force_random_password || (self.password.is_none() && !self.reset_password)
    }
}

impl From<&UsersConfig> for PasswordPolicy {
    fn from(config: &UsersConfig) -> Self {
        Self {
            password: config.password.clone(),
            reset_password: config.reset_password,
            force_random_password: config.force_random_password,
        }
    }
}

impl std::fmt::Debug for PasswordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordPolicy")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("reset_password", &self.reset_password)
            .field("force_random_password", &self.force_random_password)
            .finish()
    }
}

/// Create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: PasswordPolicy,
}

#[async_trait]
impl RemoteOperation<Connection> for CreateUser {
    type Output = UserId;

    fn name(&self) -> &'static str {
        "create_user"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<UserId> {
        require_non_empty("name", &self.name)?;
        require_non_empty("username", &self.username)?;
        if !self.email.contains('@') {
            return Err(GitlabError::InvalidInput(format!(
                "email '{}' is not an address",
                self.email
            )));
        }

        let force_random_password = self.password.effective_force_random();
        let user = api
            .create_user(&NewUser {
                name: self.name.clone(),
                username: self.username.clone(),
                email: self.email.clone(),
                password: if force_random_password {
                    None
                } else {
                    self.password.password.clone()
                },
                reset_password: self.password.reset_password,
                force_random_password,
            })
            .await?;

        tracing::info!(
            name = %self.name,
            username = %self.username,
            user_id = %user.id,
            "User created"
        );
        Ok(user.id)
    }
}

/// Add an existing user to an existing group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMember {
    pub user: UserId,
    pub group: GroupId,
    pub access_level: AccessLevel,
}

#[async_trait]
impl RemoteOperation<Connection> for CreateMember {
    type Output = MemberId;

    fn name(&self) -> &'static str {
        "create_member"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<MemberId> {
        let group = api.get_group(self.group).await?;
        let member = api
            .create_member(
                group.id,
                &NewMember {
                    user_id: self.user,
                    access_level: self.access_level,
                },
            )
            .await?;

        tracing::info!(
            user_id = %self.user,
            group_id = %self.group,
            member_id = %member.id,
            access_level = ?self.access_level,
            "Member created"
        );
        Ok(member.id)
    }
}

/// Grant or revoke instance administrator rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateUserRole {
    pub user: UserId,
    pub admin: bool,
}

#[async_trait]
impl RemoteOperation<Connection> for UpdateUserRole {
    type Output = bool;

    fn name(&self) -> &'static str {
        "update_user_role"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<bool> {
        let user = api.get_user(self.user).await?;
        api.update_user(
            user.id,
            &UserUpdate {
                admin: Some(self.admin),
            },
        )
        .await?;

        tracing::info!(
            user_id = %self.user,
            username = %user.username,
            admin = self.admin,
            "User role updated"
        );
        Ok(true)
    }
}

/// Permanently delete a user and their contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveUser {
    pub user: UserId,
}

#[async_trait]
impl RemoteOperation<Connection> for RemoveUser {
    type Output = bool;

    fn name(&self) -> &'static str {
        "remove_user"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<bool> {
        api.delete_user(self.user, true).await?;
        tracing::info!(user_id = %self.user, "User removed");
        Ok(true)
    }
}

/// Look up a user id by exact username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindUser {
    pub username: String,
}

#[async_trait]
impl RemoteOperation<Connection> for FindUser {
    type Output = Option<UserId>;

    fn name(&self) -> &'static str {
        "find_user"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<Option<UserId>> {
        require_non_empty("username", &self.username)?;

        let users = api.list_users(Some(&self.username)).await?;
        let found = users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(&self.username))
            .map(|user| user.id);

        match found {
            Some(id) => tracing::info!(username = %self.username, user_id = %id, "User found"),
            None => tracing::debug!(username = %self.username, "No user matches"),
        }
        Ok(found)
    }
}

/// Look up a group id by exact path or full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindGroup {
    pub path: String,
}

#[async_trait]
impl RemoteOperation<Connection> for FindGroup {
    type Output = Option<GroupId>;

    fn name(&self) -> &'static str {
        "find_group"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<Option<GroupId>> {
        require_non_empty("group path", &self.path)?;

        // search also matches on name substrings; only exact paths count
        let groups = api.list_groups(Some(&self.path)).await?;
        let found = groups
            .iter()
            .find(|group| {
                group.path.eq_ignore_ascii_case(&self.path)
                    || group
                        .full_path
                        .as_deref()
                        .is_some_and(|full| full.eq_ignore_ascii_case(&self.path))
            })
            .map(|group| group.id);

        match found {
            Some(id) => tracing::info!(path = %self.path, group_id = %id, "Group found"),
            None => tracing::debug!(path = %self.path, "No group matches"),
        }
        Ok(found)
    }
}

/// List the direct members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListGroupMembers {
    pub group: GroupId,
}

#[async_trait]
impl RemoteOperation<Connection> for ListGroupMembers {
    type Output = Vec<Member>;

    fn name(&self) -> &'static str {
        "list_group_members"
    }

    async fn execute(&self, api: &Connection) -> GitlabResult<Vec<Member>> {
        let members = api.list_members(self.group).await?;
        tracing::info!(group_id = %self.group, count = members.len(), "Group members listed");
        Ok(members)
    }
}
