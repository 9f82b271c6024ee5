//! Connection handle capabilities.

use async_trait::async_trait;

use crate::gitlab::types::{
    GitlabResult, Group, GroupId, Member, NewGroup, NewMember, NewUser, User, UserId, UserUpdate,
};

/// An authenticated session against GitLab.
///
/// Each method is a single request. Failures carry the kind of the action
/// attempted (see [`crate::gitlab::RemoteFailureKind`]); nothing here retries.
#[async_trait]
pub trait GitlabApi: Send + Sync {
    async fn create_group(&self, group: &NewGroup) -> GitlabResult<Group>;

    async fn get_group(&self, id: GroupId) -> GitlabResult<Group>;

    async fn list_groups(&self, search: Option<&str>) -> GitlabResult<Vec<Group>>;

    async fn create_user(&self, user: &NewUser) -> GitlabResult<User>;

    async fn get_user(&self, id: UserId) -> GitlabResult<User>;

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> GitlabResult<User>;

    async fn delete_user(&self, id: UserId, hard_delete: bool) -> GitlabResult<()>;

    async fn list_users(&self, username: Option<&str>) -> GitlabResult<Vec<User>>;

    async fn create_member(&self, group: GroupId, member: &NewMember) -> GitlabResult<Member>;

    async fn list_members(&self, group: GroupId) -> GitlabResult<Vec<Member>>;
}

/// The connection handle operations run against.
pub type Connection = dyn GitlabApi;
