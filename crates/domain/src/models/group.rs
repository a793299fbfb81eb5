//! Group domain models: groups, memberships and their DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::search::SearchTerms;
use super::user::UserPublic;

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Member,
    Admin,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Member => "member",
            GroupRole::Admin => "admin",
        }
    }

    /// Returns true if this role can edit or delete the group.
    pub fn can_manage_group(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }

    /// Returns true if this role can invite and remove members.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Admin)
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(GroupRole::Member),
            "admin" => Ok(GroupRole::Admin),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who may join a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPrivacy {
    /// Invitation only.
    #[default]
    Private,
    /// Open to every user.
    Public,
}

impl GroupPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupPrivacy::Private => "private",
            GroupPrivacy::Public => "public",
        }
    }
}

impl FromStr for GroupPrivacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private" => Ok(GroupPrivacy::Private),
            "public" => Ok(GroupPrivacy::Public),
            _ => Err(format!("Invalid group privacy: {}", s)),
        }
    }
}

impl fmt::Display for GroupPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A group of friends running competitions together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's membership in a group. Unique per (group, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Membership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub created_by: Uuid,
}

/// Partial update of a group; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<GroupPrivacy>,
}

impl GroupChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.privacy.is_none()
    }
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub privacy: Option<GroupPrivacy>,
}

/// Request payload for updating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub privacy: Option<GroupPrivacy>,
}

impl From<UpdateGroupRequest> for GroupChanges {
    fn from(request: UpdateGroupRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            privacy: request.privacy,
        }
    }
}

/// Query parameters for listing the current user's groups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsQuery {
    /// Matched against name and description.
    pub search: Option<String>,
    pub creator: Option<Uuid>,
}

impl ListGroupsQuery {
    pub fn into_filter(self, member_id: Uuid) -> GroupListFilter {
        GroupListFilter {
            member_id,
            search: SearchTerms::parse(self.search.as_deref()),
            creator: self.creator,
        }
    }
}

/// Explicit filter passed to the store. Only groups `member_id` belongs to
/// are ever listed.
#[derive(Debug, Clone, Default)]
pub struct GroupListFilter {
    pub member_id: Uuid,
    pub search: SearchTerms,
    pub creator: Option<Uuid>,
}

impl GroupListFilter {
    pub fn for_member(member_id: Uuid) -> Self {
        Self {
            member_id,
            ..Default::default()
        }
    }
}

/// Group as listed for the current user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub member_count: i64,
    pub competition_count: i64,
    pub is_favorite: bool,
    pub your_role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Response for listing groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsResponse {
    pub data: Vec<GroupSummary>,
    pub count: usize,
}

/// Group detail for a member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub created_by: Uuid,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub your_role: GroupRole,
}

impl GroupDetail {
    pub fn new(group: Group, member_count: i64, your_role: GroupRole) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            privacy: group.privacy,
            created_by: group.created_by,
            member_count,
            created_at: group.created_at,
            updated_at: group.updated_at,
            your_role,
        }
    }
}

/// Member entry in a member listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberResponse {
    pub id: Uuid,
    pub user: UserPublic,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Response for listing members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMembersResponse {
    pub data: Vec<MemberResponse>,
    pub count: usize,
}

/// Response after joining a public group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinGroupResponse {
    pub group_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}
