//! Family account endpoints

use super::item_path;
use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FAMILY_PATH: &str = "/family";

/// Family API interface
#[derive(Clone)]
pub struct FamilyApi {
    client: ApiClient,
}

impl FamilyApi {
    /// Create a new family API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List family members
    ///
    /// GET /family
    pub async fn list(&self) -> ApiResult<Vec<FamilyMember>> {
        self.client.get(FAMILY_PATH, &[]).await
    }

    /// Invite someone to the family account
    ///
    /// POST /family/invite
    pub async fn invite(&self, invite: &FamilyInvite) -> ApiResult<FamilyMember> {
        self.client.post(&format!("{FAMILY_PATH}/invite"), invite).await
    }

    /// Update a member's details
    ///
    /// PUT /family/{id}
    pub async fn update(&self, id: &str, update: &FamilyMemberUpdate) -> ApiResult<FamilyMember> {
        self.client.put(&item_path(FAMILY_PATH, id)?, update).await
    }

    /// Remove a member
    ///
    /// DELETE /family/{id}
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&item_path(FAMILY_PATH, id)?).await
    }
}

/// A member of the family account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    /// Member ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email the invite went to
    #[serde(default)]
    pub email: Option<String>,
    /// Relationship to the account owner
    #[serde(default)]
    pub relationship: Option<String>,
    /// Invite status (pending, accepted)
    #[serde(default)]
    pub status: Option<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for an invitation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInvite {
    /// Invitee email
    pub email: String,
    /// Relationship to the account owner
    pub relationship: String,
    /// Invitee name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Partial member update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New relationship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}
