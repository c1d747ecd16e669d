//! Groups and group membership.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api_error::ApiError;
use crate::client::{Client, SuccessResponse};
use crate::error::Error;
use crate::form::{FieldWriter, FormBody};
use crate::http::HttpTransport;
use crate::types::{Balance, GroupType, Picture, Registration};

/// A user participating in a request: either an existing account or the
/// inline details to create one.
///
/// Each variant writes its own form fields, at the top level of a body or
/// as one element of an array group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// References an already-existing user by their ID.
    Existing(i64),
    /// Creates a new user within this request.
    New {
        first_name: String,
        last_name: String,
        email: String,
    },
}

impl UserRef {
    pub(crate) fn write<W: FieldWriter>(&self, w: &mut W) {
        match self {
            UserRef::Existing(id) => w.set_int("user_id", *id),
            UserRef::New {
                first_name,
                last_name,
                email,
            } => {
                w.set_str("first_name", first_name);
                w.set_str("last_name", last_name);
                w.set_str("email", email);
            }
        }
    }
}

/// A member of a group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMember {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub picture: Picture,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "registration_status", default)]
    pub registration: Registration,
    #[serde(default)]
    pub balance: Vec<Balance>,
}

/// A debt between two members before simplification.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDebt {
    pub from: i64,
    pub to: i64,
    pub amount: String,
    pub currency_code: String,
}

/// A group of users sharing expenses.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
    #[serde(default)]
    pub simplify_by_default: bool,
    #[serde(default)]
    pub original_debts: Vec<GroupDebt>,
    #[serde(default)]
    pub group_type: GroupType,
}

/// Parameters for [`Client::create_group`].
#[derive(Debug, Clone)]
pub struct CreateGroupRequest {
    pub name: String,
    pub whiteboard: String,
    pub group_type: GroupType,
    pub simplify_by_default: bool,
}

#[derive(Debug, Deserialize)]
struct GroupEnvelope {
    #[serde(default)]
    group: Option<Group>,
    #[serde(default)]
    errors: ApiError,
}

// Group endpoints
impl<H: HttpTransport> Client<H> {
    /// Lists the current user's groups.
    pub async fn get_groups(&self) -> Result<Vec<Group>, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            groups: Vec<Group>,
        }
        let res: Envelope = self.get("get_groups").await?;
        Ok(res.groups)
    }

    /// Fetches a group by ID.
    pub async fn get_group(&self, id: i64) -> Result<Group, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            group: Group,
        }
        let res: Envelope = self.get(&format!("get_group/{id}")).await?;
        Ok(res.group)
    }

    /// Creates a group with one-or-more initial members.
    pub async fn create_group(
        &self,
        req: &CreateGroupRequest,
        users: &[UserRef],
    ) -> Result<Group, Error> {
        let mut form = FormBody::new();
        form.set_str("name", &req.name);
        form.set_str("whiteboard", &req.whiteboard);
        form.set_str("group_type", req.group_type.as_str());
        form.set_bool("simplify_by_default", req.simplify_by_default);

        let mut arr = form.array("users");
        for user in users {
            user.write(&mut arr);
            arr.advance();
        }

        let res: GroupEnvelope = self.post("create_group", &form).await?;
        if !res.errors.is_empty() {
            return Err(res.errors.into());
        }
        res.group.ok_or(Error::MissingPayload("group"))
    }

    /// Deletes a group and all of its expenses.
    pub async fn delete_group(&self, id: i64) -> Result<(), Error> {
        let res: SuccessResponse = self.post_empty(&format!("delete_group/{id}")).await?;
        res.into_result()
    }

    /// Restores a deleted group.
    pub async fn undelete_group(&self, id: i64) -> Result<(), Error> {
        let res: SuccessResponse = self.post_empty(&format!("undelete_group/{id}")).await?;
        res.into_result()
    }

    /// Adds a user to a group.
    pub async fn add_user_to_group(&self, group_id: i64, user: &UserRef) -> Result<(), Error> {
        let mut form = FormBody::new();
        form.set_int("group_id", group_id);
        user.write(&mut form);

        let res: SuccessResponse = self.post("add_user_to_group", &form).await?;
        res.into_result()
    }

    /// Removes a user from a group.
    pub async fn remove_user_from_group(&self, group_id: i64, user_id: i64) -> Result<(), Error> {
        let mut form = FormBody::new();
        form.set_int("group_id", group_id);
        form.set_int("user_id", user_id);

        let res: SuccessResponse = self.post("remove_user_from_group", &form).await?;
        res.into_result()
    }
}
