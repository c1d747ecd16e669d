//! Friends and friendship balances.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::{Client, SuccessResponse};
use crate::error::Error;
use crate::form::{FieldWriter, FormBody};
use crate::http::HttpTransport;
use crate::types::{Balance, Picture};

/// A friend of the current user.
#[derive(Debug, Clone, Deserialize)]
pub struct Friend {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub picture: Picture,
    #[serde(default)]
    pub balance: Vec<Balance>,
    #[serde(default)]
    pub groups: Vec<BalanceByGroup>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A friend's balance within one shared group.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceByGroup {
    pub group_id: i64,
    #[serde(default)]
    pub balance: Vec<Balance>,
}

/// Details of a friend to invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFriendRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

// Friend endpoints
impl<H: HttpTransport> Client<H> {
    /// Lists the current user's friends.
    pub async fn get_friends(&self) -> Result<Vec<Friend>, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            friends: Vec<Friend>,
        }
        let res: Envelope = self.get("get_friends").await?;
        Ok(res.friends)
    }

    /// Fetches a friend by ID.
    pub async fn get_friend(&self, id: i64) -> Result<Friend, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            friend: Friend,
        }
        let res: Envelope = self.get(&format!("get_friend/{id}")).await?;
        Ok(res.friend)
    }

    /// Adds a single friend.
    pub async fn create_friend(&self, req: &CreateFriendRequest) -> Result<Friend, Error> {
        let mut form = FormBody::new();
        form.set_str("user_email", &req.email);
        form.set_str("user_first_name", &req.first_name);
        form.set_str("user_last_name", &req.last_name);

        #[derive(Deserialize)]
        struct Envelope {
            friend: Friend,
        }
        let res: Envelope = self.post("create_friend", &form).await?;
        Ok(res.friend)
    }

    /// Adds several friends in one request.
    pub async fn create_friends(&self, reqs: &[CreateFriendRequest]) -> Result<Vec<Friend>, Error> {
        let mut form = FormBody::new();
        let mut arr = form.array("friends");
        for req in reqs {
            arr.set_str("user_first_name", &req.first_name);
            arr.set_str("user_last_name", &req.last_name);
            arr.set_str("user_email", &req.email);
            arr.advance();
        }

        #[derive(Deserialize)]
        struct Envelope {
            friends: Vec<Friend>,
        }
        let res: Envelope = self.post("create_friend", &form).await?;
        Ok(res.friends)
    }

    /// Removes a friendship.
    pub async fn delete_friend(&self, id: i64) -> Result<(), Error> {
        let res: SuccessResponse = self.post_empty(&format!("delete_friend/{id}")).await?;
        res.into_result()
    }
}
