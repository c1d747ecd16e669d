//! Expenses and their comments.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api_error::ApiError;
use crate::client::Client;
use crate::error::Error;
use crate::form::{FieldWriter, FormBody};
use crate::groups::UserRef;
use crate::http::HttpTransport;
use crate::types::{Category, RepeatInterval, User};

/// How an expense's cost is divided among users.
///
/// Each variant knows how to write its own form fields, so callers never
/// branch on the concrete strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// Split the full cost evenly across the members of a group.
    Equally { group_id: i64 },
    /// Explicit per-user paid and owed shares.
    Manually(Vec<Share>),
}

/// One user's part of a manually split expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub user: UserRef,
    /// Decimal string, e.g. `"10.00"`. Amounts stay text to avoid rounding
    /// drift; the API validates them.
    pub paid_share: String,
    pub owed_share: String,
}

impl Split {
    pub(crate) fn write(&self, form: &mut FormBody) {
        match self {
            Split::Equally { group_id } => form.set_int("group_id", *group_id),
            Split::Manually(shares) => {
                let mut users = form.array("users");
                for share in shares {
                    share.user.write(&mut users);
                    users.set_str("owed_share", &share.owed_share);
                    users.set_str("paid_share", &share.paid_share);
                    users.advance();
                }
            }
        }
    }
}

/// Parameters for [`Client::create_expense`].
#[derive(Debug, Clone)]
pub struct CreateExpenseRequest {
    pub cost: String,
    pub description: String,
    /// True if this records a payment rather than a shared expense.
    pub payment: bool,
    pub split: Split,

    // Optional parameters
    pub details: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub repeat_interval: Option<RepeatInterval>,
    pub currency_code: Option<String>,
    pub category_id: Option<i64>,
}

impl CreateExpenseRequest {
    /// A request with only the required fields set.
    pub fn new(cost: impl Into<String>, description: impl Into<String>, split: Split) -> Self {
        Self {
            cost: cost.into(),
            description: description.into(),
            payment: false,
            split,
            details: None,
            date: None,
            repeat_interval: None,
            currency_code: None,
            category_id: None,
        }
    }
}

/// One user's balance within an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseUser {
    pub net_balance: String,
    pub owed_share: String,
    pub paid_share: String,
    pub user_id: i64,
    pub user: User,
}

/// A shared expense.
#[derive(Debug, Clone, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<Category>,
    pub cost: String,
    pub description: String,
    #[serde(default)]
    pub users: Vec<ExpenseUser>,
}

/// Filters for [`Client::get_expenses`]. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct GetExpensesRequest {
    pub dated_after: Option<DateTime<Utc>>,
    pub dated_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl GetExpensesRequest {
    fn query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let date = |d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string();
        if let Some(d) = &self.dated_after {
            pairs.push(("dated_after", date(d)));
        }
        if let Some(d) = &self.dated_before {
            pairs.push(("dated_before", date(d)));
        }
        if let Some(d) = &self.updated_after {
            pairs.push(("updated_after", date(d)));
        }
        if let Some(d) = &self.updated_before {
            pairs.push(("updated_before", date(d)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A comment on an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub comment_type: Option<String>,
    #[serde(default)]
    pub relation_type: Option<String>,
    #[serde(default)]
    pub relation_id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct ExpenseEnvelope {
    #[serde(default)]
    expense: Option<Expense>,
    #[serde(default)]
    errors: ApiError,
}

#[derive(Debug, Deserialize)]
struct CommentEnvelope {
    #[serde(default)]
    comment: Option<Comment>,
    #[serde(default)]
    errors: ApiError,
}

impl ExpenseEnvelope {
    fn into_result(self) -> Result<Expense, Error> {
        if !self.errors.is_empty() {
            return Err(self.errors.into());
        }
        self.expense.ok_or(Error::MissingPayload("expense"))
    }
}

impl CommentEnvelope {
    fn into_result(self) -> Result<Comment, Error> {
        if !self.errors.is_empty() {
            return Err(self.errors.into());
        }
        self.comment.ok_or(Error::MissingPayload("comment"))
    }
}

// Expense endpoints
impl<H: HttpTransport> Client<H> {
    /// Creates an expense, split according to the request's strategy.
    pub async fn create_expense(&self, req: &CreateExpenseRequest) -> Result<Expense, Error> {
        let mut form = FormBody::new();
        form.set_str("cost", &req.cost);
        form.set_str("description", &req.description);
        form.set_bool("payment", req.payment);
        if let Some(details) = &req.details {
            form.set_str("details", details);
        }
        if let Some(date) = &req.date {
            form.set_str("date", &date.to_rfc3339());
        }
        if let Some(interval) = req.repeat_interval {
            form.set_str("repeat_interval", interval.as_str());
        }
        if let Some(code) = &req.currency_code {
            form.set_str("currency_code", code);
        }
        if let Some(id) = req.category_id {
            form.set_int("category_id", id);
        }
        req.split.write(&mut form);

        let res: ExpenseEnvelope = self.post("create_expense", &form).await?;
        res.into_result()
    }

    /// Fetches an expense by ID.
    pub async fn get_expense(&self, id: i64) -> Result<Expense, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            expense: Expense,
        }
        let res: Envelope = self.get(&format!("get_expense/{id}")).await?;
        Ok(res.expense)
    }

    /// Lists expenses matching the request's filters.
    pub async fn get_expenses(&self, req: &GetExpensesRequest) -> Result<Vec<Expense>, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            expenses: Vec<Expense>,
        }
        let query = req.query();
        let path = if query.is_empty() {
            "get_expenses".to_string()
        } else {
            format!("get_expenses?{query}")
        };
        let res: Envelope = self.get(&path).await?;
        Ok(res.expenses)
    }

    /// Deletes an expense.
    pub async fn delete_expense(&self, id: i64) -> Result<(), Error> {
        let res: crate::client::SuccessResponse =
            self.post_empty(&format!("delete_expense/{id}")).await?;
        res.into_result()
    }

    /// Restores a deleted expense.
    pub async fn undelete_expense(&self, id: i64) -> Result<(), Error> {
        let res: crate::client::SuccessResponse =
            self.post_empty(&format!("undelete_expense/{id}")).await?;
        res.into_result()
    }
}

// Comment endpoints
impl<H: HttpTransport> Client<H> {
    /// Lists the comments on an expense.
    pub async fn get_comments(&self, expense_id: i64) -> Result<Vec<Comment>, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            comments: Vec<Comment>,
        }
        let res: Envelope = self
            .get(&format!("get_comments?expense_id={expense_id}"))
            .await?;
        Ok(res.comments)
    }

    /// Adds a comment to an expense.
    pub async fn create_comment(&self, expense_id: i64, content: &str) -> Result<Comment, Error> {
        let mut form = FormBody::new();
        form.set_int("expense_id", expense_id);
        form.set_str("content", content);

        let res: CommentEnvelope = self.post("create_comment", &form).await?;
        res.into_result()
    }

    /// Fetches a comment by ID.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, Error> {
        let res: CommentEnvelope = self.get(&format!("get_comment/{id}")).await?;
        res.into_result()
    }

    /// Deletes a comment, returning its last state.
    pub async fn delete_comment(&self, id: i64) -> Result<Comment, Error> {
        let res: CommentEnvelope = self.get(&format!("delete_comment/{id}")).await?;
        res.into_result()
    }
}
