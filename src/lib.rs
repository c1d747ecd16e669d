//! Typed client for the Splitwise REST API.
//!
//! [`Client`] wraps the `api/v3.0` endpoints: expenses, groups, friends,
//! comments and user lookups. Requests are sent form-encoded the way the
//! service expects, including the `group__index__field` convention for
//! array-valued payloads, and error bodies are decoded into [`ApiError`]
//! whichever of the service's two shapes they arrive in.
//!
//! The [`auth`] module covers credential acquisition: an interactive
//! OAuth2 authorization-code flow plus a file-backed token cache.

pub mod auth;
pub mod form;

mod api_error;
mod client;
mod error;
mod expenses;
mod friends;
mod groups;
mod http;
mod types;

pub use api_error::ApiError;
pub use client::{Client, ParseSentenceResponse, BASE_URL};
pub use error::Error;
pub use expenses::{
    Comment, CreateExpenseRequest, Expense, ExpenseUser, GetExpensesRequest, Share, Split,
};
pub use friends::{BalanceByGroup, CreateFriendRequest, Friend};
pub use groups::{CreateGroupRequest, Group, GroupDebt, GroupMember, UserRef};
pub use http::{HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use types::{
    Balance, Category, GroupType, NotificationSet, Picture, Registration, RepeatInterval,
    Subcategory, User,
};
