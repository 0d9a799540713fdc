//! Account reconstruction.

mod account_model;
mod account_service;


pub use account_model::{Account, AccountBuild, FetchIssue};
pub use account_service::AccountService;
