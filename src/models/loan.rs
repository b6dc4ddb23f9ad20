//! Loan (borrow) model and related types

use serde::{Deserialize, Serialize};

use super::date::{self, LibraryDateTime};

/// Loan record as reported by the loan endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub loan_id: i32,
    pub title: String,
    pub unique_code: String,
    #[serde(with = "date::wire")]
    pub loan_date: LibraryDateTime,
    /// None while the copy is still borrowed
    #[serde(default, with = "date::wire_option")]
    pub return_date: Option<LibraryDateTime>,
}

impl Loan {
    pub fn id(&self) -> i32 {
        self.loan_id
    }

    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Which loan list to fetch for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanListKind {
    Current,
    History,
    Overdue,
}

impl LoanListKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            LoanListKind::Current => "current",
            LoanListKind::History => "history",
            LoanListKind::Overdue => "overdue",
        }
    }
}

/// Borrow request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: i32,
    pub user_id: i32,
}

/// Borrow response; `success == false` is a business rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub borrowed_book_unique_code: Option<String>,
    #[serde(default)]
    pub loan_id: Option<i32>,
}

/// Return request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub loan_id: i32,
    pub user_id: i32,
}

/// Return response; `success == false` is a business rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub returned_book_unique_code: Option<String>,
}
