//! Request descriptors for every endpoint the client consumes

use crate::{
    error::AppResult,
    models::{BorrowRequest, LoanListKind, LoginRequest, RegistrationRequest, ReturnRequest},
};

use super::{Access, ApiRequest};

pub const LOGIN: &str = "/api/auth/login";
pub const REGISTER: &str = "/api/users/register";
pub const CATEGORIES: &str = "/api/categories";
pub const BOOKS: &str = "/api/books/test/getAllBooksWithDetails";
pub const BOOK_DETAILS: &str = "/api/books/test/getBookDetailsById02";
pub const USERS: &str = "/api/users";
pub const LOANS: &str = "/api/loans";
pub const BORROW: &str = "/api/loans/borrow";
pub const RETURN: &str = "/api/loans/return";

pub fn login(request: &LoginRequest) -> AppResult<ApiRequest> {
    ApiRequest::post(LOGIN, Access::Public).json(request)
}

pub fn register(request: &RegistrationRequest) -> AppResult<ApiRequest> {
    ApiRequest::post(REGISTER, Access::Public).json(request)
}

pub fn categories() -> ApiRequest {
    ApiRequest::get(CATEGORIES, Access::Public)
}

/// Book list, optionally filtered.
///
/// A blank search term is treated as absent and not sent at all; any other
/// term is sent exactly as typed.
pub fn books(category_id: Option<i32>, search_term: Option<&str>) -> ApiRequest {
    let mut request = ApiRequest::get(BOOKS, Access::Public);
    if let Some(id) = category_id {
        request = request.query("categoryId", id);
    }
    if let Some(term) = search_term.filter(|t| !t.trim().is_empty()) {
        request = request.query("searchTerm", term);
    }
    request
}

pub fn book_detail(book_id: i32) -> ApiRequest {
    ApiRequest::get(format!("{}/{}", BOOK_DETAILS, book_id), Access::Public)
}

pub fn user_profile(user_id: i32) -> ApiRequest {
    ApiRequest::get(format!("{}/{}/profile", USERS, user_id), Access::Authenticated)
}

pub fn loans(kind: LoanListKind, user_id: i32) -> ApiRequest {
    ApiRequest::get(
        format!("{}/{}/{}", LOANS, kind.path_segment(), user_id),
        Access::Authenticated,
    )
}

pub fn borrow(request: &BorrowRequest) -> AppResult<ApiRequest> {
    ApiRequest::post(BORROW, Access::Authenticated).json(request)
}

pub fn return_loan(request: &ReturnRequest) -> AppResult<ApiRequest> {
    ApiRequest::post(RETURN, Access::Authenticated).json(request)
}
