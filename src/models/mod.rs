//! Data models exchanged with the library server

pub mod book;
pub mod category;
pub mod date;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookCopy, BookDetail, CopyStatus};
pub use category::Category;
pub use date::LibraryDateTime;
pub use loan::{BorrowRequest, BorrowResponse, Loan, LoanListKind, ReturnRequest, ReturnResponse};
pub use user::{
    LoginIdentity, LoginRequest, LoginResponse, RegistrationForm, RegistrationOutcome,
    RegistrationRequest, RegistrationResponse, Role, UserProfile,
};
