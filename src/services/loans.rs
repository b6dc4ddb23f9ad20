//! Borrow/return workflow
//!
//! A loan action goes through `Idle -> PendingConfirmation -> Executing ->
//! Success | Failure`. Transitions are computed by [`transition`], a pure
//! function; [`LoanWorkflow`] applies them atomically and performs the
//! network calls between them.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    api::{endpoints, ApiGateway},
    error::ApiError,
    models::{BookDetail, BorrowRequest, BorrowResponse, Loan, LoanListKind, ReturnRequest, ReturnResponse},
};

use super::session::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanAction {
    Borrow { book_id: i32 },
    Return { loan_id: i32 },
}

impl LoanAction {
    /// Question shown before the action runs
    pub fn confirmation_prompt(&self) -> String {
        match self {
            LoanAction::Borrow { .. } => "Do you want to borrow this book?".to_string(),
            LoanAction::Return { .. } => "Do you want to return this book?".to_string(),
        }
    }
}

/// Authoritative state fetched after a successful action
#[derive(Debug, Clone)]
pub enum Reconciliation {
    BookDetail(BookDetail),
    ActiveLoans(Vec<Loan>),
    /// The action succeeded but the refresh did not
    Unavailable(ApiError),
}

/// Result of a successful borrow or return
#[derive(Debug, Clone)]
pub struct LoanReceipt {
    pub action: LoanAction,
    pub unique_code: Option<String>,
    pub loan_id: Option<i32>,
    pub message: Option<String>,
    pub reconciliation: Reconciliation,
}

impl LoanReceipt {
    pub fn title(&self) -> &'static str {
        match self.action {
            LoanAction::Borrow { .. } => "Borrowed",
            LoanAction::Return { .. } => "Returned",
        }
    }

    pub fn message(&self) -> String {
        match self.action {
            LoanAction::Borrow { .. } => {
                let title = match &self.reconciliation {
                    Reconciliation::BookDetail(detail) => detail.title.as_str(),
                    _ => "",
                };
                format!(
                    "You have borrowed \"{}\".\nCopy code: {}",
                    title,
                    self.unique_code.as_deref().unwrap_or("N/A")
                )
            }
            LoanAction::Return { .. } => "The book has been returned.".to_string(),
        }
    }
}

/// Why an action did not go through.
///
/// Business rejections and transport failures stay distinct so the
/// presentation layer can tell them apart.
#[derive(Debug, Clone)]
pub enum LoanFailure {
    MustAuthenticate,
    Rejected { action: LoanAction, message: Option<String> },
    Transport { action: LoanAction, error: ApiError },
}

impl LoanFailure {
    pub fn title(&self) -> &'static str {
        match self {
            LoanFailure::MustAuthenticate => "Login required",
            LoanFailure::Rejected { action: LoanAction::Borrow { .. }, .. }
            | LoanFailure::Transport { action: LoanAction::Borrow { .. }, .. } => "Borrow failed",
            LoanFailure::Rejected { action: LoanAction::Return { .. }, .. }
            | LoanFailure::Transport { action: LoanAction::Return { .. }, .. } => "Return failed",
        }
    }

    pub fn message(&self) -> String {
        match self {
            LoanFailure::MustAuthenticate => "Please log in first.".to_string(),
            LoanFailure::Rejected { message, .. } => message
                .clone()
                .unwrap_or_else(|| "An unknown error occurred.".to_string()),
            LoanFailure::Transport { .. } => "Network request failed, please try again later.".to_string(),
        }
    }

    /// Underlying client error, for diagnostics
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            LoanFailure::Transport { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    PendingConfirmation(LoanAction),
    Executing(LoanAction),
    Success(LoanReceipt),
    Failure(LoanFailure),
}

impl WorkflowState {
    /// An action is waiting for confirmation or running
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowState::PendingConfirmation(_) | WorkflowState::Executing(_))
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    Request(LoanAction),
    Confirm,
    Cancel,
    Completed(LoanReceipt),
    Failed(LoanFailure),
    Acknowledge,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Another loan action is already in progress")]
    Busy,

    #[error("No loan action is waiting for confirmation")]
    NotPending,

    #[error("No loan action is executing")]
    NotExecuting,

    #[error("No outcome to acknowledge")]
    NothingToAcknowledge,
}

/// Next state for `event`, or why the event does not apply
pub fn transition(state: &WorkflowState, event: WorkflowEvent) -> Result<WorkflowState, TransitionError> {
    use WorkflowState::*;

    match (state, event) {
        (PendingConfirmation(_) | Executing(_), WorkflowEvent::Request(_)) => Err(TransitionError::Busy),
        (_, WorkflowEvent::Request(action)) => Ok(PendingConfirmation(action)),

        (PendingConfirmation(action), WorkflowEvent::Confirm) => Ok(Executing(*action)),
        (_, WorkflowEvent::Confirm) => Err(TransitionError::NotPending),

        (PendingConfirmation(_), WorkflowEvent::Cancel) => Ok(Idle),
        (_, WorkflowEvent::Cancel) => Err(TransitionError::NotPending),

        (Executing(_), WorkflowEvent::Completed(receipt)) => Ok(Success(receipt)),
        (Executing(_), WorkflowEvent::Failed(failure)) => Ok(Failure(failure)),
        (_, WorkflowEvent::Completed(_) | WorkflowEvent::Failed(_)) => Err(TransitionError::NotExecuting),

        (Success(_) | Failure(_), WorkflowEvent::Acknowledge) => Ok(Idle),
        (_, WorkflowEvent::Acknowledge) => Err(TransitionError::NothingToAcknowledge),
    }
}

/// What happened to a borrow/return request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    AwaitingConfirmation { prompt: String },
    MustAuthenticate,
    /// Another action is pending or executing
    Ignored,
}

/// Borrow/return workflow bound to one screen
#[derive(Clone)]
pub struct LoanWorkflow {
    gateway: ApiGateway,
    session: SessionController,
    state: Arc<watch::Sender<WorkflowState>>,
}

impl LoanWorkflow {
    pub fn new(gateway: ApiGateway, session: SessionController) -> Self {
        let (state, _) = watch::channel(WorkflowState::Idle);
        Self {
            gateway,
            session,
            state: Arc::new(state),
        }
    }

    pub fn request_borrow(&self, book_id: i32) -> RequestOutcome {
        self.request(LoanAction::Borrow { book_id })
    }

    pub fn request_return(&self, loan_id: i32) -> RequestOutcome {
        self.request(LoanAction::Return { loan_id })
    }

    fn request(&self, action: LoanAction) -> RequestOutcome {
        if !self.session.is_logged_in() {
            tracing::info!("{:?} requested without a logged-in user", action);
            return RequestOutcome::MustAuthenticate;
        }

        match self.apply(WorkflowEvent::Request(action)) {
            Ok(_) => RequestOutcome::AwaitingConfirmation {
                prompt: action.confirmation_prompt(),
            },
            Err(e) => {
                tracing::debug!("Ignoring {:?}: {}", action, e);
                RequestOutcome::Ignored
            }
        }
    }

    /// Run the pending action and reconcile with the server.
    ///
    /// Returns the terminal state (`Success` or `Failure`).
    pub async fn confirm(&self) -> Result<WorkflowState, TransitionError> {
        let action = match self.apply(WorkflowEvent::Confirm)? {
            WorkflowState::Executing(action) => action,
            _ => return Err(TransitionError::NotPending),
        };

        let event = match self.execute(action).await {
            Ok(receipt) => WorkflowEvent::Completed(receipt),
            Err(failure) => WorkflowEvent::Failed(failure),
        };
        self.apply(event)
    }

    /// Drop the pending action without side effects
    pub fn cancel(&self) -> Result<(), TransitionError> {
        self.apply(WorkflowEvent::Cancel).map(|_| ())
    }

    /// Return to `Idle` once the outcome has been shown
    pub fn acknowledge(&self) -> Result<(), TransitionError> {
        self.apply(WorkflowEvent::Acknowledge).map(|_| ())
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    fn apply(&self, event: WorkflowEvent) -> Result<WorkflowState, TransitionError> {
        let mut outcome = Err(TransitionError::NotPending);
        self.state.send_if_modified(|state| match transition(state, event) {
            Ok(next) => {
                *state = next.clone();
                outcome = Ok(next);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    async fn execute(&self, action: LoanAction) -> Result<LoanReceipt, LoanFailure> {
        let Some(user_id) = self.session.current_user_id() else {
            tracing::warn!("User logged out before {:?} was confirmed", action);
            return Err(LoanFailure::MustAuthenticate);
        };
        let transport_failure = |error: ApiError| {
            tracing::warn!("{:?} for user {} failed: {}", action, user_id, error);
            LoanFailure::Transport { action, error }
        };

        match action {
            LoanAction::Borrow { book_id } => {
                let request = endpoints::borrow(&BorrowRequest { book_id, user_id }).map_err(transport_failure)?;
                let response: BorrowResponse = self.gateway.perform(request).await.map_err(transport_failure)?;
                if !response.success {
                    tracing::info!(
                        "Borrow of book {} rejected: {}",
                        book_id,
                        response.message.as_deref().unwrap_or("no reason given")
                    );
                    return Err(LoanFailure::Rejected {
                        action,
                        message: response.message,
                    });
                }
                tracing::info!("User {} borrowed book {} (loan {:?})", user_id, book_id, response.loan_id);

                let reconciliation = match self.gateway.perform::<BookDetail>(endpoints::book_detail(book_id)).await {
                    Ok(detail) => Reconciliation::BookDetail(detail),
                    Err(e) => {
                        tracing::warn!("Could not refresh book {} after borrow: {}", book_id, e);
                        Reconciliation::Unavailable(e)
                    }
                };

                Ok(LoanReceipt {
                    action,
                    unique_code: response.borrowed_book_unique_code,
                    loan_id: response.loan_id,
                    message: response.message,
                    reconciliation,
                })
            }
            LoanAction::Return { loan_id } => {
                let request = endpoints::return_loan(&ReturnRequest { loan_id, user_id }).map_err(transport_failure)?;
                let response: ReturnResponse = self.gateway.perform(request).await.map_err(transport_failure)?;
                if !response.success {
                    tracing::info!(
                        "Return of loan {} rejected: {}",
                        loan_id,
                        response.message.as_deref().unwrap_or("no reason given")
                    );
                    return Err(LoanFailure::Rejected {
                        action,
                        message: response.message,
                    });
                }
                tracing::info!("User {} returned loan {}", user_id, loan_id);

                let reconciliation = match self
                    .gateway
                    .perform::<Vec<Loan>>(endpoints::loans(LoanListKind::Current, user_id))
                    .await
                {
                    Ok(loans) => Reconciliation::ActiveLoans(loans),
                    Err(e) => {
                        tracing::warn!("Could not refresh current loans after return: {}", e);
                        Reconciliation::Unavailable(e)
                    }
                };

                Ok(LoanReceipt {
                    action,
                    unique_code: response.returned_book_unique_code,
                    loan_id: Some(loan_id),
                    message: response.message,
                    reconciliation,
                })
            }
        }
    }
}
