//! Personal page loan lists

use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    api::{endpoints, ApiGateway},
    error::{ApiError, AppResult},
    models::{Loan, LoanListKind},
};

use super::{session::SessionController, LoadState};

/// Tabs of the personal page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShelfTab {
    Profile,
    #[default]
    Current,
    History,
    Overdue,
}

impl ShelfTab {
    pub const ALL: [ShelfTab; 4] = [ShelfTab::Profile, ShelfTab::Current, ShelfTab::History, ShelfTab::Overdue];

    /// Loan list backing the tab; the profile tab has none
    pub fn loan_list(&self) -> Option<LoanListKind> {
        match self {
            ShelfTab::Profile => None,
            ShelfTab::Current => Some(LoanListKind::Current),
            ShelfTab::History => Some(LoanListKind::History),
            ShelfTab::Overdue => Some(LoanListKind::Overdue),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ShelfTab::Profile => "Profile",
            ShelfTab::Current => "My shelf",
            ShelfTab::History => "Loan history",
            ShelfTab::Overdue => "Overdue",
        }
    }
}

#[derive(Clone)]
pub struct LoanShelf {
    gateway: ApiGateway,
    session: SessionController,
    state: Arc<watch::Sender<LoadState<Vec<Loan>>>>,
}

impl LoanShelf {
    pub fn new(gateway: ApiGateway, session: SessionController) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            gateway,
            session,
            state: Arc::new(state),
        }
    }

    /// Load the loans shown on a tab for the logged-in user
    pub async fn load(&self, tab: ShelfTab) -> AppResult<Vec<Loan>> {
        let Some(user_id) = self.session.current_user_id() else {
            self.state
                .send_replace(LoadState::Failed("Unable to read user information, please log in again.".to_string()));
            return Err(ApiError::AuthRequired);
        };

        let Some(kind) = tab.loan_list() else {
            self.state.send_replace(LoadState::Loaded(Vec::new()));
            return Ok(Vec::new());
        };

        self.state.send_replace(LoadState::Loading);
        match self.gateway.perform::<Vec<Loan>>(endpoints::loans(kind, user_id)).await {
            Ok(loans) => {
                tracing::debug!("Loaded {} {:?} loans for user {}", loans.len(), kind, user_id);
                self.state.send_replace(LoadState::Loaded(loans.clone()));
                Ok(loans)
            }
            Err(e) => {
                tracing::warn!("Failed to load {:?} loans for user {}: {}", kind, user_id, e);
                self.state
                    .send_replace(LoadState::Failed("Failed to load data, please try again later.".to_string()));
                Err(e)
            }
        }
    }

    pub fn state(&self) -> LoadState<Vec<Loan>> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<Vec<Loan>>> {
        self.state.subscribe()
    }
}
