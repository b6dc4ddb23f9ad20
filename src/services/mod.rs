//! Client-side services: session, catalog, loans and history

pub mod books;
pub mod catalog;
pub mod history;
pub mod loans;
pub mod session;
pub mod shelf;

use std::sync::Arc;

use crate::{api::ApiGateway, credentials::CredentialStore};

/// View state of a screen that loads one value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub gateway: ApiGateway,
    pub session: session::SessionController,
    pub catalog: catalog::CatalogCoordinator,
    pub history: history::LoanHistory,
    pub shelf: shelf::LoanShelf,
}

impl Services {
    /// Create all services around one gateway and one credential store
    pub fn new(gateway: ApiGateway, credentials: Arc<dyn CredentialStore>) -> Self {
        let session = session::SessionController::new(gateway.clone(), credentials);
        Self {
            catalog: catalog::CatalogCoordinator::new(gateway.clone()),
            history: history::LoanHistory::new(gateway.clone()),
            shelf: shelf::LoanShelf::new(gateway.clone(), session.clone()),
            session,
            gateway,
        }
    }

    /// Borrow/return workflow for one screen
    pub fn loan_workflow(&self) -> loans::LoanWorkflow {
        loans::LoanWorkflow::new(self.gateway.clone(), self.session.clone())
    }

    /// Detail loader for one book screen
    pub fn book_detail(&self) -> books::BookDetailLoader {
        books::BookDetailLoader::new(self.gateway.clone())
    }
}
