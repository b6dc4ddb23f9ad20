//! Loan history aggregation: every book a reader has ever borrowed

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    api::{endpoints, ApiGateway},
    error::AppResult,
    models::{Book, Loan, LoanListKind},
};

use super::LoadState;

/// Merged loans plus the catalog used to decorate them
#[derive(Debug, Clone, PartialEq)]
pub struct LoanHistorySnapshot {
    pub loans: Vec<Loan>,
    pub books: Vec<Book>,
}

/// Union of both lists keyed by loan id, most recent loan first.
///
/// When an id shows up twice the first occurrence is kept.
pub fn merge_loans(current: Vec<Loan>, history: Vec<Loan>) -> Vec<Loan> {
    let mut by_id: IndexMap<i32, Loan> = IndexMap::with_capacity(current.len() + history.len());
    for loan in current.into_iter().chain(history) {
        by_id.entry(loan.loan_id).or_insert(loan);
    }

    let mut merged: Vec<Loan> = by_id.into_values().collect();
    merged.sort_by(|a, b| b.loan_date.cmp(&a.loan_date));
    merged
}

#[derive(Clone)]
pub struct LoanHistory {
    gateway: ApiGateway,
    state: Arc<watch::Sender<LoadState<LoanHistorySnapshot>>>,
}

impl LoanHistory {
    pub fn new(gateway: ApiGateway) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            gateway,
            state: Arc::new(state),
        }
    }

    /// Fetch current loans, history and the catalog together.
    ///
    /// All three must succeed; otherwise nothing is applied.
    pub async fn load_all(&self, user_id: i32) -> AppResult<LoanHistorySnapshot> {
        self.state.send_replace(LoadState::Loading);

        let result = tokio::try_join!(
            self.gateway.perform::<Vec<Loan>>(endpoints::loans(LoanListKind::Current, user_id)),
            self.gateway.perform::<Vec<Loan>>(endpoints::loans(LoanListKind::History, user_id)),
            self.gateway.perform::<Vec<Book>>(endpoints::books(None, None)),
        );

        match result {
            Ok((current, history, books)) => {
                let loans = merge_loans(current, history);
                tracing::info!("Loan history for user {}: {} loans", user_id, loans.len());
                let snapshot = LoanHistorySnapshot { loans, books };
                self.state.send_replace(LoadState::Loaded(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Loan history aggregation failed for user {}: {}", user_id, e);
                self.state.send_replace(LoadState::Failed(e.user_message().to_string()));
                Err(e)
            }
        }
    }

    pub fn state(&self) -> LoadState<LoanHistorySnapshot> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<LoanHistorySnapshot>> {
        self.state.subscribe()
    }
}
