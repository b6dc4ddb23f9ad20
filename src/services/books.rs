//! Book detail loading

use std::sync::Arc;
use tokio::sync::watch;

use crate::{
    api::{endpoints, ApiGateway},
    error::AppResult,
    models::BookDetail,
};

use super::LoadState;

#[derive(Clone)]
pub struct BookDetailLoader {
    gateway: ApiGateway,
    state: Arc<watch::Sender<LoadState<BookDetail>>>,
}

impl BookDetailLoader {
    pub fn new(gateway: ApiGateway) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            gateway,
            state: Arc::new(state),
        }
    }

    /// Load one book with its copies
    pub async fn load(&self, book_id: i32) -> AppResult<BookDetail> {
        self.state.send_replace(LoadState::Loading);

        match self.gateway.perform::<BookDetail>(endpoints::book_detail(book_id)).await {
            Ok(detail) => {
                self.state.send_replace(LoadState::Loaded(detail.clone()));
                Ok(detail)
            }
            Err(e) => {
                tracing::warn!("Failed to load details of book {}: {}", book_id, e);
                self.state
                    .send_replace(LoadState::Failed("Unable to load book details, please try again later.".to_string()));
                Err(e)
            }
        }
    }

    /// Show a detail fetched elsewhere, e.g. after a borrow
    pub fn replace(&self, detail: BookDetail) {
        self.state.send_replace(LoadState::Loaded(detail));
    }

    pub fn state(&self) -> LoadState<BookDetail> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<BookDetail>> {
        self.state.subscribe()
    }
}
