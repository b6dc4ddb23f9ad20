//! Catalog fetch coordination: initial load and filtered refinement

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;

use crate::{
    api::{endpoints, ApiGateway},
    error::AppResult,
    models::{Book, Category},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Content,
    Error(String),
}

/// Active catalog filter; `None` everywhere means "all books"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category_id: Option<i32>,
    pub search_term: Option<String>,
}

impl CatalogFilter {
    /// A blank term means no search; any other term is kept as typed
    fn new(category_id: Option<i32>, search_term: Option<&str>) -> Self {
        Self {
            category_id,
            search_term: search_term
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
        }
    }
}

/// Everything the home screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub view: ViewState,
    pub categories: Vec<Category>,
    pub books: Vec<Book>,
    pub filter: CatalogFilter,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            view: ViewState::Loading,
            categories: Vec::new(),
            books: Vec::new(),
            filter: CatalogFilter::default(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogCoordinator {
    gateway: ApiGateway,
    state: Arc<watch::Sender<CatalogState>>,
    // Sequence of the latest book fetch; older responses are discarded
    book_fetches: Arc<AtomicU64>,
}

impl CatalogCoordinator {
    pub fn new(gateway: ApiGateway) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            gateway,
            state: Arc::new(state),
            book_fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch categories and all books concurrently and apply both at once.
    ///
    /// On failure the view switches to `Error` and previously loaded data is
    /// left in place. Books from a refinement started meanwhile are kept.
    pub async fn initial_load(&self) -> AppResult<()> {
        let seq = self.next_book_fetch();
        self.state.send_modify(|s| s.view = ViewState::Loading);

        let result = tokio::try_join!(
            self.gateway.perform::<Vec<Category>>(endpoints::categories()),
            self.gateway.perform::<Vec<Book>>(endpoints::books(None, None)),
        );

        match result {
            Ok((categories, books)) => {
                tracing::info!("Catalog loaded: {} categories, {} books", categories.len(), books.len());
                self.state.send_modify(|s| {
                    s.categories = categories;
                    if self.is_latest(seq) {
                        s.books = books;
                        s.filter = CatalogFilter::default();
                    }
                    s.view = ViewState::Content;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Catalog initial load failed: {}", e);
                let message = e.user_message().to_string();
                self.state.send_modify(|s| s.view = ViewState::Error(message));
                Err(e)
            }
        }
    }

    /// Re-fetch only the book list with the given filter.
    ///
    /// The view state is not touched. Books and filter change together, and
    /// only when no newer book fetch has started in the meantime. A failure
    /// is logged and returned while the books and filter on display stay.
    pub async fn refine_books(&self, category_id: Option<i32>, search_term: Option<&str>) -> AppResult<()> {
        let filter = CatalogFilter::new(category_id, search_term);
        let seq = self.next_book_fetch();

        let request = endpoints::books(filter.category_id, filter.search_term.as_deref());
        match self.gateway.perform::<Vec<Book>>(request).await {
            Ok(books) => {
                let count = books.len();
                let applied = self.state.send_if_modified(|s| {
                    if !self.is_latest(seq) {
                        return false;
                    }
                    s.books = books;
                    s.filter = filter.clone();
                    true
                });
                if applied {
                    tracing::debug!("Refined catalog to {} books with {:?}", count, filter);
                } else {
                    tracing::debug!("Discarding superseded book list for {:?}", filter);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Book refinement with {:?} failed: {}", filter, e);
                Err(e)
            }
        }
    }

    /// Change the selected category and refresh the books
    pub async fn select_category(&self, category_id: Option<i32>) -> AppResult<()> {
        let search_term = self.state.borrow().filter.search_term.clone();
        self.refine_books(category_id, search_term.as_deref()).await
    }

    /// Run a search within the selected category
    pub async fn search(&self, term: &str) -> AppResult<()> {
        let category_id = self.state.borrow().filter.category_id;
        self.refine_books(category_id, Some(term)).await
    }

    fn next_book_fetch(&self) -> u64 {
        self.book_fetches.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.book_fetches.load(Ordering::SeqCst) == seq
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }
}
