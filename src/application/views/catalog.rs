// src/application/views/catalog.rs
//
// Catalog View - paginated, searchable video grid
//
// CRITICAL RULES:
// - A new search resets to the first page
// - Only one "load more" runs at a time; none while the first page is
//   loading and none once the catalog is exhausted
// - Results of a superseded search are discarded

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::Video;
use crate::error::AppResult;
use crate::services::VideoService;

#[derive(Debug, Clone, Default)]
struct CatalogState {
    search: Option<String>,
    videos: Vec<Video>,
    /// Next page to fetch
    next_page: usize,
    has_more: bool,
    /// First page in flight
    loading: bool,
    error: Option<String>,
    /// Bumped on every reset
    generation: u64,
}

/// What a `load_more` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    AlreadyLoading,
    Exhausted,
    Superseded,
}

pub struct CatalogView {
    video_service: Arc<VideoService>,
    state: Mutex<CatalogState>,
    loading_more: AtomicBool,
}

impl CatalogView {
    pub fn new(video_service: Arc<VideoService>) -> Self {
        Self {
            video_service,
            state: Mutex::new(CatalogState::default()),
            loading_more: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn videos(&self) -> Vec<Video> {
        self.state().videos.clone()
    }

    pub fn search(&self) -> Option<String> {
        self.state().search.clone()
    }

    pub fn has_more(&self) -> bool {
        self.state().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Result count line shown above search results
    pub fn summary(&self) -> Option<String> {
        let state = self.state();
        state
            .search
            .as_ref()
            .map(|_| format!("Showing {} results", state.videos.len()))
    }

    /// Replaces the grid with the first page for `search`
    pub async fn load_first_page(&self, search: Option<String>) -> AppResult<usize> {
        let search = search.filter(|term| !term.trim().is_empty());
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.search = search.clone();
            state.videos.clear();
            state.next_page = 0;
            state.has_more = true;
            state.loading = true;
            state.error = None;
            state.generation
        };

        let result = self.video_service.list_page(0, search.as_deref()).await;

        let mut state = self.state();
        if state.generation != generation {
            return Ok(0);
        }
        state.loading = false;
        match result {
            Ok(page) => {
                let count = page.videos.len();
                state.videos = page.videos;
                state.has_more = page.has_more;
                state.next_page = 1;
                Ok(count)
            }
            Err(e) => {
                log::warn!("catalog load failed: {}", e);
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Appends the next page
    pub async fn load_more(&self) -> AppResult<LoadOutcome> {
        let (page, search, generation) = {
            let state = self.state();
            if state.loading {
                return Ok(LoadOutcome::AlreadyLoading);
            }
            if !state.has_more {
                return Ok(LoadOutcome::Exhausted);
            }
            (state.next_page, state.search.clone(), state.generation)
        };

        if self.loading_more.swap(true, Ordering::SeqCst) {
            return Ok(LoadOutcome::AlreadyLoading);
        }

        let result = self.video_service.list_page(page, search.as_deref()).await;
        self.loading_more.store(false, Ordering::SeqCst);

        let mut state = self.state();
        if state.generation != generation {
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(batch) => {
                let count = batch.videos.len();
                state.videos.extend(batch.videos);
                state.has_more = batch.has_more;
                state.next_page += 1;
                state.error = None;
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                log::warn!("catalog page {} failed: {}", page, e);
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::repositories::VideoRepository;
    use crate::test_support::{sample_video, InMemoryVideoRepository};
    use async_trait::async_trait;
    use tokio::sync::Notify;
    use uuid::Uuid;

    fn view(repo: Arc<dyn VideoRepository>) -> CatalogView {
        CatalogView::new(Arc::new(VideoService::new(repo, Arc::new(EventBus::new()), 12)))
    }

    #[tokio::test]
    async fn test_infinite_scroll_until_exhausted() {
        let view = view(InMemoryVideoRepository::with_count(30));

        assert_eq!(view.load_first_page(None).await.unwrap(), 12);
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::Loaded(12));
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::Loaded(6));
        assert!(!view.has_more());
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::Exhausted);

        let titles: Vec<String> = view.videos().into_iter().map(|v| v.title).collect();
        assert_eq!(titles.len(), 30);
        assert_eq!(titles[12], "Video 12");
    }

    #[tokio::test]
    async fn test_search_resets_and_summarizes() {
        let view = view(InMemoryVideoRepository::with_videos(vec![
            sample_video("Rust basics", 1),
            sample_video("Go basics", 2),
            sample_video("Advanced rust", 3),
        ]));

        view.load_first_page(None).await.unwrap();
        assert_eq!(view.videos().len(), 3);
        assert!(view.summary().is_none());

        view.load_first_page(Some("RUST".to_string())).await.unwrap();
        assert_eq!(view.videos().len(), 2);
        assert_eq!(view.summary().as_deref(), Some("Showing 2 results"));
    }

    #[tokio::test]
    async fn test_error_is_kept_for_display() {
        let repo = InMemoryVideoRepository::with_count(3);
        repo.fail_requests(true);
        let view = view(repo.clone());

        assert!(view.load_first_page(None).await.is_err());
        assert!(view.last_error().unwrap().contains("service unavailable"));

        repo.fail_requests(false);
        view.load_first_page(None).await.unwrap();
        assert!(view.last_error().is_none());
    }

    /// Blocks every list call until released
    struct GatedRepository {
        inner: Arc<InMemoryVideoRepository>,
        gate: Notify,
    }

    #[async_trait]
    impl VideoRepository for GatedRepository {
        async fn list(&self, page: usize, page_size: usize, search: Option<String>) -> AppResult<Vec<Video>> {
            self.gate.notified().await;
            self.inner.list(page, page_size, search).await
        }

        async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Video>> {
            self.inner.get_by_id(id).await
        }

        async fn list_related(&self, id: Uuid, limit: usize) -> AppResult<Vec<Video>> {
            self.inner.list_related(id, limit).await
        }

        async fn increment_views(&self, id: Uuid) -> AppResult<()> {
            self.inner.increment_views(id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_load_more_is_skipped() {
        let repo = Arc::new(GatedRepository {
            inner: InMemoryVideoRepository::with_count(30),
            gate: Notify::new(),
        });
        let view = Arc::new(view(repo.clone()));

        repo.gate.notify_one();
        view.load_first_page(None).await.unwrap();

        let first = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load_more().await })
        };
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(view.is_loading_more());
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::AlreadyLoading);

        repo.gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Loaded(12));
        assert_eq!(view.videos().len(), 24);
    }

    #[tokio::test]
    async fn test_load_more_waits_for_first_page() {
        let repo = Arc::new(GatedRepository {
            inner: InMemoryVideoRepository::with_count(30),
            gate: Notify::new(),
        });
        let view = Arc::new(view(repo.clone()));

        let first = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load_first_page(None).await })
        };
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(view.is_loading());
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::AlreadyLoading);

        repo.gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), 12);
        assert!(!view.is_loading());

        repo.gate.notify_one();
        assert_eq!(view.load_more().await.unwrap(), LoadOutcome::Loaded(12));

        let titles: Vec<String> = view.videos().into_iter().map(|v| v.title).collect();
        let expected: Vec<String> = (0..24).map(|i| format!("Video {}", i)).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn test_stale_page_discarded_after_new_search() {
        let repo = Arc::new(GatedRepository {
            inner: InMemoryVideoRepository::with_count(30),
            gate: Notify::new(),
        });
        let view = Arc::new(view(repo.clone()));

        repo.gate.notify_one();
        view.load_first_page(None).await.unwrap();

        let stale = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load_more().await })
        };
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        let fresh = {
            let view = Arc::clone(&view);
            tokio::spawn(async move { view.load_first_page(Some("Video 2".to_string())).await })
        };
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        repo.gate.notify_one();
        repo.gate.notify_one();
        let stale = stale.await.unwrap().unwrap();
        fresh.await.unwrap().unwrap();

        assert_eq!(stale, LoadOutcome::Superseded);
        assert!(view.videos().iter().all(|v| v.title.contains("Video 2")));
    }
}
