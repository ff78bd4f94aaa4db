use crate::domain::CompanyListing;
use crate::repository::StockRepository;
use crate::resource::Resource;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyListingsState {
    pub companies: Vec<CompanyListing>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyListingsEvent {
    Refresh,
    OnSearchQueryChange(String),
}

/// State holder of the listings screen.
///
/// Search input is debounced: every query change aborts the pending search and schedules a
/// new one, so only the last query of a burst reaches the repository. Refreshes bypass the
/// debounce and force a remote fetch.
pub struct CompanyListingsViewModel {
    repository: Arc<dyn StockRepository>,
    state: Arc<watch::Sender<CompanyListingsState>>,
    debounce: Duration,
    search_job: Option<JoinHandle<()>>,
    load_jobs: Vec<JoinHandle<()>>,
}

impl CompanyListingsViewModel {
    /// Creates the holder and starts loading the cached listings.
    pub fn new(repository: Arc<dyn StockRepository>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(CompanyListingsState::default());
        let mut vm = Self {
            repository,
            state: Arc::new(state),
            debounce,
            search_job: None,
            load_jobs: Vec::new(),
        };
        vm.load(false);
        vm
    }

    pub fn state(&self) -> CompanyListingsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CompanyListingsState> {
        self.state.subscribe()
    }

    pub fn on_event(&mut self, event: CompanyListingsEvent) {
        match event {
            CompanyListingsEvent::Refresh => {
                self.state.send_modify(|s| s.is_refreshing = true);
                self.load(true);
            }
            CompanyListingsEvent::OnSearchQueryChange(query) => {
                self.state.send_modify(|s| s.search_query = query);
                if let Some(job) = self.search_job.take() {
                    job.abort();
                }

                let repository = self.repository.clone();
                let state = self.state.clone();
                let debounce = self.debounce;
                self.search_job = Some(tokio::spawn(async move {
                    tokio::time::sleep(debounce).await;
                    let query = state.borrow().search_query.to_lowercase();
                    tracing::debug!(%query, "debounced company search");
                    collect_company_list(repository.as_ref(), &state, false, &query).await;
                }));
            }
        }
    }

    /// Waits until every scheduled search and load has finished.
    pub async fn idle(&mut self) {
        if let Some(job) = self.search_job.take() {
            let _ = job.await;
        }
        for job in self.load_jobs.drain(..) {
            let _ = job.await;
        }
    }

    fn load(&mut self, fetch_from_remote: bool) {
        self.load_jobs.retain(|job| !job.is_finished());

        let query = self.state.borrow().search_query.to_lowercase();
        let repository = self.repository.clone();
        let state = self.state.clone();
        self.load_jobs.push(tokio::spawn(async move {
            collect_company_list(repository.as_ref(), &state, fetch_from_remote, &query).await;
            if fetch_from_remote {
                state.send_modify(|s| s.is_refreshing = false);
            }
        }));
    }
}

impl Drop for CompanyListingsViewModel {
    fn drop(&mut self) {
        if let Some(job) = self.search_job.take() {
            job.abort();
        }
        for job in self.load_jobs.drain(..) {
            job.abort();
        }
    }
}

async fn collect_company_list(
    repository: &dyn StockRepository,
    state: &watch::Sender<CompanyListingsState>,
    fetch_from_remote: bool,
    query: &str,
) {
    let mut results = repository.get_company_list(fetch_from_remote, query);
    while let Some(result) = results.next().await {
        state.send_modify(|s| reduce(s, result));
    }
}

fn reduce(state: &mut CompanyListingsState, result: Resource<Vec<CompanyListing>>) {
    match result {
        Resource::Success(companies) => state.companies = companies,
        // This screen has no error surface; the cached list stays on display.
        Resource::Error { .. } => {}
        Resource::Loading { is_loading } => state.is_loading = is_loading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::fake::FakeRepository;
    use tokio::time::Instant;

    fn listing(name: &str, symbol: &str) -> CompanyListing {
        CompanyListing {
            name: name.to_string(),
            symbol: symbol.to_string(),
            exchange: "NASDAQ".to_string(),
        }
    }

    fn repository() -> Arc<FakeRepository> {
        Arc::new(FakeRepository {
            listings: vec![
                listing("Apple Inc", "AAPL"),
                listing("Aap Holdings", "AAP"),
                listing("Microsoft Corp", "MSFT"),
            ],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn loads_cached_listings_on_start() {
        let repo = repository();
        let mut vm = CompanyListingsViewModel::new(repo.clone(), Duration::from_millis(500));
        vm.idle().await;

        let state = vm.state();
        assert_eq!(state.companies.len(), 3);
        assert!(!state.is_loading);

        let calls = repo.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].fetch_from_remote);
        assert_eq!(calls[0].query, "");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_trigger_one_query_after_the_delay() {
        let repo = repository();
        let mut vm = CompanyListingsViewModel::new(repo.clone(), Duration::from_millis(500));
        vm.idle().await;
        repo.clear_calls();

        vm.on_event(CompanyListingsEvent::OnSearchQueryChange("A".to_string()));
        tokio::time::sleep(Duration::from_millis(40)).await;
        vm.on_event(CompanyListingsEvent::OnSearchQueryChange("AA".to_string()));
        tokio::time::sleep(Duration::from_millis(40)).await;
        vm.on_event(CompanyListingsEvent::OnSearchQueryChange("AAP".to_string()));
        let last_keystroke = Instant::now();

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(repo.calls().is_empty());

        vm.idle().await;

        let calls = repo.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "aap");
        assert!(!calls[0].fetch_from_remote);
        assert!(calls[0].at.duration_since(last_keystroke) >= Duration::from_millis(500));

        let state = vm.state();
        assert_eq!(state.search_query, "AAP");
        let symbols: Vec<&str> = state.companies.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAP"]);
    }

    #[tokio::test]
    async fn refresh_forces_remote_fetch_without_debounce() {
        let repo = repository();
        let mut vm = CompanyListingsViewModel::new(repo.clone(), Duration::from_secs(3600));
        vm.idle().await;
        repo.clear_calls();

        vm.on_event(CompanyListingsEvent::Refresh);
        vm.idle().await;

        let calls = repo.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].fetch_from_remote);
        assert!(!vm.state().is_refreshing);
    }

    #[tokio::test]
    async fn refresh_failure_is_not_surfaced() {
        let repo = Arc::new(FakeRepository {
            listings: vec![listing("Apple Inc", "AAPL")],
            fail_remote: true,
            ..Default::default()
        });
        let mut vm = CompanyListingsViewModel::new(repo.clone(), Duration::from_millis(500));
        vm.idle().await;

        vm.on_event(CompanyListingsEvent::Refresh);
        vm.idle().await;

        let state = vm.state();
        assert_eq!(state.companies, vec![listing("Apple Inc", "AAPL")]);
        // A failed refresh emits no trailing Loading(false), so the spinner stays on.
        assert!(state.is_loading);
    }

    #[tokio::test]
    async fn subscribers_see_state_changes() {
        let repo = repository();
        let mut vm = CompanyListingsViewModel::new(repo, Duration::from_millis(500));
        let mut rx = vm.subscribe();
        vm.idle().await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().companies.len(), 3);
    }
}
