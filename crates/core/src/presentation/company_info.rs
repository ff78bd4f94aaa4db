use crate::domain::{CompanyInfo, IntraDayInfo};
use crate::repository::StockRepository;
use crate::resource::Resource;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyInfoState {
    pub stock_infos: Vec<IntraDayInfo>,
    pub company: Option<CompanyInfo>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// State holder of the company detail screen: company overview plus yesterday's chart.
pub struct CompanyInfoViewModel {
    state: Arc<watch::Sender<CompanyInfoState>>,
    job: Option<JoinHandle<()>>,
}

impl CompanyInfoViewModel {
    /// Creates the holder and starts fetching both resources for `symbol` concurrently.
    pub fn new(repository: Arc<dyn StockRepository>, symbol: impl Into<String>) -> Self {
        let (state, _) = watch::channel(CompanyInfoState::default());
        let state = Arc::new(state);
        let symbol = symbol.into();

        let job = if symbol.trim().is_empty() {
            tracing::warn!("company info requested without a symbol");
            None
        } else {
            let state = state.clone();
            Some(tokio::spawn(async move {
                load(repository.as_ref(), &state, &symbol).await;
            }))
        };

        Self { state, job }
    }

    pub fn state(&self) -> CompanyInfoState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CompanyInfoState> {
        self.state.subscribe()
    }

    pub async fn idle(&mut self) {
        if let Some(job) = self.job.take() {
            let _ = job.await;
        }
    }
}

impl Drop for CompanyInfoViewModel {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            job.abort();
        }
    }
}

async fn load(
    repository: &dyn StockRepository,
    state: &watch::Sender<CompanyInfoState>,
    symbol: &str,
) {
    state.send_modify(|s| s.is_loading = true);

    let (company, intraday) = tokio::join!(
        repository.get_company_info(symbol),
        repository.get_intraday_info(symbol),
    );

    // Applied in this order: a successful chart clears an earlier company error, and a failed
    // chart clears the company.
    state.send_modify(|s| {
        match company {
            Resource::Success(info) => {
                s.company = Some(info);
                s.error = None;
            }
            Resource::Error { message } => {
                s.company = None;
                s.error = Some(message);
            }
            Resource::Loading { .. } => {}
        }
        s.is_loading = false;
    });

    state.send_modify(|s| {
        match intraday {
            Resource::Success(infos) => {
                s.stock_infos = infos;
                s.error = None;
            }
            Resource::Error { message } => {
                s.company = None;
                s.error = Some(message);
            }
            Resource::Loading { .. } => {}
        }
        s.is_loading = false;
    });
}
