use super::{
    ResourceStream, StockRepository, CACHE_ERROR, COMPANY_INFO_ERROR, INTRADAY_ERROR, LOAD_ERROR,
};
use crate::domain::{CompanyInfo, CompanyListing, IntraDayInfo};
use crate::parser::{CompanyListingsParser, CsvParser, CsvSource, IntradayInfoParser};
use crate::remote::{RemoteError, StockApi};
use crate::resource::Resource;
use crate::storage::listings::{
    replace_company_listings, search_company_listings, CompanyListingEntity,
};
use futures::StreamExt;
use sqlx::sqlite::SqlitePool;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const EMISSION_BUFFER: usize = 8;

/// Repository backed by the SQLite listing cache and a remote [`StockApi`].
#[derive(Clone)]
pub struct CachedStockRepository {
    api: Arc<dyn StockApi>,
    pool: SqlitePool,
    listings_parser: Arc<dyn CsvParser<CompanyListing>>,
    intraday_parser: Arc<dyn CsvParser<IntraDayInfo>>,
}

impl CachedStockRepository {
    pub fn new(api: Arc<dyn StockApi>, pool: SqlitePool) -> Self {
        Self {
            api,
            pool,
            listings_parser: Arc::new(CompanyListingsParser),
            intraday_parser: Arc::new(IntradayInfoParser),
        }
    }

    pub fn with_parsers(
        mut self,
        listings_parser: Arc<dyn CsvParser<CompanyListing>>,
        intraday_parser: Arc<dyn CsvParser<IntraDayInfo>>,
    ) -> Self {
        self.listings_parser = listings_parser;
        self.intraday_parser = intraday_parser;
        self
    }

    async fn fetch_intraday_info(&self, symbol: &str) -> Result<Vec<IntraDayInfo>, RemoteError> {
        let payload = self.api.get_intraday_info(symbol).await?;
        Ok(self.intraday_parser.parse(csv_source(payload)).await?)
    }

    async fn fetch_company_info(&self, symbol: &str) -> Result<CompanyInfo, RemoteError> {
        let dto = self.api.get_company_info(symbol).await?;
        Ok(CompanyInfo::from(dto))
    }
}

#[async_trait::async_trait]
impl StockRepository for CachedStockRepository {
    /// Spawns the producer on the current tokio runtime; the returned stream is its only
    /// consumer. Dropping the stream stops the producer at its next emission.
    fn get_company_list(
        &self,
        fetch_from_remote: bool,
        query: &str,
    ) -> ResourceStream<Vec<CompanyListing>> {
        let (tx, rx) = mpsc::channel(EMISSION_BUFFER);
        let flow = CompanyListFlow {
            repo: self.clone(),
            tx,
        };
        let query = query.to_string();
        tokio::spawn(async move {
            if flow.run(fetch_from_remote, &query).await.is_err() {
                tracing::debug!(%query, "company list collector went away");
            }
        });
        ReceiverStream::new(rx).boxed()
    }

    async fn get_intraday_info(&self, symbol: &str) -> Resource<Vec<IntraDayInfo>> {
        match self.fetch_intraday_info(symbol).await {
            Ok(infos) => Resource::Success(infos),
            Err(err) => {
                tracing::warn!(symbol, kind = err.kind(), error = %err, "intraday info fetch failed");
                Resource::error(INTRADAY_ERROR)
            }
        }
    }

    async fn get_company_info(&self, symbol: &str) -> Resource<CompanyInfo> {
        match self.fetch_company_info(symbol).await {
            Ok(info) => Resource::Success(info),
            Err(err) => {
                tracing::warn!(symbol, kind = err.kind(), error = %err, "company info fetch failed");
                Resource::error(COMPANY_INFO_ERROR)
            }
        }
    }
}

#[derive(Debug)]
struct CollectorGone;

struct CompanyListFlow {
    repo: CachedStockRepository,
    tx: mpsc::Sender<Resource<Vec<CompanyListing>>>,
}

impl CompanyListFlow {
    async fn emit(&self, resource: Resource<Vec<CompanyListing>>) -> Result<(), CollectorGone> {
        self.tx.send(resource).await.map_err(|_| CollectorGone)
    }

    async fn run(self, fetch_from_remote: bool, query: &str) -> Result<(), CollectorGone> {
        self.emit(Resource::loading(true)).await?;

        let local = match self.search(query).await {
            Ok(local) => local,
            Err(err) => return self.cache_failed(err).await,
        };
        let is_db_empty = local.is_empty() && query.trim().is_empty();
        self.emit(Resource::Success(local)).await?;

        if !is_db_empty && !fetch_from_remote {
            self.emit(Resource::loading(false)).await?;
            return Ok(());
        }

        let remote = match self.fetch_remote().await {
            Ok(remote) => remote,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "company listings refresh failed");
                return self.emit(Resource::error(LOAD_ERROR)).await;
            }
        };

        let entities: Vec<CompanyListingEntity> =
            remote.into_iter().map(CompanyListingEntity::from).collect();
        if let Err(err) = replace_company_listings(&self.repo.pool, &entities).await {
            return self.cache_failed(err).await;
        }
        tracing::info!(count = entities.len(), "company listings cache refreshed");

        let fresh = match self.search("").await {
            Ok(fresh) => fresh,
            Err(err) => return self.cache_failed(err).await,
        };
        self.emit(Resource::Success(fresh)).await?;
        self.emit(Resource::loading(false)).await
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<CompanyListing>> {
        let rows = search_company_listings(&self.repo.pool, query).await?;
        Ok(rows.into_iter().map(CompanyListing::from).collect())
    }

    async fn fetch_remote(&self) -> Result<Vec<CompanyListing>, RemoteError> {
        let payload = self.repo.api.get_listings().await?;
        Ok(self.repo.listings_parser.parse(csv_source(payload)).await?)
    }

    async fn cache_failed(&self, err: anyhow::Error) -> Result<(), CollectorGone> {
        tracing::error!(error = %format!("{err:#}"), "company listings cache failure");
        self.emit(Resource::error(CACHE_ERROR)).await
    }
}

fn csv_source(payload: Vec<u8>) -> CsvSource {
    Box::new(Cursor::new(payload))
}
