pub mod cached;

pub use cached::CachedStockRepository;

use crate::domain::{CompanyInfo, CompanyListing, IntraDayInfo};
use crate::resource::Resource;
use futures::stream::BoxStream;

/// Ordered emissions of one repository call, observed by a single collector.
pub type ResourceStream<T> = BoxStream<'static, Resource<T>>;

pub const LOAD_ERROR: &str = "Couldn't load data";
pub const CACHE_ERROR: &str = "Couldn't access local cache";
pub const INTRADAY_ERROR: &str = "Couldn't load intraday info";
pub const COMPANY_INFO_ERROR: &str = "Couldn't load company info";

#[async_trait::async_trait]
pub trait StockRepository: Send + Sync + 'static {
    /// Cache-first listing read that refreshes from the remote API when asked to, or when
    /// the cache is empty and no search filter is active.
    ///
    /// Emissions, in order: `Loading(true)`, `Success(cached)`, then either `Loading(false)`
    /// (no refresh, or refresh succeeded after a second `Success(fresh)`) or `Error` (refresh
    /// failed; nothing follows it).
    fn get_company_list(
        &self,
        fetch_from_remote: bool,
        query: &str,
    ) -> ResourceStream<Vec<CompanyListing>>;

    async fn get_intraday_info(&self, symbol: &str) -> Resource<Vec<IntraDayInfo>>;

    async fn get_company_info(&self, symbol: &str) -> Resource<CompanyInfo>;
}
