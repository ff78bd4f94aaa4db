//! CSV payload parsers.
//!
//! Both payloads served by the remote API (the listings dump and the intraday series) are CSV
//! with a header row. Parsing is synchronous and runs on tokio's blocking pool so it never
//! stalls the async executor; the reader handed to a parser is owned by the parse call and is
//! dropped as soon as parsing finishes, whatever the outcome.

pub mod intraday;
pub mod listings;

pub use intraday::IntradayInfoParser;
pub use listings::CompanyListingsParser;

use std::io::Read;
use thiserror::Error;

pub type CsvSource = Box<dyn Read + Send>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed {field} {value:?}: {reason}")]
    MalformedInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("parser task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
pub trait CsvParser<T>: Send + Sync {
    async fn parse(&self, source: CsvSource) -> Result<Vec<T>, ParseError>;
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

async fn off_thread<T, F>(f: F) -> Result<Vec<T>, ParseError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Vec<T>, ParseError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
