use super::{off_thread, reader, CsvParser, CsvSource, ParseError};
use crate::domain::CompanyListing;
use std::io::Read;

/// Parses the `LISTING_STATUS` dump: `symbol,name,exchange,assetType,...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyListingsParser;

impl CompanyListingsParser {
    pub fn parse_blocking<R: Read>(&self, source: R) -> Result<Vec<CompanyListing>, ParseError> {
        let mut rdr = reader(source);
        let mut out = Vec::new();
        for record in rdr.records() {
            let record = record?;
            // Short rows are skipped rather than rejected.
            let (Some(symbol), Some(name), Some(exchange)) =
                (record.get(0), record.get(1), record.get(2))
            else {
                continue;
            };
            out.push(CompanyListing {
                name: name.to_string(),
                symbol: symbol.to_string(),
                exchange: exchange.to_string(),
            });
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl CsvParser<CompanyListing> for CompanyListingsParser {
    async fn parse(&self, source: CsvSource) -> Result<Vec<CompanyListing>, ParseError> {
        let parser = *self;
        let listings = off_thread(move || parser.parse_blocking(source)).await?;
        tracing::debug!(count = listings.len(), "parsed company listings");
        Ok(listings)
    }
}
