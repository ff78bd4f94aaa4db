use super::{off_thread, reader, CsvParser, CsvSource, ParseError};
use crate::domain::IntraDayInfo;
use crate::remote::dto::IntraDayInfoDto;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::io::Read;

/// Parses the intraday CSV series and keeps the previous calendar day only.
///
/// Column 0 is the timestamp, column 1 the price used as the close. "Yesterday" is computed
/// from the local clock when parsing runs, so the same payload parsed on two different days
/// yields different results.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntradayInfoParser;

impl IntradayInfoParser {
    pub fn parse_blocking<R: Read>(&self, source: R) -> Result<Vec<IntraDayInfo>, ParseError> {
        self.parse_as_of(source, Local::now().naive_local())
    }

    /// Same as [`parse_blocking`](Self::parse_blocking) with an explicit "now".
    pub fn parse_as_of<R: Read>(
        &self,
        source: R,
        now: NaiveDateTime,
    ) -> Result<Vec<IntraDayInfo>, ParseError> {
        let mut rdr = reader(source);
        let mut out = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let (Some(timestamp), Some(close)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let close = close
                .parse::<f64>()
                .map_err(|err| ParseError::MalformedInput {
                    field: "close",
                    value: close.to_string(),
                    reason: err.to_string(),
                })?;
            let dto = IntraDayInfoDto {
                timestamp: timestamp.to_string(),
                close,
            };
            out.push(IntraDayInfo::try_from(dto)?);
        }

        let yesterday = (now - Duration::days(1)).date();
        out.retain(|info| info.date.date() == yesterday);
        out.sort_by_key(|info| info.date.hour());
        Ok(out)
    }
}

#[async_trait::async_trait]
impl CsvParser<IntraDayInfo> for IntradayInfoParser {
    async fn parse(&self, source: CsvSource) -> Result<Vec<IntraDayInfo>, ParseError> {
        let parser = *self;
        let infos = off_thread(move || parser.parse_blocking(source)).await?;
        tracing::debug!(count = infos.len(), "parsed intraday info");
        Ok(infos)
    }
}
