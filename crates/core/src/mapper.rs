//! Conversions between wire records, cached rows and domain values.
//!
//! Everything here is total except the intraday timestamp, whose parse failure surfaces as
//! [`ParseError::MalformedInput`] for the caller to deal with.

use crate::domain::{CompanyInfo, CompanyListing, IntraDayInfo};
use crate::parser::ParseError;
use crate::remote::dto::{CompanyInfoDto, IntraDayInfoDto};
use crate::storage::listings::CompanyListingEntity;
use chrono::NaiveDateTime;

pub const INTRADAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<CompanyListingEntity> for CompanyListing {
    fn from(entity: CompanyListingEntity) -> Self {
        Self {
            name: entity.name,
            symbol: entity.symbol,
            exchange: entity.exchange,
        }
    }
}

impl From<CompanyListing> for CompanyListingEntity {
    fn from(listing: CompanyListing) -> Self {
        Self {
            name: listing.name,
            symbol: listing.symbol,
            exchange: listing.exchange,
        }
    }
}

impl From<CompanyInfoDto> for CompanyInfo {
    fn from(dto: CompanyInfoDto) -> Self {
        Self {
            symbol: dto.symbol.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            country: dto.country.unwrap_or_default(),
            industry: dto.industry.unwrap_or_default(),
        }
    }
}

impl TryFrom<IntraDayInfoDto> for IntraDayInfo {
    type Error = ParseError;

    fn try_from(dto: IntraDayInfoDto) -> Result<Self, Self::Error> {
        let date = NaiveDateTime::parse_from_str(&dto.timestamp, INTRADAY_TIMESTAMP_FORMAT)
            .map_err(|err| ParseError::MalformedInput {
                field: "timestamp",
                value: dto.timestamp.clone(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            date,
            close: dto.close,
        })
    }
}
