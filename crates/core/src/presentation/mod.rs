//! Screen state holders.
//!
//! Each holder owns its screen state behind a `watch` channel so a front-end can either poll
//! [`state`](CompanyListingsViewModel::state) or subscribe to changes. Work is spawned on the
//! current tokio runtime and aborted when the holder is dropped.

pub mod company_info;
pub mod company_listings;

pub use company_info::{CompanyInfoState, CompanyInfoViewModel};
pub use company_listings::{CompanyListingsEvent, CompanyListingsState, CompanyListingsViewModel};
