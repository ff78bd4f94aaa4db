pub mod company;
pub mod intraday;

pub use company::{CompanyInfo, CompanyListing};
pub use intraday::IntraDayInfo;
