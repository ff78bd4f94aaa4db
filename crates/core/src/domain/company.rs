use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyListing {
    pub name: String,
    pub symbol: String,
    pub exchange: String,
}

/// Company overview. Fields the remote payload omits are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub symbol: String,
    pub description: String,
    pub name: String,
    pub country: String,
    pub industry: String,
}
