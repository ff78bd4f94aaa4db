use serde::{Deserialize, Serialize};

/// `OVERVIEW` payload. Unknown symbols come back as `{}`, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfoDto {
    #[serde(rename = "Symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Industry", default)]
    pub industry: Option<String>,
}

/// One CSV row of the intraday series before timestamp parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct IntraDayInfoDto {
    pub timestamp: String,
    pub close: f64,
}
