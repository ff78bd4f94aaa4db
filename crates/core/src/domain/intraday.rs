use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One intraday close. `date` is a local wall-clock timestamp as reported by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntraDayInfo {
    pub date: NaiveDateTime,
    pub close: f64,
}
