use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<FsqPlace>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsqPlace {
    #[serde(default)]
    pub fsq_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub categories: Vec<FsqCategory>,
    #[serde(default)]
    pub location: Option<FsqLocation>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub hours: Option<FsqHours>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsqCategory {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsqLocation {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsqHours {
    #[serde(default)]
    pub regular: Vec<FsqRegularHours>,
}

/// `open`/`close` are `HHMM`; a leading `+` on `close` means the next day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsqRegularHours {
    pub day: u8,
    pub open: String,
    pub close: String,
}
