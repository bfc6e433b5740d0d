use serde::{Deserialize, Serialize};

/// One product as scraped from a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub item: Option<String>,
    pub price: Option<String>,
    pub description: Vec<String>,
}

impl Record {
    pub fn new(item: Option<String>, price: Option<String>, description: Vec<String>) -> Self {
        Self {
            item,
            price,
            description,
        }
    }
}
