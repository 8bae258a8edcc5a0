use serde::{Deserialize, Serialize};

pub const NO_NEWS: &str = "No news available at the moment.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

impl Article {
    pub fn new(title: &str, url: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        }
    }
}
