use serde::{Deserialize, Serialize};

/// One discovered lead: an email address with the page it came from and a confidence label.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub email: String,
    pub source: String,
    pub confidence: String,
}

impl LeadRecord {
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_label(&self.confidence)
    }
}

/// Styling bucket for a confidence label.
///
/// The backend sends free-form labels; only substring checks are applied here,
/// `HIGH` taking precedence over `Team`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Positive,
    Warning,
    Default,
}

impl ConfidenceTier {
    pub fn from_label(label: &str) -> Self {
        if label.contains("HIGH") {
            ConfidenceTier::Positive
        } else if label.contains("Team") {
            ConfidenceTier::Warning
        } else {
            ConfidenceTier::Default
        }
    }
}

/// Supporting link returned by a deep search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelatedLink {
    pub link: String,
    #[serde(default)]
    pub title: String,
}

impl RelatedLink {
    /// Only http(s) links are rendered as clickable sources.
    pub fn is_web(&self) -> bool {
        url::Url::parse(&self.link)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}

/// Body of `/scrape`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LeadsResponse {
    pub leads: Vec<LeadRecord>,
}

/// Body of `/scan-website` and `/deep-search`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SearchResult {
    pub status: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_links: Option<Vec<RelatedLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchResult {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
