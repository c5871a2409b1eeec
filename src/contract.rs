//! Per-mode request/response contracts.
//!
//! Each scan mode maps to exactly one backend path, one request key and one
//! response shape. The table is the only place those conventions live.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ConfigError, ScanError, TransportError, NO_EMAILS_MESSAGE};
use crate::types::{LeadRecord, LeadsResponse, RelatedLink, SearchResult};

/// Scan variants offered by the view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Fast,
    Deep,
    /// Locked upsell placeholder; never issues a request.
    Bulk,
}

impl ScanMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanMode::Fast => "fast",
            ScanMode::Deep => "deep",
            ScanMode::Bulk => "bulk",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(ScanMode::Fast),
            "deep" => Ok(ScanMode::Deep),
            "bulk" => Ok(ScanMode::Bulk),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// JSON key the target is sent under.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetKey {
    Url,
    Domain,
}

impl TargetKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKey::Url => "url",
            TargetKey::Domain => "domain",
        }
    }
}

impl FromStr for TargetKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(TargetKey::Url),
            "domain" => Ok(TargetKey::Domain),
            _ => Err(ConfigError::UnknownTargetKey(s.to_string())),
        }
    }
}

/// Which fast-scan endpoint the backend deployment exposes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FastEndpoint {
    /// `/scan-website` with `{ domain }`, answering `{ status, emails }`.
    #[default]
    ScanWebsite,
    /// `/scrape` with `{ url }`, answering `{ leads }`.
    Scrape,
}

impl fmt::Display for FastEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FastEndpoint::ScanWebsite => f.write_str("scan-website"),
            FastEndpoint::Scrape => f.write_str("scrape"),
        }
    }
}

impl FromStr for FastEndpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "scan-website" => Ok(FastEndpoint::ScanWebsite),
            "scrape" => Ok(FastEndpoint::Scrape),
            _ => Err(ConfigError::UnknownFastEndpoint(s.to_string())),
        }
    }
}

/// How a 2xx body is interpreted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// `{ leads: LeadRecord[] }`; an empty list is still a success.
    Leads,
    /// `{ status, emails, related_links?, message?, source? }`.
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub path: &'static str,
    pub key: TargetKey,
    pub shape: ResponseShape,
}

/// Successfully interpreted response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutcome {
    Leads {
        leads: Vec<LeadRecord>,
    },
    Search {
        emails: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        related_links: Option<Vec<RelatedLink>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl ScanOutcome {
    /// Number of rows or emails found.
    pub fn count(&self) -> usize {
        match self {
            ScanOutcome::Leads { leads } => leads.len(),
            ScanOutcome::Search { emails, .. } => emails.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Every email in display order.
    pub fn emails(&self) -> Vec<&str> {
        match self {
            ScanOutcome::Leads { leads } => leads.iter().map(|l| l.email.as_str()).collect(),
            ScanOutcome::Search { emails, .. } => emails.iter().map(String::as_str).collect(),
        }
    }

    /// Related links to show as "Verified Sources", if any.
    pub fn sources(&self) -> &[RelatedLink] {
        match self {
            ScanOutcome::Search {
                related_links: Some(links),
                ..
            } => links,
            _ => &[],
        }
    }
}

impl Contract {
    pub const SCRAPE: Contract = Contract {
        path: "/scrape",
        key: TargetKey::Url,
        shape: ResponseShape::Leads,
    };

    pub const SCAN_WEBSITE: Contract = Contract {
        path: "/scan-website",
        key: TargetKey::Domain,
        shape: ResponseShape::Status,
    };

    pub const fn deep_search(key: TargetKey) -> Contract {
        Contract {
            path: "/deep-search",
            key,
            shape: ResponseShape::Status,
        }
    }

    /// JSON body carrying the target under this contract's key.
    pub fn request_body(&self, target: &str) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.key.as_str().to_string(), json!(target));
        Value::Object(body)
    }

    /// Interpret a raw 2xx body.
    pub fn interpret(&self, body: &[u8]) -> Result<ScanOutcome, ScanError> {
        match self.shape {
            ResponseShape::Leads => {
                let parsed: LeadsResponse =
                    serde_json::from_slice(body).map_err(TransportError::from)?;
                Ok(ScanOutcome::Leads {
                    leads: parsed.leads,
                })
            }
            ResponseShape::Status => {
                let parsed: SearchResult =
                    serde_json::from_slice(body).map_err(TransportError::from)?;
                if !parsed.is_success() {
                    let message = parsed
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| NO_EMAILS_MESSAGE.to_string());
                    return Err(ScanError::Logical { message });
                }
                Ok(ScanOutcome::Search {
                    emails: parsed.emails,
                    related_links: parsed.related_links,
                    source: parsed.source,
                })
            }
        }
    }
}

/// Mode to contract mapping. `Bulk` has no contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTable {
    fast: Contract,
    deep: Contract,
}

impl ContractTable {
    pub fn new(fast: FastEndpoint, deep_key: TargetKey) -> Self {
        let fast = match fast {
            FastEndpoint::ScanWebsite => Contract::SCAN_WEBSITE,
            FastEndpoint::Scrape => Contract::SCRAPE,
        };
        Self {
            fast,
            deep: Contract::deep_search(deep_key),
        }
    }

    pub fn contract_for(&self, mode: ScanMode) -> Option<&Contract> {
        match mode {
            ScanMode::Fast => Some(&self.fast),
            ScanMode::Deep => Some(&self.deep),
            ScanMode::Bulk => None,
        }
    }
}

impl Default for ContractTable {
    fn default() -> Self {
        Self::new(FastEndpoint::default(), TargetKey::Domain)
    }
}
