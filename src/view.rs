use std::sync::Arc;

use ::time::{format_description::well_known, OffsetDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::backend::LeadBackend;
use crate::clipboard::{Clipboard, Osc52Clipboard};
use crate::contract::{Contract, ContractTable, ScanMode, ScanOutcome};
use crate::error::ScanError;

pub const LOADING_MESSAGE: &str = "Scanning website... this may take 10-20 seconds...";
pub const EMPTY_RESULT_MESSAGE: &str = "No emails found on this page.";

/// Finished scan as shown in the view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanView {
    pub mode: ScanMode,
    pub target: String,
    pub outcome: ScanOutcome,
    pub completed_at: String,
}

impl ScanView {
    pub fn message(&self) -> String {
        let n = self.outcome.count();
        match &self.outcome {
            _ if n == 0 => EMPTY_RESULT_MESSAGE.to_string(),
            ScanOutcome::Leads { .. } => format!("Success! Found {n} verified leads."),
            ScanOutcome::Search { .. } => format!("Success! Found {n} emails."),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    /// `ticket` is the generation of the request being awaited.
    Loading {
        ticket: u64,
    },
    Success {
        view: ScanView,
    },
    Error {
        message: String,
    },
}

impl ScanState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScanState::Loading { .. })
    }
}

/// Why `submit` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTarget,
    InFlight,
    /// Bulk mode is a locked upsell panel.
    Locked,
}

/// What `submit` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    Skipped(SkipReason),
    /// Response applied to the view.
    Applied,
    /// Response arrived after the view moved on and was dropped.
    Discarded,
}

/// Reservation for one in-flight request, handed out by [`ScanClient::begin`].
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: u64,
    pub mode: ScanMode,
    pub target: String,
    contract: Contract,
}

/// Serializable copy of the whole view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub target: String,
    pub mode: ScanMode,
    pub loading: bool,
    pub status: String,
    pub generation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied: Option<String>,
    #[serde(flatten)]
    pub state: ScanState,
}

#[derive(Debug, Default)]
struct ViewInner {
    target: String,
    mode: ScanMode,
    state: ScanState,
    generation: u64,
    copied: Option<String>,
}

impl ViewInner {
    fn status_line(&self) -> String {
        match &self.state {
            ScanState::Idle => String::new(),
            ScanState::Loading { .. } => LOADING_MESSAGE.to_string(),
            ScanState::Success { view } => view.message(),
            ScanState::Error { message } => message.clone(),
        }
    }
}

/// The scan view: one target input, one mode selector, one result area.
///
/// At most one request is in flight. Every submit is stamped with a new
/// generation and a response is applied only while its generation is current.
pub struct ScanClient {
    backend: Arc<dyn LeadBackend>,
    contracts: ContractTable,
    inner: RwLock<ViewInner>,
    clipboard: Mutex<Box<dyn Clipboard>>,
}

impl ScanClient {
    pub fn new(backend: Arc<dyn LeadBackend>, contracts: ContractTable) -> Self {
        let clipboard: Box<dyn Clipboard> = Box::new(Osc52Clipboard::stdout());
        Self {
            backend,
            contracts,
            inner: RwLock::new(ViewInner::default()),
            clipboard: Mutex::new(clipboard),
        }
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        let clipboard: Box<dyn Clipboard> = Box::new(clipboard);
        self.clipboard = Mutex::new(clipboard);
        self
    }

    pub fn contracts(&self) -> &ContractTable {
        &self.contracts
    }

    pub async fn set_target(&self, value: impl Into<String>) {
        self.inner.write().await.target = value.into();
    }

    /// Switch mode. An in-flight request is left alone.
    pub async fn select_mode(&self, mode: ScanMode) {
        self.inner.write().await.mode = mode;
    }

    pub async fn state(&self) -> ScanState {
        self.inner.read().await.state.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.state.is_loading()
    }

    pub async fn status_line(&self) -> String {
        self.inner.read().await.status_line()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let s = self.inner.read().await;
        ViewSnapshot {
            target: s.target.clone(),
            mode: s.mode,
            loading: s.state.is_loading(),
            status: s.status_line(),
            generation: s.generation,
            copied: s.copied.clone(),
            state: s.state.clone(),
        }
    }

    /// Run one scan cycle with the current target and mode.
    pub async fn submit(&self) -> SubmitResult {
        match self.begin().await {
            Ok(ticket) => self.run(ticket).await,
            Err(reason) => SubmitResult::Skipped(reason),
        }
    }

    /// Reserve the in-flight slot: move to `Loading`, clear previous results
    /// and stamp a new generation. Fails without touching state when the
    /// target is empty, a scan is already running, or the mode is locked.
    pub async fn begin(&self) -> Result<Ticket, SkipReason> {
        let mut s = self.inner.write().await;
        if s.target.trim().is_empty() {
            return Err(SkipReason::EmptyTarget);
        }
        if s.state.is_loading() {
            return Err(SkipReason::InFlight);
        }
        let contract = self
            .contracts
            .contract_for(s.mode)
            .cloned()
            .ok_or(SkipReason::Locked)?;

        s.generation += 1;
        s.state = ScanState::Loading {
            ticket: s.generation,
        };
        s.copied = None;
        let target = s.target.clone();
        debug!(generation = s.generation, mode = %s.mode, site = %target, "scan started");

        Ok(Ticket {
            generation: s.generation,
            mode: s.mode,
            target,
            contract,
        })
    }

    /// Perform the request for `ticket` and apply its outcome.
    pub async fn run(&self, ticket: Ticket) -> SubmitResult {
        let body = ticket.contract.request_body(&ticket.target);
        let result = match self.backend.post_json(ticket.contract.path, &body).await {
            Ok(bytes) => ticket.contract.interpret(&bytes),
            Err(e) => Err(ScanError::from(e)),
        };
        self.on_response(&ticket, result).await
    }

    /// Apply an outcome if `ticket` is still the latest request.
    pub async fn on_response(
        &self,
        ticket: &Ticket,
        result: Result<ScanOutcome, ScanError>,
    ) -> SubmitResult {
        let mut s = self.inner.write().await;
        if s.generation != ticket.generation {
            warn!(
                stale = ticket.generation,
                current = s.generation,
                "discarding stale scan response"
            );
            return SubmitResult::Discarded;
        }

        s.state = match result {
            Ok(outcome) => {
                info!(
                    generation = ticket.generation,
                    site = %ticket.target,
                    found = outcome.count(),
                    "scan finished"
                );
                ScanState::Success {
                    view: ScanView {
                        mode: ticket.mode,
                        target: ticket.target.clone(),
                        outcome,
                        completed_at: now_rfc3339(),
                    },
                }
            }
            Err(e) => {
                match &e {
                    ScanError::Transport(cause) => {
                        warn!(site = %ticket.target, error = %cause, "scan transport failure")
                    }
                    ScanError::Logical { message } => {
                        info!(site = %ticket.target, %message, "scan reported failure")
                    }
                }
                ScanState::Error {
                    message: e.user_message(),
                }
            }
        };
        SubmitResult::Applied
    }

    /// Back to idle; any in-flight response will be discarded.
    pub async fn reset(&self) {
        let mut s = self.inner.write().await;
        s.generation += 1;
        s.state = ScanState::Idle;
        s.copied = None;
    }

    /// Copy `text` to the clipboard and remember it for "Copied!" feedback.
    pub async fn copy_to_clipboard(&self, text: &str) -> std::io::Result<()> {
        self.clipboard.lock().await.copy(text)?;
        self.inner.write().await.copied = Some(text.to_string());
        Ok(())
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
