//! Terminal rendering of the scan view.

use std::fmt::Write as _;

use colored::{ColoredString, Colorize};

use crate::contract::{ScanMode, ScanOutcome};
use crate::types::{ConfidenceTier, LeadRecord, RelatedLink};
use crate::view::{ScanState, ViewSnapshot};

pub const SOURCES_HEADING: &str = "Verified Sources";

/// Confidence label styled by its tier.
pub fn badge(label: &str) -> ColoredString {
    match ConfidenceTier::from_label(label) {
        ConfidenceTier::Positive => label.green().bold(),
        ConfidenceTier::Warning => label.yellow().bold(),
        ConfidenceTier::Default => label.blue().bold(),
    }
}

/// Whole view: mode tabs, status line, then results or the bulk panel.
pub fn render_snapshot(snap: &ViewSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", mode_tabs(snap.mode));

    if snap.mode == ScanMode::Bulk && !snap.loading {
        out.push_str(&bulk_panel());
        return out;
    }

    if !snap.status.is_empty() {
        let status = match &snap.state {
            ScanState::Error { .. } => snap.status.red(),
            _ => snap.status.yellow(),
        };
        let _ = writeln!(out, "{status}");
    }

    if let ScanState::Success { view } = &snap.state {
        out.push_str(&render_outcome(&view.outcome));
    }

    if let Some(copied) = &snap.copied {
        let _ = writeln!(out, "{} {}", "Copied!".green(), copied);
    }
    out
}

pub fn render_outcome(outcome: &ScanOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ScanOutcome::Leads { leads } => {
            if !leads.is_empty() {
                out.push_str(&lead_table(leads));
            }
        }
        ScanOutcome::Search {
            emails,
            related_links,
            source,
        } => {
            if let Some(src) = source {
                let _ = writeln!(out, "{} {}", "source:".bright_black(), src);
            }
            if !emails.is_empty() {
                out.push_str(&email_list(emails));
            }
            let links: Vec<RelatedLink> = related_links
                .iter()
                .flatten()
                .filter(|l| l.is_web())
                .cloned()
                .collect();
            if !links.is_empty() {
                out.push_str(&sources_list(&links));
            }
        }
    }
    out
}

/// Aligned email/source/confidence rows.
pub fn lead_table(leads: &[LeadRecord]) -> String {
    let mut email_w = "email".len();
    let mut source_w = "source".len();
    for l in leads {
        email_w = email_w.max(l.email.len());
        source_w = source_w.max(l.source.len().min(48));
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "RESULTS".bright_black().bold());
    let _ = writeln!(
        out,
        "{:<email_w$}  {:<source_w$}  confidence",
        "email",
        "source",
        email_w = email_w,
        source_w = source_w
    );
    let _ = writeln!(
        out,
        "{:-<email_w$}  {:-<source_w$}  {:-<10}",
        "",
        "",
        "",
        email_w = email_w,
        source_w = source_w
    );
    for l in leads {
        let mut source = l.source.clone();
        if source.len() > 48 {
            source = truncate_chars(&source, 48);
        }
        let _ = writeln!(
            out,
            "{:<email_w$}  {:<source_w$}  {}",
            l.email,
            source,
            badge(&l.confidence),
            email_w = email_w,
            source_w = source_w
        );
    }
    out
}

pub fn email_list(emails: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "EMAILS".bright_black().bold());
    for e in emails {
        let _ = writeln!(out, "  {}", e.white().bold());
    }
    out
}

pub fn sources_list(links: &[RelatedLink]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", SOURCES_HEADING.to_uppercase().bright_black().bold());
    for l in links {
        let title = if l.title.is_empty() { &l.link } else { &l.title };
        let _ = writeln!(out, "  {}\n    {}", title, l.link.cyan().underline());
    }
    out
}

/// Locked upsell shown for bulk mode.
pub fn bulk_panel() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "PREMIUM".on_magenta().white().bold());
    let _ = writeln!(out, "{}", "Unlock Bulk Power".bold());
    let _ = writeln!(
        out,
        "Upload a CSV of 500+ websites and verify thousands of leads in minutes.\n\
         Export directly to HubSpot or Salesforce."
    );
    let _ = writeln!(out, "{}", "Get Pro Access ($29/mo)".magenta().bold());
    let _ = writeln!(
        out,
        "{}",
        "Limited spots for Beta. Contact Sales: founder@vasic.io".bright_black()
    );
    out
}

fn mode_tabs(active: ScanMode) -> String {
    [
        (ScanMode::Fast, "Fast Scan"),
        (ScanMode::Deep, "Deep Search"),
        (ScanMode::Bulk, "Bulk Scan [Pro]"),
    ]
    .iter()
    .map(|(mode, label)| {
        if *mode == active {
            format!("[{}]", label.bold())
        } else {
            format!(" {} ", label.bright_black())
        }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
