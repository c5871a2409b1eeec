use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use lead_scan_rs::backend::HttpBackend;
use lead_scan_rs::config::{self, Config};
use lead_scan_rs::contract::{FastEndpoint, ScanMode, TargetKey};
use lead_scan_rs::view::{ScanClient, ScanState, SkipReason, SubmitResult, ViewSnapshot};
use lead_scan_rs::{render, server};

/// lead-scan-rs — find contact emails for a website through a remote lead-scanning service.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lead-scan-rs",
    version,
    about = "Find contact emails for a website through a remote lead-scanning service.",
    long_about = None
)]
struct Cli {
    /// Website URL or bare domain to scan. If omitted, nothing is scanned.
    target: Option<String>,

    /// Backend origin. Overrides LEAD_SCAN_ORIGIN.
    #[arg(long)]
    origin: Option<String>,

    /// Scan mode: fast, deep or bulk.
    #[arg(long, default_value = "fast")]
    mode: ScanMode,

    /// Fast-scan endpoint the backend exposes: scan-website or scrape. Overrides LEAD_SCAN_FAST_ENDPOINT.
    #[arg(long = "fast-endpoint")]
    fast_endpoint: Option<FastEndpoint>,

    /// Request key for deep search: domain or url. Overrides LEAD_SCAN_DEEP_KEY.
    #[arg(long = "deep-key")]
    deep_key: Option<TargetKey>,

    /// Client-side request timeout in milliseconds (default: none).
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Write the final view as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Copy the found emails to the clipboard (OSC 52).
    #[arg(long, default_value_t = false)]
    copy: bool,

    /// Start the embedded HTTP UI server.
    #[arg(long = "serve-ui", default_value_t = false)]
    serve_ui: bool,

    /// Address for the embedded UI.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lead_scan_rs=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    println!("lead-scan-rs configuration:");
    println!("  origin        : {}", cfg.origin);
    println!("  mode          : {}", cli.mode);
    println!("  fast_endpoint : {}", cfg.fast_endpoint);
    println!("  deep_key      : {}", cfg.deep_key.as_str());
    println!(
        "  timeout       : {}",
        cfg.timeout
            .map(|t| humantime::format_duration(t).to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );
    println!(
        "  output        : {}",
        cli.output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );
    println!("  serve_ui      : {}", cli.serve_ui);

    let backend = HttpBackend::new(cfg.origin.clone(), cfg.timeout)
        .context("failed to build HTTP client")?;
    let client = Arc::new(ScanClient::new(Arc::new(backend), cfg.contracts()));
    client.select_mode(cli.mode).await;

    let shutdown = CancellationToken::new();
    let server_task = if cli.serve_ui {
        let bind = cli.bind.clone();
        let client = client.clone();
        let token = shutdown.clone();
        println!("UI server starting at http://{} (Ctrl+C to stop)", bind);
        Some(tokio::spawn(async move {
            if let Err(e) = server::spawn_server(&bind, client, token).await {
                tracing::error!("HTTP UI server error: {e:#}");
            }
        }))
    } else {
        None
    };

    if let Some(target) = cli.target.as_deref() {
        client.set_target(target).await;
        let result = client.submit().await;
        let snap = client.snapshot().await;
        match result {
            SubmitResult::Skipped(SkipReason::EmptyTarget) => {
                println!("\nNothing to scan: target is empty.");
            }
            _ => println!("\n{}", render::render_snapshot(&snap)),
        }

        if cli.copy {
            copy_emails(&client, &snap).await;
        }
        if let Some(path) = cli.output.as_deref() {
            write_snapshot_json(path, &client.snapshot().await)
                .with_context(|| format!("failed to write JSON to {}", path.display()))?;
            println!("Wrote JSON results to {}", path.display());
        }
    } else if cli.mode == ScanMode::Bulk {
        println!("\n{}", render::render_snapshot(&client.snapshot().await));
    }

    if let Some(task) = server_task {
        println!("Press Ctrl+C to stop the server...");
        let _ = tokio::signal::ctrl_c().await;
        shutdown.cancel();
        let _ = task.await;
    }

    Ok(())
}

/// Environment first, CLI flags on top.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = Config::from_env().context("invalid environment configuration")?;
    if let Some(origin) = cli.origin.as_deref() {
        cfg.origin = config::normalize_origin(origin)?;
    }
    if let Some(fast) = cli.fast_endpoint {
        cfg.fast_endpoint = fast;
    }
    if let Some(key) = cli.deep_key {
        cfg.deep_key = key;
    }
    if let Some(ms) = cli.timeout_ms {
        cfg.timeout = Some(std::time::Duration::from_millis(ms));
    }
    Ok(cfg)
}

async fn copy_emails(client: &ScanClient, snap: &ViewSnapshot) {
    let ScanState::Success { view } = &snap.state else {
        return;
    };
    let emails = view.outcome.emails();
    if emails.is_empty() {
        return;
    }
    match client.copy_to_clipboard(&emails.join("\n")).await {
        Ok(()) => println!("Copied {} email(s) to the clipboard.", emails.len()),
        Err(e) => eprintln!("Failed to copy to clipboard: {e}"),
    }
}

fn write_snapshot_json(path: &std::path::Path, snap: &ViewSnapshot) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snap)?;
    Ok(())
}
