//! dirspace - incremental disk usage analyzer.
//!
//! Usage:
//!   dirspace [PATH]              Scan a directory and print the size tree
//!   dirspace [PATH] --json       Dump the final snapshot as JSON
//!   dirspace --help              Show help
//!
//! Press Ctrl-C during a scan to cancel it; the partial result scanned so
//! far is printed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use humansize::{DECIMAL, format_size};
use tracing_subscriber::EnvFilter;

use dirspace_core::{Entity, ScanStats};
use dirspace_scan::{ScanConfig, ScanController, ScanEvent, ScanSnapshot, ScanStatus, SkipRules};

#[derive(Parser)]
#[command(
    name = "dirspace",
    version,
    about = "Incremental disk usage analyzer",
    long_about = "dirspace scans a directory subtree and shows where the bytes go.\n\n\
                  Progress is reported while the scan runs; Ctrl-C cancels and \
                  prints the partial result."
)]
struct Cli {
    /// Path to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Exclude hidden entries (names starting with '.')
    #[arg(long)]
    no_hidden: bool,

    /// Entry names to skip entirely (repeatable)
    #[arg(long = "skip", value_name = "NAME")]
    skip_names: Vec<String>,

    /// Maximum tree depth to display
    #[arg(short, long, default_value = "3")]
    depth: u32,

    /// Number of entries to show per directory
    #[arg(short = 'n', long, default_value = "10")]
    top: usize,

    /// Print the final snapshot as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut builder = ScanConfig::builder();
    builder.root(&cli.path).include_hidden(!cli.no_hidden);
    if !cli.skip_names.is_empty() {
        builder.skip(Some(SkipRules::names(cli.skip_names.clone())));
    }
    let config = builder.build().map_err(|e| eyre!("{e}"))?;

    let controller = Arc::new(ScanController::new());
    let mut events = controller.subscribe();

    let canceller = Arc::clone(&controller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ncancelling...");
            canceller.stop();
        }
    });

    let mut status_rx = controller.watch_status();
    controller.start(config)?;

    // With an inaccessible root and no interactive permission provider the
    // controller stays Idle; surface that instead of waiting forever.
    let launched = tokio::time::timeout(
        Duration::from_millis(500),
        status_rx.wait_for(|s| *s != ScanStatus::Idle),
    )
    .await;
    if launched.is_err() {
        return Err(eyre!("cannot read {}: access was not granted", cli.path.display()));
    }

    let mut latest: Option<ScanSnapshot> = None;
    let mut terminal = ScanStatus::Idle;
    loop {
        match events.recv().await {
            Ok(ScanEvent::Snapshot(snapshot)) => {
                print_progress(&snapshot.stats);
                latest = Some(snapshot);
            }
            Ok(ScanEvent::Status(status)) if status.is_terminal() => {
                terminal = status;
                break;
            }
            Ok(ScanEvent::Status(_)) => {}
            Err(_) => break,
        }
    }

    // A cancelled scan publishes its final snapshot after the status flips
    if terminal == ScanStatus::Cancelled {
        while let Ok(Ok(event)) =
            tokio::time::timeout(Duration::from_millis(500), events.recv()).await
        {
            if let ScanEvent::Snapshot(snapshot) = event {
                latest = Some(snapshot);
            }
        }
    }

    eprintln!();
    match terminal {
        ScanStatus::Completed => {}
        ScanStatus::Cancelled => eprintln!("scan cancelled, showing partial result"),
        ScanStatus::Failed => return Err(eyre!("scan failed: {}", cli.path.display())),
        // NoPrompt declined an inaccessible root
        _ => return Err(eyre!("cannot read {}", cli.path.display())),
    }

    let Some(snapshot) = latest else {
        return Err(eyre!("no snapshot received"));
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        render_snapshot(snapshot, cli.depth, cli.top);
    }

    Ok(())
}

fn print_progress(stats: &ScanStats) {
    eprint!(
        "\rscanned {} in {} entities ({} folders, {} files), {}  ",
        format_size(stats.total_size, DECIMAL),
        stats.entity_count,
        stats.folder_count,
        stats.file_count,
        format_duration(stats.duration),
    );
}

fn render_snapshot(mut snapshot: ScanSnapshot, max_depth: u32, top: usize) {
    snapshot.tree.sort_children_by_size();

    println!(
        "{}  {}",
        format_size(snapshot.tree.size, DECIMAL),
        snapshot.tree.path.display()
    );
    print_children(&snapshot.tree, 1, max_depth, top);

    let stats = &snapshot.stats;
    println!(
        "\n{} in {} files, {} folders ({})",
        format_size(stats.total_size, DECIMAL),
        stats.file_count,
        stats.folder_count,
        format_duration(stats.duration),
    );
}

fn print_children(entity: &Entity, depth: u32, max_depth: u32, top: usize) {
    if depth > max_depth {
        return;
    }
    let shown = entity.children.iter().take(top);
    let hidden = entity.child_count().saturating_sub(top);

    for child in shown {
        let indent = "  ".repeat(depth as usize);
        let marker = if child.is_dir() { "/" } else { "" };
        println!(
            "{indent}{:>10}  {}{marker}",
            format_size(child.size, DECIMAL),
            child.name
        );
        print_children(child, depth + 1, max_depth, top);
    }
    if hidden > 0 {
        let indent = "  ".repeat(depth as usize);
        println!("{indent}... {hidden} more");
    }
}

fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dirspace=debug,dirspace_scan=debug,warn")
    } else {
        EnvFilter::new("dirspace=info,dirspace_scan=warn,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
