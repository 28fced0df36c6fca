// src/lib.rs

pub mod action;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod media;
pub mod vcs;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Semaphore};
use tracing::info;

use crate::action::convert::ConvertContext;
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{Runtime, RuntimeEvent};
use crate::media::{FfmpegConverter, MediaConverter};
use crate::vcs::{SvnCliClient, VcsClient};
use crate::watch::{spawn_watcher, Debouncer};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - debouncer + expiry loop
/// - file watcher
/// - dispatch runtime
/// - Ctrl-C and `q`-keypress handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    info!(
        watch_root = %cfg.paths.watch_root.display(),
        integration_root = %cfg.paths.integration_root.display(),
        publish_root = %cfg.paths.publish_root.display(),
        "starting relaywatch"
    );

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Debouncer + its single expiry task.
    let debouncer = Debouncer::new(cfg.watch.debounce_window());
    let _expiry_handle = debouncer.spawn_expiry_loop(rt_tx.clone());

    // Filesystem watcher feeding the debouncer; the handle keeps it alive.
    let _watcher_handle = spawn_watcher(&cfg.paths.watch_root, debouncer.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // `q` + Enter on the console also quits.
    spawn_quit_listener(rt_tx.clone());
    println!("Press 'q' then Enter to quit the files watcher.");

    let converter: Arc<dyn MediaConverter> = Arc::new(FfmpegConverter);
    let vcs_client: Option<Arc<dyn VcsClient>> = if cfg.svn.enabled {
        Some(Arc::new(SvnCliClient::new(
            cfg.svn.username.clone(),
            cfg.svn.password.clone(),
        )))
    } else {
        None
    };

    let convert_ctx = ConvertContext {
        publish_root: cfg.paths.publish_root.clone(),
        repo_url: cfg.svn.repo_url.clone(),
        converter,
        vcs: vcs_client,
        permits: Arc::new(Semaphore::new(cfg.watch.effective_max_conversions())),
    };

    let runtime = Runtime::new(
        cfg.paths.integration_root.clone(),
        cfg.watch.exclusion_marker.clone(),
        convert_ctx,
        rt_rx,
        rt_tx.clone(),
    );
    runtime.run().await
}

/// Read stdin on a blocking task and request shutdown when a line starting
/// with `q` arrives.
fn spawn_quit_listener(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::task::spawn_blocking(move || {
        use std::io::BufRead;

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim_start().starts_with('q') {
                let _ = tx.blocking_send(RuntimeEvent::ShutdownRequested);
                break;
            }
        }
    });
}

/// Simple dry-run output: print the effective settings without watching.
fn print_dry_run(cfg: &ConfigFile) {
    println!("relaywatch dry-run");
    println!("  paths.watch_root = {:?}", cfg.paths.watch_root);
    println!("  paths.integration_root = {:?}", cfg.paths.integration_root);
    println!("  paths.publish_root = {:?}", cfg.paths.publish_root);
    println!();

    println!("  watch.debounce_window_ms = {}", cfg.watch.debounce_window_ms);
    println!(
        "  watch.max_concurrent_conversions = {}",
        cfg.watch.effective_max_conversions()
    );
    if let Some(ref marker) = cfg.watch.exclusion_marker {
        println!("  watch.exclusion_marker = {marker:?}");
    }
    println!();

    println!("  svn.enabled = {}", cfg.svn.enabled);
    if let Some(ref url) = cfg.svn.repo_url {
        println!("  svn.repo_url = {url}");
    }
    if let Some(ref user) = cfg.svn.username {
        println!("  svn.username = {user}");
    }
}
