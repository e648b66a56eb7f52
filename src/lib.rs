// src/lib.rs

//! Background event processing engine.
//!
//! Producers on any thread [`enqueue`](engine::EventHandler::enqueue) events;
//! a single worker per engine drains them through a collaborator-supplied
//! [`EventStrategy`](engine::EventStrategy) and flushes accumulated results
//! in batches, paced by the [`dispatch`] policy. Per-event failures are
//! collected into one [`Outcome`](status::Outcome) per pass.

pub mod cli;
pub mod clock;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod event;
pub mod host;
pub mod logging;
pub mod status;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile, RawConfigFile};
use crate::demo::{CoalescingStrategy, DemoReport};
use crate::engine::{EventHandler, JobState};
use crate::event::Event;
use crate::host::{FamilyTag, TokioScheduler};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - one engine on the Tokio blocking pool
/// - N producer tasks
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let scheduler = TokioScheduler::current()?;
    let family = FamilyTag::new(format!("bgevent.demo.{}", cfg.engine.name));
    let report = DemoReport::default();
    let strategy = CoalescingStrategy::new(family.clone(), report.clone(), true);

    let mut builder = EventHandler::<u64, CoalescingStrategy>::builder(
        cfg.engine.name.clone(),
        cfg.engine.report_label.clone(),
    )
    .dispatch(cfg.dispatch_config());
    if let Some(owner) = &cfg.engine.owner {
        builder = builder.owner(owner.clone());
    }
    let engine: Arc<EventHandler<u64, CoalescingStrategy>> =
        Arc::new(builder.build(strategy, Arc::new(scheduler.clone())));

    info!(
        engine = %engine.name(),
        producers = args.producers,
        events = args.events,
        "starting producers"
    );

    let mut producers = Vec::with_capacity(args.producers);
    for producer in 0..args.producers {
        let engine = Arc::clone(&engine);
        let report = report.clone();
        let every = args.preemptive_every;
        let count = args.events;

        producers.push(tokio::spawn(async move {
            for i in 0..count {
                if every > 0 && (i + 1) % every == 0 {
                    let report = report.clone();
                    engine.queue_runnable(
                        move |_token| {
                            report.record_runnable();
                            Ok(())
                        },
                        true,
                    );
                } else {
                    engine.enqueue(Event::with_payload(producer as u32, i as u64), false);
                }
                tokio::task::yield_now().await;
            }
            debug!(producer, "producer finished");
        }));
    }

    for handle in producers {
        handle.await?;
    }

    tokio::select! {
        _ = wait_until_drained(&engine) => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            warn!("interrupted; cancelling engine family {family}");
            scheduler.cancel_family(&family);
        }
    }

    engine.shutdown();

    let batches = report.batches();
    println!();
    println!("engine:        {}", engine.name());
    println!("batches:       {}", batches.len());
    println!("events:        {}", report.events_flushed());
    println!("runnables:     {}", report.runnables_run());

    Ok(())
}

fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        return Ok(load_and_validate(path)?);
    }
    info!(path = %path.display(), "config file not found; using defaults");
    Ok(ConfigFile::try_from(RawConfigFile::default())?)
}

async fn wait_until_drained(engine: &EventHandler<u64, CoalescingStrategy>) {
    while engine.has_unprocessed_events() || engine.job_state() != JobState::Idle {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Print the effective configuration without running anything.
fn print_dry_run(cfg: &ConfigFile) {
    let d = cfg.dispatch_config();
    println!("bgevent dry-run");
    println!("  engine.name         = {}", cfg.engine.name);
    println!("  engine.report_label = {}", cfg.engine.report_label);
    if let Some(owner) = &cfg.engine.owner {
        println!("  engine.owner        = {owner}");
    }
    println!("  dispatch.short_delay          = {:?}", d.short_delay);
    println!("  dispatch.long_delay           = {:?}", d.long_delay);
    println!("  dispatch.short_cycle_threshold = {}", d.short_cycle_threshold);
    println!("  dispatch.wait_delay           = {:?}", d.wait_delay);

    debug!("dry-run complete (no engine started)");
}
