//! Simulate command: drives a scenario's registrants for a number of frames

use crate::demo::{DemoRegistrant, RegistrantReport, Tally};
use crate::scenario::Scenario;
use anyhow::{Context, Result};
use cadence_core::Seconds;
use cadence_runtime::{FrameDriver, PhaseFailure};
use cadence_sched::{Phase, TickStats, Updatable};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::info;

pub struct SimulateArgs {
    pub scenario: String,
    pub frames: u64,
    pub dt: Seconds,
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct LiveCounts {
    pub fixed_update: usize,
    pub update: usize,
    pub late_update: usize,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub simulated_seconds: Seconds,
    pub fixed_steps: u64,
    pub fixed: TickStats,
    pub update: TickStats,
    pub late: TickStats,
    pub failures: Vec<PhaseFailure>,
    pub live: LiveCounts,
    pub registrants: BTreeMap<String, RegistrantReport>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let report = simulate(&scenario, args.frames, args.dt)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }
    Ok(())
}

/// Run `frames` frames of `dt` seconds each and collect the results
pub fn simulate(scenario: &Scenario, frames: u64, dt: Seconds) -> Result<SimulationReport> {
    let mut driver = FrameDriver::new(&scenario.runtime).context("Invalid runtime config")?;
    let tally: Tally = Rc::new(RefCell::new(BTreeMap::new()));

    // Keep the handles alive for the whole run; dropping one deregisters it.
    let mut handles = Vec::with_capacity(scenario.registrants.len());
    for entry in &scenario.registrants {
        let registrant =
            DemoRegistrant::spawn(entry.name.clone(), entry.phase, entry.behavior.clone(), &tally);
        let scheduler = driver.phases().get(entry.phase);
        let handle = Updatable::from_registrant(scheduler, registrant, entry.token_config())
            .with_context(|| format!("Failed to register '{}'", entry.name))?;
        handles.push(handle);
    }
    let registered = driver.phases().flush_all();
    info!(registered, frames, dt, "starting simulation");

    let mut fixed = TickStats::default();
    let mut update = TickStats::default();
    let mut late = TickStats::default();
    let mut fixed_steps = 0u64;
    let mut failures = Vec::new();

    for _ in 0..frames {
        let stats = driver.step(dt)?;
        fixed_steps += u64::from(stats.fixed_steps);
        fixed.merge(stats.fixed);
        update.merge(stats.update);
        late.merge(stats.late);
        failures.extend(stats.failures);
    }

    let phases = driver.phases();
    let live = LiveCounts {
        fixed_update: phases.get(Phase::FixedUpdate).len(),
        update: phases.get(Phase::Update).len(),
        late_update: phases.get(Phase::LateUpdate).len(),
    };
    info!(
        frames,
        failures = failures.len(),
        live = phases.len(),
        "simulation finished"
    );

    let registrants = tally.borrow().clone();
    Ok(SimulationReport {
        frames,
        simulated_seconds: driver.clock().total_time,
        fixed_steps,
        fixed,
        update,
        late,
        failures,
        live,
        registrants,
    })
}

fn print_text(report: &SimulationReport) {
    println!(
        "Simulated {} frames ({:.2}s), {} fixed steps",
        report.frames, report.simulated_seconds, report.fixed_steps
    );
    println!(
        "Invocations: fixed={} update={} late={}",
        report.fixed.invoked, report.update.invoked, report.late.invoked
    );
    println!(
        "Live registrants: fixed={} update={} late={}",
        report.live.fixed_update, report.live.update, report.live.late_update
    );
    println!("Failed ticks: {}", report.failures.len());
    println!();
    println!(
        "{:<20} {:<12} {:>11} {:>10} {:>8}  STATUS",
        "NAME", "PHASE", "INVOCATIONS", "LAST", "SPAWNED"
    );
    for (name, r) in &report.registrants {
        let last = r
            .last_invoked_at
            .map(|t| format!("{:.2}", t))
            .unwrap_or_else(|| "-".to_string());
        let status = if r.expired {
            "expired".to_string()
        } else if r.failures > 0 {
            format!("{} failures", r.failures)
        } else {
            "ok".to_string()
        };
        println!(
            "{:<20} {:<12} {:>11} {:>10} {:>8}  {}",
            name,
            r.phase.as_str(),
            r.invocations,
            last,
            r.spawned,
            status
        );
    }
}
