//! Host frame loop driving a scheduler.
//!
//! Demonstrates: build a scheduler → schedule timers, frame counters and
//! chained work → tick at 60 Hz → slow motion via time scale → shutdown.
//!
//! Run with `RUST_LOG=cadence_engine=debug` to see registration and
//! disposal events.

use std::cell::Cell;
use std::rc::Rc;

use cadence_bench::{mixed_workload, FRAME_DT};
use cadence_engine::{Delay, Schedule, Scheduler, SchedulerConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Cadence Frame Loop Example ===\n");

    let mut scheduler = Scheduler::with_config(SchedulerConfig::default()).unwrap();

    // A one-shot that schedules a follow-up from inside its callback.
    scheduler
        .schedule_after(Delay::Seconds(0.5), |s| {
            println!("  [{}] half a second in; scheduling follow-up", s.current_tick());
            s.schedule_after(Delay::Frames(30), |s| {
                println!("  [{}] follow-up fired 30 frames later", s.current_tick());
            })
            .unwrap();
        })
        .unwrap();

    // A looped heartbeat counted in real time.
    let beats = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&beats);
    let heartbeat = scheduler
        .register(
            Schedule::seconds(0.25)
                .real_time()
                .looped()
                .on_complete(move |_| counter.set(counter.get() + 1)),
        )
        .unwrap();

    mixed_workload(&mut scheduler, 1_000, 42).unwrap();

    println!("Phase 1: 60 ticks at 1x");
    for _ in 0..60 {
        scheduler.advance_one_tick(FRAME_DT);
    }
    report(&scheduler, beats.get());

    println!("\nPhase 2: 60 ticks at 0.25x");
    scheduler.set_time_scale(0.25).unwrap();
    for _ in 0..60 {
        scheduler.advance_one_tick(FRAME_DT);
    }
    report(&scheduler, beats.get());

    heartbeat.cancel(&mut scheduler);
    scheduler.shutdown();
    println!("\nShut down after tick {}", scheduler.current_tick());
}

fn report(scheduler: &Scheduler, beats: u32) {
    let m = scheduler.last_metrics();
    println!(
        "  tick={} active={} completed={} swept={} heartbeats={} took={}us",
        m.tick, m.active, m.completed, m.swept, beats, m.total_us
    );
}
