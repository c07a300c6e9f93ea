//! Scheduler behaviour over simulated days, driven through the public API.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use mydns_sync::next_midnight;
use mydns_sync::scheduler::{ManualClock, ScheduleEngine, TimeSource};
use std::time::Duration;

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Jump the clock to the armed wake time, as a real alarm would.
fn ring<E>(engine: &mut ScheduleEngine<ManualClock, E>, clock: &ManualClock) -> Vec<E> {
    if let Some(wake_at) = engine.alarm().wake_at() {
        if wake_at > clock.now() {
            clock.set(wake_at);
        }
    }
    engine.take_due().into_iter().map(|e| e.payload).collect()
}

#[test]
fn daily_reschedule_fires_once_per_day() {
    let clock = ManualClock::new(day(1) + ChronoDuration::hours(9));
    let mut engine = ScheduleEngine::new(clock.clone());
    engine.schedule(next_midnight(clock.now()), "daily");

    let mut fired_on = Vec::new();
    for _ in 0..7 {
        for payload in ring(&mut engine, &clock) {
            fired_on.push(clock.now());
            engine.schedule(next_midnight(clock.now()), payload);
        }
        assert_eq!(engine.len(), 1, "exactly one pending entry");
    }

    let expected: Vec<_> = (2..=8).map(day).collect();
    assert_eq!(fired_on, expected);
}

#[test]
fn daylight_saving_style_jump_fires_both_overdue_entries() {
    let clock = ManualClock::new(day(1));
    let mut engine = ScheduleEngine::new(clock.clone());
    engine.schedule(day(1) + ChronoDuration::minutes(150), "02:30");
    engine.schedule(day(1) + ChronoDuration::minutes(200), "03:20");
    engine.schedule(day(1) + ChronoDuration::hours(6), "06:00");

    // Wall clock skips from 02:00 to 03:30.
    clock.set(day(1) + ChronoDuration::minutes(210));
    engine.on_clock_changed();
    assert_eq!(clock.armed_delay(), Some(Duration::ZERO));

    assert_eq!(engine.take_due().len(), 2);
    assert_eq!(engine.next_due(), Some(day(1) + ChronoDuration::hours(6)));
    assert_eq!(clock.armed_delay(), Some(Duration::from_secs(150 * 60)));
}

#[test]
fn backward_jump_delays_firing_until_wall_clock_catches_up() {
    let clock = ManualClock::new(day(1) + ChronoDuration::hours(23));
    let mut engine = ScheduleEngine::new(clock.clone());
    engine.schedule(day(2), "midnight");

    clock.set(day(1) + ChronoDuration::hours(20));
    engine.on_clock_changed();
    assert_eq!(clock.armed_delay(), Some(Duration::from_secs(4 * 3600)));

    // The old one-hour alarm rings anyway.
    assert!(engine.take_due().is_empty());
    assert_eq!(engine.len(), 1);

    assert_eq!(ring(&mut engine, &clock), vec!["midnight"]);
    assert!(!engine.alarm().is_armed());
}

#[test]
fn mixed_payloads_keep_stable_order() {
    #[derive(Debug, PartialEq)]
    enum Job {
        Check(u32),
        Report,
    }

    let clock = ManualClock::new(day(1));
    let mut engine = ScheduleEngine::new(clock.clone());
    engine.schedule(day(2), Job::Check(1));
    engine.schedule(day(3), Job::Report);
    engine.schedule(day(2), Job::Check(2));
    let cancelled = engine.schedule(day(2), Job::Check(3));
    engine.schedule(day(2), Job::Check(4));

    assert_eq!(engine.cancel(cancelled), Some(Job::Check(3)));

    clock.set(day(3));
    let mut fired = Vec::new();
    let count = engine.on_alarm_fired(|entry| {
        fired.push(entry.payload);
        Ok::<(), std::convert::Infallible>(())
    });

    assert_eq!(count, 4);
    assert_eq!(
        fired,
        vec![Job::Check(1), Job::Check(2), Job::Check(4), Job::Report]
    );
    assert!(engine.is_empty());
}
