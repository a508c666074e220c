use super::*;
use chrono::TimeZone;

// ==================== Helper functions ====================

const WINDOW_SECS: i64 = 5;
const BEFORE_BREAK_SECS: i64 = 30;
const BREAK_SECS: i64 = 60;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::seconds(secs)
}

fn confirmed(visible: bool, changed_at_secs: i64) -> ConfirmedTransition {
    ConfirmedTransition {
        visible,
        changed_at: at(changed_at_secs),
    }
}

fn scheduler() -> BreakScheduler {
    BreakScheduler::new(
        Duration::seconds(BEFORE_BREAK_SECS),
        Duration::seconds(BREAK_SECS),
        at(0),
    )
}

/// Eyes present from t=0, break owed since t=31
fn scheduler_owing_break() -> BreakScheduler {
    let mut s = scheduler();
    s.evaluate(at(WINDOW_SECS), Some(confirmed(true, 0)));
    assert_eq!(s.evaluate(at(31), None), Some(BreakEvent::BreakOwed));
    assert_eq!(s.state(), BreakState::NeedBreak);
    s
}

/// Break owed, eyes confirmed gone at t=100
fn scheduler_in_break() -> BreakScheduler {
    let mut s = scheduler_owing_break();
    let event = s.evaluate(at(100 + WINDOW_SECS), Some(confirmed(false, 100)));
    assert_eq!(
        event,
        Some(BreakEvent::BreakStarted {
            started_at: at(100),
            detected_after: Duration::seconds(WINDOW_SECS),
        })
    );
    s
}

// ==================== BreakState ====================

#[test]
fn test_break_state_flags() {
    assert!(!BreakState::Idle.need_break());
    assert!(!BreakState::Idle.in_break());
    assert!(BreakState::NeedBreak.need_break());
    assert!(!BreakState::NeedBreak.in_break());
    assert!(BreakState::InBreak { owed: true }.need_break());
    assert!(BreakState::InBreak { owed: true }.in_break());
    assert!(!BreakState::InBreak { owed: false }.need_break());
    assert!(BreakState::InBreak { owed: false }.in_break());
}

#[test]
fn test_break_state_descriptions() {
    assert_eq!(BreakState::Idle.description(), "Working");
    assert_eq!(BreakState::NeedBreak.description(), "Break needed");
    assert_eq!(BreakState::InBreak { owed: true }.description(), "On break");
}

// ==================== Break owed ====================

#[test]
fn test_starts_idle_with_eyes_absent() {
    let s = scheduler();
    assert_eq!(s.state(), BreakState::Idle);
    assert!(!s.eyes_present());
    assert_eq!(s.last_break(), at(0));
}

#[test]
fn test_break_owed_exactly_once_under_continuous_presence() {
    let mut s = scheduler();
    s.evaluate(at(WINDOW_SECS), Some(confirmed(true, 0)));

    let mut owed_events = 0;
    for tick in WINDOW_SECS + 1..=600 {
        let event = s.evaluate(at(tick), None);
        if event == Some(BreakEvent::BreakOwed) {
            owed_events += 1;
            assert_eq!(tick, BEFORE_BREAK_SECS + 1);
        }
        if tick > BEFORE_BREAK_SECS {
            assert!(s.needs_break());
        } else {
            assert!(!s.needs_break());
        }
    }
    assert_eq!(owed_events, 1);
}

#[test]
fn test_break_not_owed_at_exact_threshold() {
    let mut s = scheduler();
    s.evaluate(at(WINDOW_SECS), Some(confirmed(true, 0)));
    assert_eq!(s.evaluate(at(BEFORE_BREAK_SECS), None), None);
    assert!(!s.needs_break());
}

#[test]
fn test_break_never_owed_while_absent() {
    let mut s = scheduler();
    for tick in 0..600 {
        assert_eq!(s.evaluate(at(tick), None), None);
    }
    assert_eq!(s.state(), BreakState::Idle);
}

// ==================== Break via transition ====================

#[test]
fn test_break_starts_when_eyes_leave_while_owed() {
    let s = scheduler_in_break();
    assert_eq!(s.state(), BreakState::InBreak { owed: true });
    assert_eq!(s.last_break(), at(100));
    assert!(!s.eyes_present());
}

#[test]
fn test_eyes_leaving_without_owed_break_is_not_a_break() {
    let mut s = scheduler();
    s.evaluate(at(WINDOW_SECS), Some(confirmed(true, 0)));
    assert_eq!(s.evaluate(at(15), Some(confirmed(false, 10))), None);
    assert_eq!(s.state(), BreakState::Idle);
    assert_eq!(s.last_break(), at(0));
}

#[test]
fn test_long_enough_break_is_satisfied_on_return() {
    let mut s = scheduler_in_break();
    let back = 100 + BREAK_SECS + 1;

    let event = s.evaluate(at(back + WINDOW_SECS), Some(confirmed(true, back)));
    assert_eq!(
        event,
        Some(BreakEvent::BreakCompleted {
            duration: Duration::seconds(BREAK_SECS + 1)
        })
    );
    assert_eq!(s.state(), BreakState::Idle);
    assert!(!s.in_break());
    assert!(!s.needs_break());
    // Reset to the evaluation time, not to the moment the eyes came back
    assert_eq!(s.last_break(), at(back + WINDOW_SECS));
}

#[test]
fn test_break_of_exactly_break_time_counts() {
    let mut s = scheduler_in_break();
    let back = 100 + BREAK_SECS;
    s.evaluate(at(back + WINDOW_SECS), Some(confirmed(true, back)));
    assert_eq!(s.state(), BreakState::Idle);
}

#[test]
fn test_short_break_keeps_break_owed() {
    let mut s = scheduler_in_break();
    let back = 100 + BREAK_SECS / 2;

    let event = s.evaluate(at(back + WINDOW_SECS), Some(confirmed(true, back)));
    assert_eq!(
        event,
        Some(BreakEvent::BreakTooShort {
            duration: Duration::seconds(BREAK_SECS / 2),
            required: Duration::seconds(BREAK_SECS),
            still_owed: true,
        })
    );
    assert!(!s.in_break());
    assert!(s.needs_break());
    assert_eq!(s.last_break(), at(100));
}

#[test]
fn test_new_break_after_short_one() {
    let mut s = scheduler_in_break();
    s.evaluate(at(140), Some(confirmed(true, 135)));
    assert_eq!(s.state(), BreakState::NeedBreak);

    s.evaluate(at(205), Some(confirmed(false, 200)));
    assert_eq!(s.state(), BreakState::InBreak { owed: true });
    assert_eq!(s.last_break(), at(200));
}

// ==================== Passive satisfaction ====================

#[test]
fn test_break_satisfied_while_eyes_stay_away() {
    let mut s = scheduler_in_break();

    for tick in 106..100 + BREAK_SECS {
        assert_eq!(s.evaluate(at(tick), None), None);
        assert!(s.needs_break());
    }

    assert_eq!(
        s.evaluate(at(100 + BREAK_SECS), None),
        Some(BreakEvent::BreakSatisfiedWhileAway)
    );
    assert!(!s.needs_break());
    assert!(s.in_break());

    // Reported once, state stays put
    assert_eq!(s.evaluate(at(100 + BREAK_SECS + 1), None), None);
    assert_eq!(s.state(), BreakState::InBreak { owed: false });
}

#[test]
fn test_return_after_passive_satisfaction_resets_timer() {
    let mut s = scheduler_in_break();
    s.evaluate(at(200), None);
    assert_eq!(s.state(), BreakState::InBreak { owed: false });

    let event = s.evaluate(at(305), Some(confirmed(true, 300)));
    assert!(matches!(event, Some(BreakEvent::BreakCompleted { .. })));
    assert_eq!(s.state(), BreakState::Idle);
    assert_eq!(s.last_break(), at(305));
}

#[test]
fn test_early_return_after_passive_satisfaction_is_not_owed() {
    let mut s = scheduler_in_break();
    assert_eq!(
        s.evaluate(at(100 + BREAK_SECS), None),
        Some(BreakEvent::BreakSatisfiedWhileAway)
    );

    // Return attributed to before the passive check fired
    let back = 100 + BREAK_SECS - 4;
    let event = s
        .evaluate(at(back + WINDOW_SECS), Some(confirmed(true, back)))
        .unwrap();
    assert_eq!(
        event,
        BreakEvent::BreakTooShort {
            duration: Duration::seconds(BREAK_SECS - 4),
            required: Duration::seconds(BREAK_SECS),
            still_owed: false,
        }
    );
    assert_eq!(s.state(), BreakState::Idle);
    assert!(!s.needs_break());
    assert_eq!(
        event.to_string(),
        "Welcome back, break time was already satisfied"
    );
}

#[test]
fn test_transition_tick_skips_steady_checks() {
    let mut s = scheduler();
    s.evaluate(at(WINDOW_SECS), Some(confirmed(true, 0)));

    // A transition that does not affect break state still consumes the tick
    assert_eq!(s.evaluate(at(45), Some(confirmed(true, 40))), None);
    assert!(!s.needs_break());
    assert_eq!(s.evaluate(at(46), None), Some(BreakEvent::BreakOwed));
}

// ==================== Clock regression ====================

#[test]
fn test_clock_regression_never_satisfies_conditions() {
    let mut s = scheduler_in_break();
    assert_eq!(s.evaluate(at(50), None), None);
    assert!(s.needs_break());

    let event = s.evaluate(at(60), Some(confirmed(true, 55)));
    assert!(matches!(event, Some(BreakEvent::BreakTooShort { .. })));
    assert!(s.needs_break());
}

#[test]
fn test_event_messages() {
    assert_eq!(BreakEvent::BreakOwed.to_string(), "Time for a break!");
    assert_eq!(
        BreakEvent::BreakStarted {
            started_at: at(0),
            detected_after: Duration::seconds(5)
        }
        .to_string(),
        "Break started 5 seconds ago"
    );
    assert_eq!(
        BreakEvent::BreakTooShort {
            duration: Duration::seconds(-3),
            required: Duration::seconds(60),
            still_owed: true,
        }
        .to_string(),
        "Break wasn't long enough (0s of 60s)! Break is still needed"
    );
}
