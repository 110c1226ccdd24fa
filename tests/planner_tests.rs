//! Planner integration tests
//!
//! Scenario coverage for admissibility, selection order, the recovery
//! policy, and the full-coverage guarantee.

use itinerary_planner::crowd;
use itinerary_planner::place::{Day, Place, TravelLeg};
use itinerary_planner::planner::{plan, LeaveReason, PlanOptions, PlanResult};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Builder for test places with sensible defaults.
#[derive(Clone)]
struct TestPlace(Place);

fn place(name: &str) -> TestPlace {
    TestPlace(Place::new(name))
}

impl TestPlace {
    fn open(mut self, opening: u8, closing: u8) -> Self {
        self.0.opening_time = Some(opening);
        self.0.closing_time = Some(closing);
        self
    }

    fn footfall(mut self, day: Day, entries: &[(u8, u8)]) -> Self {
        self.0.footfall.insert(day, entries.iter().copied().collect());
        self
    }

    fn leg(mut self, to: &str, minutes: f64) -> Self {
        self.0.travel.insert(
            to.to_string(),
            TravelLeg {
                distance_km: minutes / 3.0,
                minutes,
            },
        );
        self
    }

    fn build(self) -> Place {
        self.0
    }
}

fn build(places: Vec<TestPlace>) -> Vec<Place> {
    places.into_iter().map(TestPlace::build).collect()
}

fn run(places: &[Place], start_hour: u8) -> PlanResult {
    plan(places, Day::Saturday, start_hour, &PlanOptions::default())
}

fn visit_order(result: &PlanResult) -> Vec<&str> {
    result.visits.iter().map(|v| v.place.as_str()).collect()
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_picks_least_busy_first() {
    let places = build(vec![
        place("busy").open(9, 21).footfall(Day::Saturday, &[(9, 60)]),
        place("quiet").open(9, 21).footfall(Day::Saturday, &[(9, 20)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(visit_order(&result)[0], "quiet");
}

#[test]
fn test_tie_prefers_first_listed() {
    let places = build(vec![
        place("first").open(9, 21).footfall(Day::Saturday, &[(9, 30)]),
        place("second").open(9, 21).footfall(Day::Saturday, &[(9, 30)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(visit_order(&result)[0], "first");
}

#[test]
fn test_example_scenario_three_places() {
    // A open 9-21 at 20%, B open 9-21 at 60%, C open 10-18 at 30% (within
    // the lookahead window at hour 9, falling back to its earliest key).
    let places = build(vec![
        place("A").open(9, 21).footfall(Day::Saturday, &[(9, 20)]),
        place("B").open(9, 21).footfall(Day::Saturday, &[(9, 60)]),
        place("C").open(10, 18).footfall(Day::Saturday, &[(10, 30)]),
    ]);

    let result = run(&places, 9);
    let order = visit_order(&result);
    assert_eq!(order, vec!["A", "C", "B"]);
    assert!(result.skipped_places.is_empty());
    for visit in &result.visits {
        assert_eq!(visit.reason_for_leaving, LeaveReason::PlannedStayCompleted);
    }
}

// ============================================================================
// Admissibility
// ============================================================================

#[test]
fn test_lookahead_admits_place_opening_soon() {
    let places = build(vec![
        place("later").open(10, 18).footfall(Day::Saturday, &[(10, 30)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(result.visits.len(), 1);
    // Admitted before opening; arrival is the current simulated hour.
    assert_eq!(result.visits[0].arrival_time, 9.0);
}

#[test]
fn test_unconstrained_place_always_schedulable() {
    let places = build(vec![place("popup").footfall(Day::Saturday, &[(0, 10)])]);

    let result = run(&places, 3);
    assert_eq!(result.visits.len(), 1);
    assert_eq!(result.visits[0].arrival_time, 3.0);
    assert_eq!(
        result.visits[0].reason_for_leaving,
        LeaveReason::PlannedStayCompleted
    );
}

#[test]
fn test_24h_place_open_past_midnight_hours() {
    let places = build(vec![
        place("diner").open(5, 0).footfall(Day::Saturday, &[(0, 90)]),
        place("bar").open(9, 21).footfall(Day::Saturday, &[(9, 10)]),
    ]);

    let result = run(&places, 20);
    let order = visit_order(&result);
    assert_eq!(order, vec!["bar", "diner"]);

    // 20 + 1h stay + 30min default travel = 21.5; the 24h sentinel keeps
    // the diner admissible no matter how late it gets.
    let diner = &result.visits[1];
    assert_eq!(diner.arrival_time, 21.5);
    assert_eq!(diner.reason_for_leaving, LeaveReason::PlannedStayCompleted);
}

// ============================================================================
// Closing-time tagging
// ============================================================================

#[test]
fn test_closing_time_reason() {
    let places = build(vec![
        place("closing-soon").open(9, 10).footfall(Day::Saturday, &[(9, 20)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(
        result.visits[0].reason_for_leaving,
        LeaveReason::ClosingTimeReached
    );
    assert_eq!(result.visits[0].leave_time, 10.0);
}

#[test]
fn test_planned_stay_when_leaving_before_close() {
    let places = build(vec![
        place("open-late").open(9, 21).footfall(Day::Saturday, &[(9, 20)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(
        result.visits[0].reason_for_leaving,
        LeaveReason::PlannedStayCompleted
    );
}

// ============================================================================
// Travel
// ============================================================================

#[test]
fn test_missing_travel_leg_defaults_to_half_hour() {
    let places = build(vec![
        place("a").open(9, 21).footfall(Day::Saturday, &[(9, 10)]),
        place("b").open(9, 21).footfall(Day::Saturday, &[(9, 50)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(visit_order(&result), vec!["a", "b"]);
    assert_eq!(result.visits[0].leave_time, 10.0);
    assert_eq!(result.visits[1].arrival_time, 10.5);
}

#[test]
fn test_travel_leg_advances_clock() {
    let places = build(vec![
        place("a")
            .open(9, 21)
            .footfall(Day::Saturday, &[(9, 10)])
            .leg("b", 12.0),
        place("b").open(9, 21).footfall(Day::Saturday, &[(9, 50)]),
    ]);

    let result = run(&places, 9);
    // 10.0 leave + 12/60 h = 10.2
    assert_eq!(result.visits[1].arrival_time, 10.2);
}

#[test]
fn test_clock_advances_by_nearest_leg() {
    // The travel selector picks the shortest leg out of "a" even though the
    // crowd selector then decides which admissible place is actually next.
    let places = build(vec![
        place("a")
            .open(9, 21)
            .footfall(Day::Saturday, &[(9, 10)])
            .leg("b", 6.0)
            .leg("c", 60.0),
        place("b").open(9, 21).footfall(Day::Saturday, &[(9, 40)]),
        place("c").open(9, 21).footfall(Day::Saturday, &[(9, 40)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(result.visits[0].leave_time, 10.0);
    assert_eq!(result.visits[1].arrival_time, 10.1);
}

// ============================================================================
// Recovery policy
// ============================================================================

#[test]
fn test_fast_forward_to_next_opening() {
    let places = build(vec![
        place("morning").open(9, 21).footfall(Day::Saturday, &[(9, 10)]),
        place("evening").open(15, 18).footfall(Day::Saturday, &[(15, 30)]),
    ]);

    let result = run(&places, 9);
    assert_eq!(visit_order(&result), vec!["morning", "evening"]);
    assert_eq!(result.visits[1].arrival_time, 15.0);
    assert_eq!(
        result.visits[1].reason_for_leaving,
        LeaveReason::PlannedStayCompleted
    );
}

#[test]
fn test_force_admit_when_nothing_opens_ahead() {
    let places = build(vec![
        place("closed").open(9, 12).footfall(Day::Saturday, &[(9, 20)]),
    ]);

    let result = run(&places, 13);
    assert_eq!(result.visits.len(), 1);
    assert_eq!(result.visits[0].arrival_time, 13.0);
    assert_eq!(
        result.visits[0].reason_for_leaving,
        LeaveReason::ClosingTimeReached
    );
    assert!(result.skipped_places.is_empty());
}

#[test]
fn test_completion_pass_covers_leftovers() {
    let places = build(vec![
        place("a").open(9, 21),
        place("b").open(9, 21),
        place("c").open(9, 21),
    ]);

    // Cap at zero so the loop schedules nothing and the completion pass
    // has to cover everything.
    let options = PlanOptions {
        iteration_cap: 0,
        ..PlanOptions::default()
    };
    let result = plan(&places, Day::Saturday, 9, &options);

    assert_eq!(visit_order(&result), vec!["a", "b", "c"]);
    let arrivals: Vec<f64> = result.visits.iter().map(|v| v.arrival_time).collect();
    assert_eq!(arrivals, vec![9.0, 9.5, 10.0]);
    for visit in &result.visits {
        assert_eq!(
            visit.reason_for_leaving,
            LeaveReason::IncludedToCompleteItinerary
        );
    }
}

// ============================================================================
// Coverage and rounding guarantees
// ============================================================================

#[test]
fn test_every_place_scheduled_exactly_once() {
    let places = build(vec![
        place("open").open(9, 21).footfall(Day::Saturday, &[(9, 20)]),
        place("unconstrained"),
        place("closed-all-day").open(2, 4),
        place("no-footfall").open(9, 21),
        place("night-owl").open(22, 0),
    ]);

    let result = run(&places, 9);
    let mut order = visit_order(&result);
    assert_eq!(order.len(), places.len());
    order.sort();
    order.dedup();
    assert_eq!(order.len(), places.len(), "no duplicates");
    assert!(result.skipped_places.is_empty());
}

#[test]
fn test_all_hours_are_tenth_multiples() {
    let places = build(vec![
        place("a")
            .open(9, 21)
            .footfall(Day::Saturday, &[(9, 10)])
            .leg("b", 7.0)
            .leg("c", 11.0),
        place("b")
            .open(9, 21)
            .footfall(Day::Saturday, &[(9, 20)])
            .leg("c", 13.0),
        place("c").open(9, 21).footfall(Day::Saturday, &[(9, 30)]),
    ]);

    let options = PlanOptions {
        stay_duration: 0.7,
        ..PlanOptions::default()
    };
    let result = plan(&places, Day::Saturday, 9, &options);

    for visit in &result.visits {
        for hour in [visit.arrival_time, visit.leave_time] {
            let scaled = hour * 10.0;
            assert!(
                (scaled - scaled.round()).abs() < 1e-6,
                "{} is not a multiple of 0.1",
                hour
            );
        }
    }
}

#[test]
fn test_selection_is_crowd_monotone() {
    // At the first step the chosen place must be no busier than any other
    // admissible place at that hour.
    let places = build(vec![
        place("a").open(9, 21).footfall(Day::Saturday, &[(9, 45)]),
        place("b").open(9, 21).footfall(Day::Saturday, &[(9, 15)]),
        place("c").open(9, 21).footfall(Day::Saturday, &[(9, 30)]),
    ]);

    let result = run(&places, 9);
    let first = &result.visits[0];
    assert_eq!(first.place, "b");
    for place in &places {
        assert!(
            first.footfall_at_arrival <= crowd::busyness(place, Day::Saturday, 9.0),
            "{} was less crowded at the start hour",
            place.name
        );
    }
}
