//! Habit store, check ledger, today view and statistics against in-memory ports.

mod support;

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use routinely_core::{Clock, FixedClock, HabitService, StatsEngine, TodayViewBuilder};
use routinely_domain::{
    CheckInput, CreateHabitInput, Entity, Frequency, Period, ReminderInput, RoutinelyError,
    TimingInput, UpdateHabitInput, Weekday,
};
use support::repositories::{MockCheckRepository, MockHabitRepository};

const USER: &str = "user-1";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn habit_input(name: &str) -> CreateHabitInput {
    CreateHabitInput {
        user_id: USER.to_owned(),
        name: name.to_owned(),
        category: "skincare".to_owned(),
        frequency: None,
        timings: Vec::new(),
        reminders: Vec::new(),
        period: None,
    }
}

struct Harness {
    service: Arc<HabitService>,
    checks: MockCheckRepository,
}

fn harness() -> Harness {
    let checks = MockCheckRepository::new();
    let service = Arc::new(HabitService::new(
        Arc::new(MockHabitRepository::new()),
        Arc::new(checks.clone()),
    ));
    Harness { service, checks }
}

#[tokio::test]
async fn create_habit_persists_relations() {
    let h = harness();
    let mut input = habit_input("Sunscreen");
    input.frequency = Some(Frequency::Weekly { days_of_week: vec![Weekday::Monday] });
    input.timings = vec![TimingInput::at("21:00"), TimingInput::at("08:00")];
    input.reminders = vec![ReminderInput { before_minutes: 15 }];

    let habit = h.service.create_habit(input).await.unwrap();
    let full = h.service.get_habit_by_id(&habit.id).await.unwrap();

    assert_eq!(full.habit.name, "Sunscreen");
    assert_eq!(full.timings.len(), 2);
    assert_eq!(full.timings[0].time, "08:00");
    assert_eq!(full.reminders[0].before_minutes, 15);
    assert!(full.period.is_none());
}

#[tokio::test]
async fn create_habit_rejects_too_many_timings() {
    let h = harness();
    let mut input = habit_input("Toner");
    input.timings = (0..11).map(|i| TimingInput::at(format!("{:02}:00", i + 1))).collect();

    let err = h.service.create_habit(input).await.unwrap_err();
    assert_eq!(err.code(), "invalid_input");
}

#[tokio::test]
async fn missing_habit_is_not_found() {
    let h = harness();
    let err = h.service.get_habit_by_id("nope").await.unwrap_err();
    assert_eq!(err, RoutinelyError::NotFound(Entity::Habit));
}

#[tokio::test]
async fn archive_hides_habit_and_restore_brings_it_back() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();

    let archived = h.service.archive_habit(&habit.id).await.unwrap();
    assert!(archived.is_archived());
    assert!(h.service.get_user_habits(USER).await.unwrap().is_empty());

    let restored = h.service.restore_habit(&habit.id).await.unwrap();
    assert!(!restored.is_archived());
    assert_eq!(h.service.get_user_habits(USER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_habit_changes_only_given_fields() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();

    let patch = UpdateHabitInput { name: Some("Vitamin C".to_owned()), category: None };
    let updated = h.service.update_habit(&habit.id, patch).await.unwrap();

    assert_eq!(updated.name, "Vitamin C");
    assert_eq!(updated.category, "skincare");
}

#[tokio::test]
async fn ensure_owner_rejects_other_users() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();

    assert!(h.service.ensure_owner(&habit.id, USER).await.is_ok());
    let err = h.service.ensure_owner(&habit.id, "someone-else").await.unwrap_err();
    assert_eq!(err, RoutinelyError::UnauthorizedAccess);
}

#[tokio::test]
async fn set_timings_replaces_the_whole_set() {
    let h = harness();
    let mut input = habit_input("Cleanser");
    input.timings = vec![TimingInput::at("07:00"), TimingInput::at("22:00")];
    let habit = h.service.create_habit(input).await.unwrap();

    let stored = h.service.set_habit_timings(&habit.id, vec![TimingInput::at("12:30")]).await.unwrap();
    assert_eq!(stored.len(), 1);

    let timings = h.service.get_habit_timings(&habit.id).await.unwrap();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0].time, "12:30");
}

#[tokio::test]
async fn set_reminders_validates_bounds() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Cleanser")).await.unwrap();

    let err = h
        .service
        .set_habit_reminders(&habit.id, vec![ReminderInput { before_minutes: 0 }])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_input");
}

#[tokio::test]
async fn period_with_inverted_dates_is_rejected() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Retinol")).await.unwrap();
    let period = Period {
        start_date: Some(date(2025, 5, 1)),
        end_date: Some(date(2025, 4, 1)),
        active_months: None,
    };

    let err = h.service.set_habit_period(&habit.id, period).await.unwrap_err();
    assert_eq!(err.code(), "invalid_date_range");
}

#[tokio::test]
async fn toggle_creates_then_removes_check() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();
    let input = CheckInput::new(USER, &habit.id, date(2025, 6, 15));

    let first = h.service.toggle_habit_check(input.clone()).await.unwrap();
    assert!(first.checked);
    assert!(first.check.is_some());
    assert!(h.service.is_habit_checked(&habit.id, date(2025, 6, 15)).await.unwrap());

    let second = h.service.toggle_habit_check(input).await.unwrap();
    assert!(!second.checked);
    assert!(second.check.is_none());
    assert_eq!(h.checks.len(), 0);
}

#[tokio::test]
async fn toggle_is_scoped_to_the_timing_slot() {
    let h = harness();
    let mut input = habit_input("Sunscreen");
    input.timings = vec![TimingInput::at("08:00"), TimingInput::at("13:00")];
    let habit = h.service.create_habit(input).await.unwrap();
    let timings = h.service.get_habit_timings(&habit.id).await.unwrap();
    let day = date(2025, 6, 15);

    let morning = CheckInput::new(USER, &habit.id, day).with_timing(&timings[0].id);
    let noon = CheckInput::new(USER, &habit.id, day).with_timing(&timings[1].id);

    assert!(h.service.toggle_habit_check(morning.clone()).await.unwrap().checked);
    assert!(h.service.toggle_habit_check(noon).await.unwrap().checked);
    assert!(!h.service.toggle_habit_check(morning).await.unwrap().checked);

    let remaining = h.service.get_user_checks_for_date(USER, day).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].timing_id.as_deref(), Some(timings[1].id.as_str()));
}

#[tokio::test]
async fn check_with_foreign_timing_fails() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();
    let input = CheckInput::new(USER, &habit.id, date(2025, 6, 15)).with_timing("not-a-timing");

    let err = h.service.check_habit(input).await.unwrap_err();
    assert_eq!(err, RoutinelyError::NotFound(Entity::Timing));
}

#[tokio::test]
async fn checking_a_taken_slot_fails_with_creation_failed() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();
    let input = CheckInput::new(USER, &habit.id, date(2025, 6, 15));

    h.service.check_habit(input.clone()).await.unwrap();
    let err = h.service.check_habit(input).await.unwrap_err();
    assert_eq!(err.code(), "check_creation_failed");
}

#[tokio::test]
async fn uncheck_by_date_removes_every_slot() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();
    let day = date(2025, 6, 15);
    h.checks.seed(USER, &habit.id, day);
    h.checks.seed(USER, &habit.id, day + Duration::days(1));

    assert_eq!(h.service.uncheck_habit_by_date(&habit.id, day).await.unwrap(), 1);
    let err = h.service.uncheck_habit_by_date(&habit.id, day).await.unwrap_err();
    assert_eq!(err.code(), "check_not_found");
    assert_eq!(h.checks.len(), 1);
}

#[tokio::test]
async fn inverted_ranges_read_as_empty() {
    let h = harness();
    h.checks.seed(USER, "habit", date(2025, 6, 5));
    let clock = Arc::new(FixedClock(date(2025, 6, 15)));
    let stats = StatsEngine::new(Arc::new(h.checks.clone()), clock);

    let checks =
        h.service.get_habit_checks("habit", date(2025, 6, 10), date(2025, 6, 1)).await.unwrap();
    let count =
        stats.count_habit_checks("habit", date(2025, 6, 10), date(2025, 6, 1)).await.unwrap();

    assert!(checks.is_empty());
    assert_eq!(count, 0);
    let forward =
        h.service.get_habit_checks("habit", date(2025, 6, 1), date(2025, 6, 10)).await.unwrap();
    assert_eq!(forward.len(), 1);
}

#[tokio::test]
async fn today_view_filters_by_active_months_only() {
    let h = harness();
    let today = date(2025, 6, 15); // a Sunday

    let mut summer = habit_input("Sunscreen");
    summer.period = Some(Period { active_months: Some(vec![6, 7, 8]), ..Period::default() });
    let mut winter = habit_input("Balm");
    winter.period = Some(Period { active_months: Some(vec![12, 1, 2]), ..Period::default() });
    let mut weekdays_only = habit_input("Mask");
    weekdays_only.frequency = Some(Frequency::Weekly { days_of_week: vec![Weekday::Monday] });

    h.service.create_habit(summer).await.unwrap();
    h.service.create_habit(winter).await.unwrap();
    h.service.create_habit(weekdays_only).await.unwrap();

    let view = TodayViewBuilder::new(Arc::clone(&h.service), Arc::new(FixedClock(today)));
    let habits = view.get_today_habits(USER).await.unwrap();

    let names: Vec<&str> = habits.iter().map(|t| t.habit.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Sunscreen"));
    assert!(names.contains(&"Mask"));

    let mask = habits.iter().find(|t| t.habit.name == "Mask").unwrap();
    assert!(!mask.is_scheduled_today);
}

#[tokio::test]
async fn today_view_requires_one_check_per_timing() {
    let h = harness();
    let today = date(2025, 6, 15);
    let mut input = habit_input("Sunscreen");
    input.timings = vec![TimingInput::at("08:00"), TimingInput::at("13:00")];
    let habit = h.service.create_habit(input).await.unwrap();
    let timings = h.service.get_habit_timings(&habit.id).await.unwrap();

    h.service
        .check_habit(CheckInput::new(USER, &habit.id, today).with_timing(&timings[0].id))
        .await
        .unwrap();

    let view = TodayViewBuilder::new(Arc::clone(&h.service), Arc::new(FixedClock(today)));
    let entry = view.get_today_habits(USER).await.unwrap().remove(0);
    assert_eq!(entry.required_count, 2);
    assert_eq!(entry.checks.len(), 1);
    assert!(!entry.is_completed);
    assert!(entry.is_scheduled_today);

    h.service
        .check_habit(CheckInput::new(USER, &habit.id, today).with_timing(&timings[1].id))
        .await
        .unwrap();
    let entry = view.get_today_habits(USER).await.unwrap().remove(0);
    assert!(entry.is_completed);
}

#[tokio::test]
async fn interval_habits_are_anchored_on_creation_date() {
    let checks = MockCheckRepository::new();
    let habits = MockHabitRepository::new()
        .with_created_at(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let service = Arc::new(HabitService::new(Arc::new(habits), Arc::new(checks)));

    let mut input = habit_input("Exfoliate");
    input.frequency = Some(Frequency::Interval { interval_days: 3 });
    service.create_habit(input).await.unwrap();

    let due = TodayViewBuilder::new(Arc::clone(&service), Arc::new(FixedClock(date(2025, 6, 7))));
    assert!(due.get_today_habits(USER).await.unwrap()[0].is_scheduled_today);

    let off = TodayViewBuilder::new(Arc::clone(&service), Arc::new(FixedClock(date(2025, 6, 8))));
    assert!(!off.get_today_habits(USER).await.unwrap()[0].is_scheduled_today);
}

/// Pinned "today" reckoned at a fixed UTC offset.
struct OffsetClock {
    today: NaiveDate,
    offset: FixedOffset,
}

impl Clock for OffsetClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

#[tokio::test]
async fn interval_anchor_uses_the_clock_timezone() {
    // 23:30 UTC on June 1st is already June 2nd at UTC+2.
    let habits = MockHabitRepository::new()
        .with_created_at(Utc.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap());
    let service = Arc::new(HabitService::new(
        Arc::new(habits),
        Arc::new(MockCheckRepository::new()),
    ));
    let mut input = habit_input("Exfoliate");
    input.frequency = Some(Frequency::Interval { interval_days: 3 });
    service.create_habit(input).await.unwrap();

    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let clock = OffsetClock { today: date(2025, 6, 5), offset };
    let view = TodayViewBuilder::new(Arc::clone(&service), Arc::new(clock));

    assert!(view.get_today_habits(USER).await.unwrap()[0].is_scheduled_today);
}

#[tokio::test]
async fn stats_combine_count_streak_and_rate() {
    let checks = MockCheckRepository::new();
    let today = date(2025, 6, 15);
    for offset in [0, 1, 2, 5] {
        checks.seed(USER, "habit-1", today - Duration::days(offset));
    }
    let stats = StatsEngine::new(Arc::new(checks), Arc::new(FixedClock(today)));

    let result = stats.get_habit_stats("habit-1", date(2025, 6, 6), today).await.unwrap();
    assert_eq!(result.total_checks, 4);
    assert_eq!(result.current_streak, 3);
    assert!((result.completion_rate - 40.0).abs() < f64::EPSILON);

    assert_eq!(stats.count_habit_checks("habit-1", today, date(2025, 6, 1)).await.unwrap(), 0);
}

#[tokio::test]
async fn streak_survives_a_missed_today() {
    let checks = MockCheckRepository::new();
    let today = date(2025, 6, 15);
    checks.seed(USER, "habit-1", today - Duration::days(1));
    checks.seed(USER, "habit-1", today - Duration::days(2));
    let stats = StatsEngine::new(Arc::new(checks), Arc::new(FixedClock(today)));

    assert_eq!(stats.get_habit_streak("habit-1").await.unwrap(), 2);
}

#[tokio::test]
async fn delete_habit_twice_reports_not_found() {
    let h = harness();
    let habit = h.service.create_habit(habit_input("Serum")).await.unwrap();

    h.service.delete_habit(&habit.id).await.unwrap();
    let err = h.service.delete_habit(&habit.id).await.unwrap_err();
    assert!(err.is_not_found());
}
