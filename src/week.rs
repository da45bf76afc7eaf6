// Copyright 2023 Remi Bernotavicius

use chrono::Datelike as _;
use std::fmt;

/// A Monday to Sunday week. The two partial weeks at the ends of the representable calendar are
/// clamped to it, so their days repeat `NaiveDate::MIN` or `NaiveDate::MAX`.
#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MealWeek {
    monday: chrono::NaiveDate,
}

impl MealWeek {
    pub fn containing(date: chrono::NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday();
        Self {
            monday: date
                .checked_sub_days(chrono::Days::new(offset.into()))
                .unwrap_or(chrono::NaiveDate::MIN),
        }
    }

    pub fn this_week() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    pub fn first_day(&self) -> chrono::NaiveDate {
        self.monday
    }

    pub fn last_day(&self) -> chrono::NaiveDate {
        self.day(6)
    }

    pub fn days(&self) -> [chrono::NaiveDate; 7] {
        std::array::from_fn(|i| self.day(i as u64))
    }

    fn day(&self, offset: u64) -> chrono::NaiveDate {
        self.monday
            .checked_add_days(chrono::Days::new(offset))
            .unwrap_or(chrono::NaiveDate::MAX)
    }

    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        (self.first_day()..=self.last_day()).contains(&date)
    }
}

impl fmt::Display for MealWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week of {}", self.monday.format("%e %B %Y"))
    }
}

pub fn full_day_name(day: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;

    match day {
        Mon => "Lundi",
        Tue => "Mardi",
        Wed => "Mercredi",
        Thu => "Jeudi",
        Fri => "Vendredi",
        Sat => "Samedi",
        Sun => "Dimanche",
    }
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn week_runs_monday_to_sunday() {
    // 2024-01-01 is a Monday and 2024-02-29 a Thursday in a leap year.
    let start = date("2023-12-25");
    for reference in start.iter_days().take(70) {
        let week = MealWeek::containing(reference);
        let days = week.days();

        assert_eq!(days[0].weekday(), chrono::Weekday::Mon);
        assert_eq!(days[6].weekday(), chrono::Weekday::Sun);
        assert_eq!(days[0], week.first_day());
        assert_eq!(days[6], week.last_day());
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
        assert!(days.contains(&reference));
        assert!(week.contains(reference));
    }
}

#[test]
fn week_examples() {
    let week = MealWeek::containing(date("2024-02-29"));
    assert_eq!(week.first_day(), date("2024-02-26"));
    assert_eq!(week.last_day(), date("2024-03-03"));

    let sunday = MealWeek::containing(date("2024-03-03"));
    assert_eq!(sunday, week);

    let next = MealWeek::containing(date("2024-03-04"));
    assert_ne!(next, week);
    assert_eq!(next.first_day(), date("2024-03-04"));
    assert!(!week.contains(date("2024-03-04")));
    assert!(!week.contains(date("2024-02-25")));
}

#[test]
fn weeks_at_the_ends_of_the_calendar() {
    use chrono::NaiveDate;

    let last = MealWeek::containing(NaiveDate::MAX);
    let days = last.days();
    assert!(last.contains(NaiveDate::MAX));
    assert_eq!(last.last_day(), NaiveDate::MAX);
    assert_eq!(days[6], NaiveDate::MAX);
    assert_eq!(days[0].weekday(), chrono::Weekday::Mon);
    assert!(days.windows(2).all(|pair| pair[0] <= pair[1]));

    let first = MealWeek::containing(NaiveDate::MIN);
    let days = first.days();
    assert!(first.contains(NaiveDate::MIN));
    assert_eq!(first.first_day(), NaiveDate::MIN);
    assert!(days.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn week_display() {
    let week = MealWeek::containing(date("2024-01-03"));
    assert_eq!(week.to_string(), "week of  1 January 2024");
}
