//! Store settings and class sessions (营业时段)

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Day type a class session applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
    Holiday,
}

impl DayType {
    /// Classify a local calendar date. Holidays win over weekends.
    pub fn classify(date: NaiveDate, holidays: &[NaiveDate]) -> Self {
        if holidays.contains(&date) {
            return Self::Holiday;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => Self::Weekend,
            _ => Self::Weekday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::Weekend => "weekend",
            Self::Holiday => "holiday",
        }
    }
}

/// Lowercase three-letter key for a weekday ("mon".."sun")
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Parse a weekday key produced by [`weekday_key`]
pub fn parse_weekday_key(key: &str) -> Option<Weekday> {
    match key {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Set of weekdays a class runs on.
///
/// Bit `n` is set for `Weekday::num_days_from_monday() == n`. On the wire it is
/// a list of keys, e.g. `["mon", "wed", "fri"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b111_1111);

    pub fn from_days(days: &[Weekday]) -> Self {
        days.iter().fold(Self::EMPTY, |set, d| set.with(*d))
    }

    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | (1 << day.num_days_from_monday()))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u8)
            .filter(|bit| self.0 & (1 << bit) != 0)
            .filter_map(|bit| Weekday::try_from(bit).ok())
    }
}

impl TryFrom<Vec<String>> for WeekdaySet {
    type Error = String;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        keys.iter().try_fold(Self::EMPTY, |set, key| {
            parse_weekday_key(&key.to_ascii_lowercase())
                .map(|day| set.with(day))
                .ok_or_else(|| format!("unknown weekday key: {}", key))
        })
    }
}

impl From<WeekdaySet> for Vec<String> {
    fn from(set: WeekdaySet) -> Self {
        set.days().map(|d| weekday_key(d).to_string()).collect()
    }
}

/// One operating time slot ("class") for a day type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: i64,
    pub name: String,
    /// Display / resolution order, unique per store + day type
    pub class_number: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_capacity: u32,
    /// `None` means every day of the applicable day type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<WeekdaySet>,
    pub day_type: DayType,
}

impl ClassSession {
    /// Whether this class runs on the given local date
    pub fn applies_on(&self, day_type: DayType, weekday: Weekday) -> bool {
        self.day_type == day_type && self.weekdays.is_none_or(|set| set.contains(weekday))
    }
}

/// Per-store configuration consumed by the queue engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub store_id: i64,
    pub name: String,
    /// IANA timezone name, e.g. "Asia/Seoul"
    pub timezone: String,
    /// Closing a class requires earlier classes of the day to be closed first
    #[serde(default)]
    pub sequential_closing: bool,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub classes: Vec<ClassSession>,
}

impl StoreSettings {
    pub fn class(&self, class_id: i64) -> Option<&ClassSession> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn day_type(&self, date: NaiveDate) -> DayType {
        DayType::classify(date, &self.holidays)
    }

    /// Classes that run on `date`, ordered by `class_number`
    pub fn classes_on(&self, date: NaiveDate) -> Vec<&ClassSession> {
        let day_type = self.day_type(date);
        let weekday = date.weekday();
        let mut classes: Vec<&ClassSession> = self
            .classes
            .iter()
            .filter(|c| c.applies_on(day_type, weekday))
            .collect();
        classes.sort_by_key(|c| c.class_number);
        classes
    }
}
