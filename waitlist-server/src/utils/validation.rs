//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use std::collections::HashSet;

use shared::models::{CustomerRef, MemberPatch, StoreSettings};

use super::time::parse_timezone;
use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Store / class / customer display names
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: phone numbers, party breakdown keys
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Upper bound for a single party
pub const MAX_PARTY_SIZE: u32 = 100;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

fn validate_party_size(party_size: u32) -> Result<(), AppError> {
    if party_size == 0 || party_size > MAX_PARTY_SIZE {
        return Err(AppError::validation(format!(
            "party_size must be between 1 and {MAX_PARTY_SIZE}, got {party_size}"
        )));
    }
    Ok(())
}

/// Registration input: customer fields and party size
pub fn validate_registration(customer: &CustomerRef, party_size: u32) -> Result<(), AppError> {
    validate_optional_text(&customer.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&customer.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_party_size(party_size)
}

pub fn validate_member_patch(patch: &MemberPatch) -> Result<(), AppError> {
    validate_optional_text(&patch.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(party_size) = patch.party_size {
        validate_party_size(party_size)?;
    }
    Ok(())
}

/// Store settings: names, timezone, unique class ids, sane capacities and times
///
/// `class_number` must be unique per day type: the slot scheduler and the
/// sequential closing guard both order classes by it.
pub fn validate_store_settings(settings: &StoreSettings) -> Result<(), AppError> {
    validate_required_text(&settings.name, "name", MAX_NAME_LEN)?;
    parse_timezone(&settings.timezone)?;

    let mut ids = HashSet::new();
    let mut numbers = HashSet::new();
    for class in &settings.classes {
        if !ids.insert(class.id) {
            return Err(AppError::settings_invalid(format!(
                "duplicate class id {}",
                class.id
            ))
            .with_detail("class_id", class.id));
        }
        if !numbers.insert((class.day_type, class.class_number)) {
            return Err(AppError::settings_invalid(format!(
                "duplicate class_number {} for {} classes",
                class.class_number,
                class.day_type.as_str()
            ))
            .with_detail("class_id", class.id)
            .with_detail("class_number", class.class_number));
        }
        validate_required_text(&class.name, "class name", MAX_NAME_LEN)?;
        if class.max_capacity == 0 {
            return Err(AppError::settings_invalid(format!(
                "class {} max_capacity must be at least 1",
                class.id
            )));
        }
        if class.end_time <= class.start_time {
            return Err(AppError::settings_invalid(format!(
                "class {} must end after it starts",
                class.id
            )));
        }
        if class.weekdays.is_some_and(|days| days.is_empty()) {
            return Err(AppError::settings_invalid(format!(
                "class {} weekdays must not be empty",
                class.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use crate::utils::ErrorCode;
    use shared::models::{ClassSession, DayType, WeekdaySet};

    fn class(id: i64) -> ClassSession {
        ClassSession {
            id,
            name: format!("{}교시", id),
            class_number: id as u32,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            max_capacity: 10,
            weekdays: None,
            day_type: DayType::Weekday,
        }
    }

    fn settings(classes: Vec<ClassSession>) -> StoreSettings {
        StoreSettings {
            store_id: 1,
            name: "Academy".into(),
            timezone: "Asia/Seoul".into(),
            sequential_closing: false,
            holidays: vec![],
            classes,
        }
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("ok", "name", 10).is_ok());
        assert!(validate_required_text("   ", "name", 10).is_err());
        assert!(validate_required_text("too long name", "name", 5).is_err());
    }

    #[test]
    fn test_validate_store_settings() {
        assert!(validate_store_settings(&settings(vec![class(1), class(2)])).is_ok());
        let err = validate_store_settings(&settings(vec![class(1), class(1)])).unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreSettingsInvalid);

        // 同一日期类型下 class_number 重复
        let mut same_number = class(2);
        same_number.class_number = 1;
        let err = validate_store_settings(&settings(vec![class(1), same_number.clone()]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreSettingsInvalid);

        // 不同日期类型可以复用 class_number
        same_number.day_type = DayType::Weekend;
        assert!(validate_store_settings(&settings(vec![class(1), same_number])).is_ok());

        let mut zero = class(1);
        zero.max_capacity = 0;
        assert!(validate_store_settings(&settings(vec![zero])).is_err());

        let mut backwards = class(1);
        backwards.end_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert!(validate_store_settings(&settings(vec![backwards])).is_err());

        let mut no_days = class(1);
        no_days.weekdays = Some(WeekdaySet::EMPTY);
        assert!(validate_store_settings(&settings(vec![no_days])).is_err());

        let mut bad_tz = settings(vec![]);
        bad_tz.timezone = "Nowhere/Land".into();
        assert!(validate_store_settings(&bad_tz).is_err());
    }

    #[test]
    fn test_validate_registration() {
        let customer = CustomerRef {
            name: Some("Kim".into()),
            phone: Some("010-1234-5678".into()),
            revisit_count: 0,
        };
        assert!(validate_registration(&customer, 2).is_ok());
        assert!(validate_registration(&customer, 0).is_err());
        assert!(validate_registration(&customer, MAX_PARTY_SIZE + 1).is_err());
    }
}
