use chrono::NaiveDate;

use crate::models::Settings;

/// 1-based teaching week containing `today`.
///
/// Falls back to week 1 when `first_monday` does not parse or lies in the
/// future. Weeks past the end of the semester keep counting.
pub fn current_week(settings: &Settings, today: NaiveDate) -> u32 {
    let Some(first_monday) = settings.first_monday_date() else {
        return 1;
    };
    let days = (today - first_monday).num_days();
    if days < 0 {
        return 1;
    }
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}
