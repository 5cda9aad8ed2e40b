use crate::model::{
    Id,
    notice::{NoticeCategory, Sex},
    user::UserMarker,
};
use time::{Date, Month};

/// Admissible birthdate range derived from a requested age range.
///
/// The inversion is intentional: a minimum age caps how *late* the
/// birthdate may be, a maximum age caps how *early*. A side is present
/// only when the corresponding age parameter was supplied.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct BirthdateWindow {
    pub earliest: Option<Date>,
    pub latest: Option<Date>,
}

impl BirthdateWindow {
    #[must_use]
    pub fn from_age_range(today: Date, min_age_years: Option<u8>, max_age_years: Option<u8>) -> Self {
        Self {
            earliest: max_age_years.map(|years| months_back(today, u16::from(years) * 12)),
            latest: min_age_years.map(|years| months_back(today, u16::from(years) * 12)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.earliest.is_none() && self.latest.is_none()
    }
}

/// Calendar-month shift, clamping the day to the target month's length.
fn months_back(date: Date, months: u16) -> Date {
    let shifted = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - i32::from(months);

    let year = shifted.div_euclid(12);
    let month = Month::try_from(u8::try_from(shifted.rem_euclid(12) + 1).expect("fits in u8"))
        .expect("month number is in 1..=12");
    let day = date.day().min(time::util::days_in_year_month(year, month));

    Date::from_calendar_date(year, month, day).expect("clamped day is valid for the month")
}

/// Criteria object for notice lookups. Absent fields are simply not part
/// of the criteria; present fields are combined conjunctively.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct NoticeFilter {
    pub category: Option<NoticeCategory>,
    pub sex: Option<Sex>,
    pub birthdate: BirthdateWindow,
    pub text: Option<String>,
    pub owner: Option<Id<UserMarker>>,
}

impl NoticeFilter {
    #[must_use]
    pub fn with_category(mut self, category: NoticeCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    #[must_use]
    pub fn with_birthdate(mut self, window: BirthdateWindow) -> Self {
        self.birthdate = window;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Id<UserMarker>) -> Self {
        self.owner = Some(owner);
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::model::filter::{BirthdateWindow, months_back};
    use time::macros::date;

    #[test]
    fn min_age_becomes_the_latest_admissible_birthdate() {
        let window = BirthdateWindow::from_age_range(date!(2026 - 08 - 07), Some(2), None);

        assert_eq!(window.latest, Some(date!(2024 - 08 - 07)));
        assert_eq!(window.earliest, None);
    }

    #[test]
    fn max_age_becomes_the_earliest_admissible_birthdate() {
        let window = BirthdateWindow::from_age_range(date!(2026 - 08 - 07), None, Some(8));

        assert_eq!(window.earliest, Some(date!(2018 - 08 - 07)));
        assert_eq!(window.latest, None);
    }

    #[test]
    fn absent_ages_leave_the_window_empty() {
        let window = BirthdateWindow::from_age_range(date!(2026 - 08 - 07), None, None);

        assert!(window.is_empty());
    }

    #[test]
    fn month_shift_clamps_to_shorter_months() {
        assert_eq!(months_back(date!(2024 - 03 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(months_back(date!(2023 - 03 - 31), 1), date!(2023 - 02 - 28));
        assert_eq!(months_back(date!(2024 - 01 - 15), 24), date!(2022 - 01 - 15));
    }

    #[test]
    fn month_shift_crosses_year_boundaries() {
        assert_eq!(months_back(date!(2026 - 02 - 01), 3), date!(2025 - 11 - 01));
        assert_eq!(months_back(date!(2026 - 08 - 07), 0), date!(2026 - 08 - 07));
    }
}
