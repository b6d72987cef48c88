use chrono::{Datelike, Local, Months, NaiveDate};

/// Issue date and payment due date of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceDates {
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl InvoiceDates {
    pub fn issue_date_display(&self) -> String {
        format_long_date(self.issue_date)
    }

    pub fn due_date_display(&self) -> String {
        format_long_date(self.due_date)
    }
}

/// Derives the invoice dates from a raw `YYYY.MM.DD` issue date.
///
/// Blank, absent or unparsable input falls back to `today`. The due date is
/// one calendar month later; chrono clamps to the end of a shorter month
/// (2025-01-31 -> 2025-02-28).
pub fn derive_dates(raw: Option<&str>, today: NaiveDate) -> InvoiceDates {
    let issue_date = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_issue_date)
        .unwrap_or(today);

    let due_date = issue_date
        .checked_add_months(Months::new(1))
        .unwrap_or(issue_date);

    InvoiceDates {
        issue_date,
        due_date,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_issue_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.replace('.', "-");
    match NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(raw, error = %e, "issue date is not a calendar date, using today");
            None
        }
    }
}

/// Korean long calendar form, e.g. `2025년 3월 31일`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dotted_issue_date_is_used() {
        let dates = derive_dates(Some("2025.03.31"), ymd(2030, 1, 1));
        assert_eq!(dates.issue_date, ymd(2025, 3, 31));
        assert_eq!(dates.due_date, ymd(2025, 4, 30));
    }

    #[test]
    fn due_date_is_one_month_later() {
        let dates = derive_dates(Some("2025.03.15"), ymd(2030, 1, 1));
        assert_eq!(dates.due_date, ymd(2025, 4, 15));

        let year_end = derive_dates(Some("2025.12.10"), ymd(2030, 1, 1));
        assert_eq!(year_end.due_date, ymd(2026, 1, 10));
    }

    #[test]
    fn missing_or_blank_falls_back_to_today() {
        let today = ymd(2026, 10, 18);
        assert_eq!(derive_dates(None, today).issue_date, today);
        assert_eq!(derive_dates(Some(""), today).issue_date, today);
        assert_eq!(derive_dates(Some("   "), today).issue_date, today);
        assert_eq!(derive_dates(None, today).due_date, ymd(2026, 11, 18));
    }

    #[test]
    fn unparsable_falls_back_to_today() {
        let today = ymd(2026, 10, 18);
        assert_eq!(derive_dates(Some("next week"), today).issue_date, today);
        assert_eq!(derive_dates(Some("2025.02.30"), today).issue_date, today);
    }

    #[test]
    fn accepts_dashes_and_unpadded_parts() {
        let today = ymd(2026, 10, 18);
        assert_eq!(derive_dates(Some("2025-03-05"), today).issue_date, ymd(2025, 3, 5));
        assert_eq!(derive_dates(Some("2025.3.5"), today).issue_date, ymd(2025, 3, 5));
    }

    #[test]
    fn month_end_overflow_clamps() {
        let dates = derive_dates(Some("2025.01.31"), ymd(2030, 1, 1));
        assert_eq!(dates.due_date, ymd(2025, 2, 28));
    }

    #[test]
    fn long_form_display() {
        let dates = derive_dates(Some("2025.03.31"), ymd(2030, 1, 1));
        assert_eq!(dates.issue_date_display(), "2025년 3월 31일");
        assert_eq!(dates.due_date_display(), "2025년 4월 30일");
    }
}
