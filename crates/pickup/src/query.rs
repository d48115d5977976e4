//! Parameters of the paginated, time-windowed pickup point listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvz_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 30;

/// Inclusive `[from, to]` activity window on reception start time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::validation("startDate must not be after endDate"));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// One-based page of at most [`MAX_LIMIT`] rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    number: u32,
    limit: u32,
}

impl Page {
    pub fn new(number: u32, limit: u32) -> DomainResult<Self> {
        if number < 1 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self { number, limit })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validated listing request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub window: TimeWindow,
    pub page: Page,
}

impl ListQuery {
    pub fn new(window: TimeWindow, page: Page) -> Self {
        Self { window, page }
    }

    /// Build a query from optional caller input, applying the defaults
    /// (`from` = Unix epoch, `to` = `now`, page 1, limit 10).
    pub fn from_parts(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: Option<u32>,
        limit: Option<u32>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let window = TimeWindow::new(from.unwrap_or(DateTime::<Utc>::UNIX_EPOCH), to.unwrap_or(now))?;
        let page = Page::new(
            page.unwrap_or(DEFAULT_PAGE),
            limit.unwrap_or(DEFAULT_LIMIT),
        )?;
        Ok(Self { window, page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn defaults_cover_everything_up_to_now() {
        let now = Utc::now();
        let q = ListQuery::from_parts(None, None, None, None, now).unwrap();

        assert_eq!(q.window.from, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(q.window.to, now);
        assert_eq!(q.page.number(), 1);
        assert_eq!(q.page.limit(), 10);
        assert_eq!(q.page.offset(), 0);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Page::new(2, 10).unwrap().offset(), 10);
        assert_eq!(Page::new(3, 30).unwrap().offset(), 60);
    }

    #[test]
    fn limit_bounds_are_enforced() {
        assert!(Page::new(1, 0).is_err());
        assert!(Page::new(1, 31).is_err());
        assert!(Page::new(0, 10).is_err());
        assert!(Page::new(1, 30).is_ok());
    }

    #[test]
    fn window_is_inclusive_and_ordered() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = from + Duration::hours(1);
        let window = TimeWindow::new(from, to).unwrap();

        assert!(window.contains(from));
        assert!(window.contains(to));
        assert!(!window.contains(to + Duration::seconds(1)));
        assert!(TimeWindow::new(to, from).is_err());
    }
}
