//! Time source port.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Today's date in the IANA `timezone`. Unknown names fall back to UTC.
    fn today_in(&self, timezone: &str) -> NaiveDate {
        match timezone.parse::<Tz>() {
            Ok(tz) => self.now().with_timezone(&tz).date_naive(),
            Err(_) => {
                tracing::warn!(timezone, "Unknown timezone, using UTC date");
                self.today()
            }
        }
    }
}
