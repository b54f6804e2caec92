use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::future::Future;
use std::time::Instant;
use tracing::debug;

/// Awaits `f`, logging how long `operation_name` took.
pub async fn measure_time<F, T>(operation_name: &str, f: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let result = f.await;
    debug!("{} completed in {:.2?}", operation_name, start.elapsed());
    result
}

/// Calendar date of `now` on the exchange's wall clock.
pub fn date_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn today(tz: Tz) -> NaiveDate {
    date_in(Utc::now(), tz)
}
