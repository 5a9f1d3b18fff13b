//! Cron-driven recurring runs.
//!
//! Expressions use the classic five-field form (`minute hour day month
//! weekday`, Sunday as 0 or 7) or the six/seven-field form with seconds,
//! whose weekdays run 1-7 from Sunday. Macros such as `@daily` are accepted
//! as-is. Fire times are evaluated in local time.

use std::future::Future;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use cron::Schedule;
use tracing::{debug, info};

/// A parsed recurring schedule.
#[derive(Debug, Clone)]
pub struct RecurringTrigger {
    expression: String,
    schedule: Schedule,
}

impl RecurringTrigger {
    /// Parses a cron expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is not a valid cron schedule.
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        let normalized = normalize(expression);
        let schedule = Schedule::from_str(&normalized)
            .with_context(|| format!("Invalid cron schedule '{expression}'"))?;

        Ok(Self {
            expression: expression.to_string(),
            schedule,
        })
    }

    /// The expression as written in the configuration.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The first fire time strictly after `after`.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }

    /// Runs `job` at every fire time until `shutdown` completes.
    ///
    /// Runs never overlap: the next fire time is computed only after the
    /// previous run finished, so fire times that elapsed during a run are
    /// skipped. Returns the number of completed runs.
    pub async fn run_until<F, Fut, S>(&self, mut job: F, shutdown: S) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut runs = 0;

        loop {
            let now = Local::now();
            let Some(next) = self.next_after(&now) else {
                info!(schedule = %self.expression, "Schedule has no future fire times");
                break;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(next = %next.to_rfc3339(), wait_ms = wait.as_millis(), "Waiting for next run");

            tokio::select! {
                biased;
                () = &mut shutdown => {
                    debug!("Shutdown requested");
                    break;
                }
                () = tokio::time::sleep(wait) => {}
            }

            info!(scheduled = %next.to_rfc3339(), "Starting scheduled run");
            job().await;
            runs += 1;
        }

        runs
    }
}

/// Rewrites a five-field expression into the six-field form: a zero seconds
/// field is prepended and numeric weekdays (0-7, Sunday as 0 or 7) are
/// renumbered to 1-7 with Sunday as 1.
fn normalize(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if expression.starts_with('@') || fields.len() != 5 {
        return expression.to_string();
    }
    format!(
        "0 {} {}",
        fields[..4].join(" "),
        renumber_weekdays(fields[4])
    )
}

fn renumber_weekdays(field: &str) -> String {
    field
        .split(',')
        .map(renumber_weekday_item)
        .collect::<Vec<_>>()
        .join(",")
}

/// Renumbers one list item (`n`, `a-b`, `n/s`, `a-b/s`). Names, `*` and
/// anything else unrecognised are returned unchanged.
fn renumber_weekday_item(item: &str) -> String {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    let step_by = match step.map(str::parse::<u8>) {
        None => 1,
        Some(Ok(n)) if n > 0 => n,
        Some(_) => return item.to_string(),
    };
    let bounds = match base.split_once('-') {
        Some((lo, hi)) => lo.parse::<u8>().ok().zip(hi.parse::<u8>().ok()),
        // `n/s` runs from n to the last weekday
        None => base
            .parse::<u8>()
            .ok()
            .map(|n| (n, if step.is_some() { 6 } else { n })),
    };
    let Some((lo, hi)) = bounds.filter(|&(lo, hi)| lo <= hi && hi <= 7) else {
        return item.to_string();
    };
    let suffix = step.map(|s| format!("/{s}")).unwrap_or_default();

    if lo == hi {
        return if lo == 0 || lo == 7 {
            "1".to_string()
        } else {
            (lo + 1).to_string()
        };
    }
    if lo == 0 {
        return format!("1-{}{suffix}", hi.min(6) + 1);
    }
    if hi <= 6 {
        return format!("{}-{}{suffix}", lo + 1, hi + 1);
    }
    // a range ending on Sunday (7) wraps back to 1
    let mut renumbered = format!("{}-7{suffix}", lo + 1);
    if (7 - lo) % step_by == 0 {
        renumbered.push_str(",1");
    }
    renumbered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc, Weekday};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("0 2 * * *"), "0 0 2 * * *");
        assert_eq!(normalize("*/5 0 2 * * *"), "*/5 0 2 * * *");
        assert_eq!(normalize("@daily"), "@daily");
    }

    #[test]
    fn test_normalize_renumbers_weekdays() {
        assert_eq!(normalize("0 2 * * 1"), "0 0 2 * * 2");
        assert_eq!(normalize("0 2 * * 0"), "0 0 2 * * 1");
        assert_eq!(normalize("0 2 * * 7"), "0 0 2 * * 1");
        assert_eq!(normalize("0 2 * * 1-5"), "0 0 2 * * 2-6");
        assert_eq!(normalize("0 2 * * 0-6"), "0 0 2 * * 1-7");
        assert_eq!(normalize("0 2 * * 5-7"), "0 0 2 * * 6-7,1");
        assert_eq!(normalize("0 2 * * 1,3"), "0 0 2 * * 2,4");
        assert_eq!(normalize("0 2 * * 1-5/2"), "0 0 2 * * 2-6/2");
        assert_eq!(normalize("0 2 * * MON-FRI"), "0 0 2 * * MON-FRI");
        assert_eq!(normalize("0 2 * * */2"), "0 0 2 * * */2");
    }

    #[test]
    fn test_six_field_weekdays_untouched() {
        assert_eq!(normalize("0 0 2 * * 1"), "0 0 2 * * 1");
    }

    fn weekdays(expression: &str, count: usize) -> Vec<Weekday> {
        let trigger = RecurringTrigger::parse(expression).unwrap();
        // a Wednesday
        let mut at = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();
        (0..count)
            .map(|_| {
                at = trigger.next_after(&at).unwrap();
                at.weekday()
            })
            .collect()
    }

    #[test]
    fn test_numeric_weekdays_follow_standard_cron() {
        assert_eq!(weekdays("0 2 * * 1", 1), vec![Weekday::Mon]);
        assert_eq!(weekdays("0 2 * * 0", 1), vec![Weekday::Sun]);
        assert_eq!(weekdays("0 2 * * 7", 1), vec![Weekday::Sun]);
        assert_eq!(
            weekdays("0 2 * * 1-5", 5),
            vec![
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed
            ]
        );
        assert_eq!(
            weekdays("0 2 * * 5-7", 3),
            vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = RecurringTrigger::parse("not a cron").unwrap_err();
        assert!(err.to_string().contains("Invalid cron schedule"));
    }

    #[test]
    fn test_parse_keeps_original_expression() {
        let trigger = RecurringTrigger::parse(" 0 2 * * * ").unwrap();
        assert_eq!(trigger.expression(), "0 2 * * *");
    }

    #[test]
    fn test_next_after_daily() {
        let trigger = RecurringTrigger::parse("30 2 * * *").unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();

        let next = trigger.next_after(&start).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 2, 2, 30, 0).unwrap());
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn test_next_after_is_strict() {
        let trigger = RecurringTrigger::parse("0 * * * *").unwrap();
        let on_the_hour = Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap();

        let next = trigger.next_after(&on_the_hour).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_shutdown_before_first_fire() {
        let trigger = RecurringTrigger::parse("0 0 1 1 *").unwrap();
        let runs = trigger.run_until(|| async {}, async {}).await;
        assert_eq!(runs, 0);
    }

    #[tokio::test]
    async fn test_runs_until_shutdown() {
        let trigger = RecurringTrigger::parse("* * * * * *").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(Notify::new());

        let job = {
            let count = Arc::clone(&count);
            let stop = Arc::clone(&stop);
            move || {
                let count = Arc::clone(&count);
                let stop = Arc::clone(&stop);
                async move {
                    if count.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                        stop.notify_one();
                    }
                }
            }
        };

        let shutdown = {
            let stop = Arc::clone(&stop);
            async move { stop.notified().await }
        };

        let runs = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            trigger.run_until(job, shutdown),
        )
        .await
        .unwrap();

        assert_eq!(runs, 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
