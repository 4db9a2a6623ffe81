//! Event time-bucketing and derived summary values
//!
//! Everything here is recomputed from scratch on each poll: the input set is
//! bounded by the `limit` the backend was asked for, so there is no running
//! aggregation state to maintain or evict.

use crate::api::Event;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use std::collections::BTreeMap;
use std::fmt;

/// Number of most recent events the average latency is taken over
const LATENCY_WINDOW: usize = 10;

/// Width of a chart bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Minute,
    Hour,
    Day,
}

impl Granularity {
    /// Cycle minute → hour → day → minute
    pub fn next(self) -> Self {
        match self {
            Self::Minute => Self::Hour,
            Self::Hour => Self::Day,
            Self::Day => Self::Minute,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minute" | "min" | "m" => Some(Self::Minute),
            "hour" | "h" => Some(Self::Hour),
            "day" | "d" => Some(Self::Day),
            _ => None,
        }
    }

    fn label_format(self) -> &'static str {
        match self {
            Self::Minute => "%H:%M",
            Self::Hour => "%b %-d %H",
            Self::Day => "%b %-d",
        }
    }

    /// Floor a wall-clock time to the start of its bucket
    fn truncate(self, naive: NaiveDateTime) -> NaiveDateTime {
        let (hour, minute) = match self {
            Self::Minute => (naive.hour(), naive.minute()),
            Self::Hour => (naive.hour(), 0),
            Self::Day => (0, 0),
        };
        naive
            .date()
            .and_hms_opt(hour, minute, 0)
            .unwrap_or(naive)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One plotted bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    pub tokens: u64,
    /// Bucket start, milliseconds since the Unix epoch
    pub timestamp_ms: i64,
}

/// Bucket events by local wall-clock time
pub fn bucket_events(events: &[Event], granularity: Granularity) -> Vec<ChartPoint> {
    bucket_events_in(events, granularity, &Local)
}

/// Bucket events in an explicit time zone
///
/// Each event's time is floored to its minute/hour/day in `tz`; prompt and
/// completion tokens are summed per bucket. Output is sorted ascending by
/// bucket start regardless of input order.
pub fn bucket_events_in<Tz>(events: &[Event], granularity: Granularity, tz: &Tz) -> Vec<ChartPoint>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut buckets: BTreeMap<i64, (DateTime<Tz>, u64)> = BTreeMap::new();

    for event in events {
        let local = event.time.with_timezone(tz);
        let floor = granularity.truncate(local.naive_local());
        // A bucket start can fall into a DST gap; keep the event's own instant then
        let start = tz
            .from_local_datetime(&floor)
            .earliest()
            .unwrap_or(local);

        let entry = buckets
            .entry(start.timestamp_millis())
            .or_insert_with(|| (start, 0));
        entry.1 += event.token_sum();
    }

    buckets
        .into_iter()
        .map(|(timestamp_ms, (start, tokens))| ChartPoint {
            label: start.format(granularity.label_format()).to_string(),
            tokens,
            timestamp_ms,
        })
        .collect()
}

/// Headline numbers shown above the chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    /// Mean latency over the most recent events; missing latency counts as 0
    pub avg_latency_ms: f64,
    pub error_count: usize,
    pub window_tokens: u64,
    pub window_cost: f64,
}

impl MetricsSummary {
    /// Events arrive most recent first
    pub fn from_events(events: &[Event]) -> Self {
        let recent = &events[..events.len().min(LATENCY_WINDOW)];
        let avg_latency_ms = if recent.is_empty() {
            0.0
        } else {
            let total: u64 = recent.iter().map(|e| e.latency_ms.unwrap_or(0)).sum();
            total as f64 / recent.len() as f64
        };

        Self {
            avg_latency_ms,
            error_count: events.iter().filter(|e| e.has_error).count(),
            window_tokens: events.iter().map(Event::token_sum).sum(),
            window_cost: events.iter().map(|e| e.cost_usd).sum(),
        }
    }
}

/// Metrics pane state: last fetched events plus everything derived from them
#[derive(Debug, Clone, Default)]
pub struct MetricsView {
    events: Vec<Event>,
    granularity: Granularity,
    chart: Vec<ChartPoint>,
    summary: MetricsSummary,
}

impl MetricsView {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Default::default()
        }
    }

    /// Replace the event set and rebuild the chart
    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
        self.recompute();
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.recompute();
    }

    pub fn cycle_granularity(&mut self) -> Granularity {
        self.set_granularity(self.granularity.next());
        self.granularity
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn chart(&self) -> &[ChartPoint] {
        &self.chart
    }

    pub fn summary(&self) -> &MetricsSummary {
        &self.summary
    }

    fn recompute(&mut self) {
        self.chart = bucket_events(&self.events, self.granularity);
        self.summary = MetricsSummary::from_events(&self.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn event(time: &str, prompt: u64, completion: u64) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": format!("ev-{}", time),
            "time": time,
            "tokens_prompt": prompt,
            "tokens_completion": completion,
            "tokens_total": prompt + completion,
        }))
        .unwrap()
    }

    fn with_latency(mut e: Event, latency: Option<u64>) -> Event {
        e.latency_ms = latency;
        e
    }

    #[test]
    fn test_same_minute_sums_into_one_bucket() {
        let events = vec![
            event("2024-01-01T10:15:00Z", 10, 5),
            event("2024-01-01T10:15:30Z", 3, 2),
        ];

        let points = bucket_events_in(&events, Granularity::Minute, &Utc);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "10:15");
        assert_eq!(points[0].tokens, 20);
    }

    #[test]
    fn test_naive_times_bucket_in_local_wall_clock() {
        let events = vec![
            event("2024-01-01T10:15:00", 10, 5),
            event("2024-01-01T10:15:30", 3, 2),
        ];

        let points = bucket_events(&events, Granularity::Minute);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "10:15");
        assert_eq!(points[0].tokens, 20);
    }

    #[test]
    fn test_output_sorted_regardless_of_input_order() {
        let events = vec![
            event("2024-01-01T12:00:00Z", 1, 0),
            event("2024-01-01T09:30:00Z", 2, 0),
            event("2024-01-01T11:45:00Z", 4, 0),
            event("2024-01-01T09:10:00Z", 8, 0),
        ];

        let points = bucket_events_in(&events, Granularity::Hour, &Utc);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 1 09", "Jan 1 11", "Jan 1 12"]);
        assert_eq!(points[0].tokens, 10);
        assert!(points.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    }

    #[test]
    fn test_bucketing_is_idempotent() {
        let events = vec![
            event("2024-01-02T00:10:00Z", 5, 5),
            event("2024-01-01T23:50:00Z", 1, 1),
            event("2024-01-01T08:00:00Z", 2, 2),
        ];

        let once = bucket_events_in(&events, Granularity::Day, &Utc);
        let twice = bucket_events_in(&events, Granularity::Day, &Utc);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].label, "Jan 1");
        assert_eq!(once[0].tokens, 6);
        assert_eq!(once[1].label, "Jan 2");
    }

    #[test]
    fn test_day_boundary_follows_time_zone() {
        // 23:30 UTC is already the next day at +02:00
        let events = vec![
            event("2024-01-01T21:00:00Z", 1, 0),
            event("2024-01-01T23:30:00Z", 1, 0),
        ];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc_points = bucket_events_in(&events, Granularity::Day, &Utc);
        let shifted = bucket_events_in(&events, Granularity::Day, &plus_two);
        assert_eq!(utc_points.len(), 1);
        assert_eq!(shifted.len(), 2);
        assert_eq!(shifted[1].label, "Jan 2");
    }

    #[test]
    fn test_empty_input_yields_empty_chart() {
        assert!(bucket_events(&[], Granularity::Hour).is_empty());
    }

    #[test]
    fn test_average_latency_uses_ten_most_recent() {
        let mut events: Vec<Event> = (0..10)
            .map(|_| with_latency(event("2024-01-01T10:00:00Z", 1, 1), Some(100)))
            .collect();
        // Older events beyond the window must not count
        events.push(with_latency(event("2024-01-01T09:00:00Z", 1, 1), Some(10_000)));

        let summary = MetricsSummary::from_events(&events);
        assert_eq!(summary.avg_latency_ms, 100.0);
        assert_eq!(summary.window_tokens, 22);
    }

    #[test]
    fn test_null_latency_counts_as_zero() {
        let events = vec![
            with_latency(event("2024-01-01T10:00:00Z", 1, 1), Some(300)),
            with_latency(event("2024-01-01T10:00:01Z", 1, 1), None),
        ];
        assert_eq!(MetricsSummary::from_events(&events).avg_latency_ms, 150.0);
        assert_eq!(MetricsSummary::from_events(&[]).avg_latency_ms, 0.0);
    }

    #[test]
    fn test_granularity_cycle_and_parse() {
        assert_eq!(Granularity::Minute.next(), Granularity::Hour);
        assert_eq!(Granularity::Day.next(), Granularity::Minute);
        assert_eq!(Granularity::parse("HOUR"), Some(Granularity::Hour));
        assert_eq!(Granularity::parse("week"), None);
    }

    #[test]
    fn test_view_recomputes_on_granularity_change() {
        let mut view = MetricsView::new(Granularity::Minute);
        view.set_events(vec![
            event("2024-01-01T10:15:00", 1, 0),
            event("2024-01-01T10:45:00", 1, 0),
        ]);
        assert_eq!(view.chart().len(), 2);

        assert_eq!(view.cycle_granularity(), Granularity::Hour);
        assert_eq!(view.chart().len(), 1);
        assert_eq!(view.chart()[0].tokens, 2);
    }
}
