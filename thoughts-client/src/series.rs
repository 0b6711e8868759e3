//! Gap-aware time-series grouping for graphing one field across entries.
//!
//! Entries are scanned once, left to right, in date order. Entries carrying
//! a value for the target field extend the current run; an entry without it
//! closes the run. Each run becomes one unbroken line segment, so a chart
//! never draws across a day with no data.

use chrono::{DateTime, NaiveTime, Utc};

use thoughts_api::domain::{Entry, FieldConfig, FieldValue};

/// Normalize to day granularity so same-day entries compare equal
/// regardless of time-of-day noise.
pub fn day_start(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// One plotted sample: the entry it came from and its value for the target
/// field, dated at day granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub entry_id: i64,
    pub day: DateTime<Utc>,
    pub value: FieldValue,
}

/// An entry marker carried through to the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPoint {
    pub day: DateTime<Utc>,
    pub title: String,
}

/// Grouped series for one field. Domains are `None` when no entry (X) or no
/// sample (Y) contributed, so empty charts need no sentinel values.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSeries {
    pub x_domain: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub y_domain: Option<(f64, f64)>,
    pub groups: Vec<Vec<SeriesPoint>>,
    pub markers: Vec<MarkerPoint>,
}

impl FieldSeries {
    /// Scan `entries` (ordered by date) for values of `field_id`. Runs of
    /// any length are kept, so single points still render.
    pub fn collect(entries: &[Entry], field_id: i64, config: &FieldConfig) -> Self {
        Self::collect_with_min_len(entries, field_id, config, 1)
    }

    /// Like [`FieldSeries::collect`] but dropping runs shorter than
    /// `min_len` when they close.
    pub fn collect_with_min_len(
        entries: &[Entry],
        field_id: i64,
        config: &FieldConfig,
        min_len: usize,
    ) -> Self {
        let mut series = FieldSeries {
            x_domain: None,
            y_domain: None,
            groups: Vec::new(),
            markers: Vec::new(),
        };
        let mut open_run: Vec<SeriesPoint> = Vec::new();

        for entry in entries {
            let day = day_start(entry.day);
            series.x_domain = Some(match series.x_domain {
                Some((min_x, max_x)) => (min_x.min(day), max_x.max(day)),
                None => (day, day),
            });
            for marker in &entry.markers {
                series.markers.push(MarkerPoint {
                    day,
                    title: marker.title.clone(),
                });
            }

            match entry.field_entry(field_id) {
                Some(cfe) => {
                    let (low, high) = y_bounds(&cfe.value, config);
                    fold_y(&mut series.y_domain, low);
                    fold_y(&mut series.y_domain, high);
                    open_run.push(SeriesPoint {
                        entry_id: entry.id,
                        day,
                        value: cfe.value.clone(),
                    });
                }
                None => close_run(&mut series.groups, &mut open_run, min_len),
            }
        }
        close_run(&mut series.groups, &mut open_run, min_len);

        series
    }
}

fn close_run(groups: &mut Vec<Vec<SeriesPoint>>, open_run: &mut Vec<SeriesPoint>, min_len: usize) {
    if open_run.len() >= min_len && !open_run.is_empty() {
        groups.push(std::mem::take(open_run));
    } else {
        open_run.clear();
    }
}

/// Both endpoints are folded into both ends of the domain, so an inverted
/// range from the server widens the domain instead of corrupting it.
fn fold_y(domain: &mut Option<(f64, f64)>, candidate: f64) {
    *domain = Some(match *domain {
        Some((min_y, max_y)) => (min_y.min(candidate), max_y.max(candidate)),
        None => (candidate, candidate),
    });
}

/// Kind-specific Y accessor: `(low, high)` for ranges, `(y, y)` for
/// scalars. Time maps to epoch milliseconds; a time range with `show_diff`
/// maps to its duration in milliseconds.
pub fn y_bounds(value: &FieldValue, config: &FieldConfig) -> (f64, f64) {
    match value {
        FieldValue::Integer { value } => (*value as f64, *value as f64),
        FieldValue::IntegerRange { low, high } => (*low as f64, *high as f64),
        FieldValue::Float { value } => (*value as f64, *value as f64),
        FieldValue::FloatRange { low, high } => (*low as f64, *high as f64),
        FieldValue::Time { value } => {
            let ms = value.timestamp_millis() as f64;
            (ms, ms)
        }
        FieldValue::TimeRange { low, high } => {
            if shows_diff(config) {
                let diff = (high.timestamp_millis() - low.timestamp_millis()) as f64;
                (diff, diff)
            } else {
                (
                    low.timestamp_millis() as f64,
                    high.timestamp_millis() as f64,
                )
            }
        }
    }
}

fn shows_diff(config: &FieldConfig) -> bool {
    matches!(config, FieldConfig::TimeRange { show_diff: true })
}

/// Render a Y axis tick for the given field schema. Durations (time range
/// in diff mode) format as duration strings, not clock times; absolute time
/// values format as clock times; everything else is numeric.
pub fn format_y_tick(config: &FieldConfig, y: f64) -> String {
    match config {
        FieldConfig::TimeRange { show_diff: true } => format_duration_ms(y as i64),
        FieldConfig::TimeRange { show_diff: false } => format_clock(y, false),
        FieldConfig::Time { as_12hr } => format_clock(y, *as_12hr),
        _ => {
            if y.fract().abs() < 1e-9 {
                format!("{}", y as i64)
            } else {
                format!("{:.2}", y)
            }
        }
    }
}

fn format_clock(epoch_ms: f64, as_12hr: bool) -> String {
    match DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64) {
        Some(dt) if as_12hr => dt.format("%I:%M %p").to_string(),
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "??:??".to_string(),
    }
}

/// Human-readable duration, largest two units: "2h 30m", "45m 10s", "3d 4h".
pub fn format_duration_ms(ms: i64) -> String {
    let total_secs = ms.abs() / 1000;
    let sign = if ms < 0 { "-" } else { "" };

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let formatted = if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    };

    format!("{}{}", sign, formatted)
}
