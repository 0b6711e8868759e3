use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator shared by [`FieldValue`] and [`FieldConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Integer,
    IntegerRange,
    Float,
    FloatRange,
    Time,
    TimeRange,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Integer,
        FieldKind::IntegerRange,
        FieldKind::Float,
        FieldKind::FloatRange,
        FieldKind::Time,
        FieldKind::TimeRange,
    ];

    /// A zero-valued entry value for this kind. Time kinds start at the
    /// current instant with `high == low` for the range variant.
    pub fn zero_value(self) -> FieldValue {
        match self {
            FieldKind::Integer => FieldValue::Integer { value: 0 },
            FieldKind::IntegerRange => FieldValue::IntegerRange { low: 0, high: 0 },
            FieldKind::Float => FieldValue::Float { value: 0.0 },
            FieldKind::FloatRange => FieldValue::FloatRange {
                low: 0.0,
                high: 0.0,
            },
            FieldKind::Time => FieldValue::Time { value: Utc::now() },
            FieldKind::TimeRange => {
                let now = Utc::now();
                FieldValue::TimeRange {
                    low: now,
                    high: now,
                }
            }
        }
    }

    /// Kind-appropriate default schema. Switching a field to a new kind goes
    /// through here, discarding any bounds from the previous kind.
    pub fn default_config(self) -> FieldConfig {
        match self {
            FieldKind::Integer => FieldConfig::Integer {
                minimum: None,
                maximum: None,
            },
            FieldKind::IntegerRange => FieldConfig::IntegerRange {
                minimum: None,
                maximum: None,
            },
            FieldKind::Float => FieldConfig::Float {
                minimum: None,
                maximum: None,
            },
            FieldKind::FloatRange => FieldConfig::FloatRange {
                minimum: None,
                maximum: None,
            },
            FieldKind::Time => FieldConfig::Time { as_12hr: false },
            FieldKind::TimeRange => FieldConfig::TimeRange { show_diff: false },
        }
    }
}

/// A field's per-entry value. Scalar kinds hold `value`, range kinds hold
/// `low`/`high`. The server does not enforce `low <= high`; consumers must
/// tolerate inverted ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldValue {
    Integer {
        value: i32,
    },
    IntegerRange {
        low: i32,
        high: i32,
    },

    Float {
        value: f32,
    },
    FloatRange {
        low: f32,
        high: f32,
    },

    Time {
        value: DateTime<Utc>,
    },
    TimeRange {
        low: DateTime<Utc>,
        high: DateTime<Utc>,
    },
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Integer { .. } => FieldKind::Integer,
            FieldValue::IntegerRange { .. } => FieldKind::IntegerRange,
            FieldValue::Float { .. } => FieldKind::Float,
            FieldValue::FloatRange { .. } => FieldKind::FloatRange,
            FieldValue::Time { .. } => FieldKind::Time,
            FieldValue::TimeRange { .. } => FieldKind::TimeRange,
        }
    }
}

/// A field's schema. Options that only apply to one kind live on that
/// variant, so comparing two configs never looks at irrelevant settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldConfig {
    Integer {
        minimum: Option<i32>,
        maximum: Option<i32>,
    },
    IntegerRange {
        minimum: Option<i32>,
        maximum: Option<i32>,
    },

    Float {
        minimum: Option<f32>,
        maximum: Option<f32>,
    },
    FloatRange {
        minimum: Option<f32>,
        maximum: Option<f32>,
    },

    Time {
        as_12hr: bool,
    },
    TimeRange {
        show_diff: bool,
    },
}

impl FieldConfig {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldConfig::Integer { .. } => FieldKind::Integer,
            FieldConfig::IntegerRange { .. } => FieldKind::IntegerRange,
            FieldConfig::Float { .. } => FieldKind::Float,
            FieldConfig::FloatRange { .. } => FieldKind::FloatRange,
            FieldConfig::Time { .. } => FieldKind::Time,
            FieldConfig::TimeRange { .. } => FieldKind::TimeRange,
        }
    }
}

/// A user-defined recurring measurement, e.g. "Mood" as Integer 1-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    pub config: FieldConfig,
    pub comment: Option<String>,
    pub owner: i64,
    pub order: i32,
}
