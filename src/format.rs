//! Display formatting for weights, scores, deltas and dates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const KG_TO_LBS: f64 = 2.20462;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
  Kg,
  Lbs,
}

/// `"182.5 kg"` or `"402.3 lbs"`.
pub fn format_weight(weight_kg: f64, unit: Unit) -> String {
  match unit {
    Unit::Kg => format!("{:.1} kg", weight_kg),
    Unit::Lbs => format!("{:.1} lbs", weight_kg * KG_TO_LBS),
  }
}

pub fn format_wilks(wilks: f64) -> String {
  format!("{:.1}", wilks)
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
  format!("{:.*}%", decimals, value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaColor {
  Success,
  Danger,
  Muted,
}

/// A signed difference plus the tone the UI should render it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedDelta {
  pub text: String,
  pub color: DeltaColor,
}

/// `+12.5 kg` beat the prediction, `-3.0 kg` missed it, `0.0 kg` tied.
pub fn format_delta(delta: f64, unit: &str) -> FormattedDelta {
  let sign = if delta > 0.0 {
    "+"
  } else if delta < 0.0 {
    "-"
  } else {
    ""
  };
  let color = if delta > 0.0 {
    DeltaColor::Success
  } else if delta < 0.0 {
    DeltaColor::Danger
  } else {
    DeltaColor::Muted
  };

  FormattedDelta {
    text: format!("{}{:.1} {}", sign, delta.abs(), unit),
    color,
  }
}

/// `"May 15, 2024"`.
pub fn format_date(date: NaiveDate) -> String {
  date.format("%b %-d, %Y").to_string()
}

/// Relative label for a past date: `"Today"`, `"Yesterday"`, then day,
/// week, month and year granularity.
pub fn format_relative_date(date: NaiveDate, today: NaiveDate) -> String {
  let diff_days = (today - date).num_days();

  if diff_days == 0 {
    return "Today".to_string();
  }
  if diff_days == 1 {
    return "Yesterday".to_string();
  }
  if diff_days < 7 {
    return format!("{} days ago", diff_days);
  }
  if diff_days < 30 {
    return format!("{} weeks ago", diff_days / 7);
  }
  if diff_days < 365 {
    return format!("{} months ago", diff_days / 30);
  }
  format!("{} years ago", diff_days / 365)
}
