use serde::{Deserialize, Serialize};

/// Sex category as the prediction model understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
  M,
  F,
  Mx,
}

impl Sex {
  pub const ALL: [Sex; 3] = [Sex::M, Sex::F, Sex::Mx];
}

impl std::fmt::Display for Sex {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::M => write!(f, "M"),
      Self::F => write!(f, "F"),
      Self::Mx => write!(f, "Mx"),
    }
  }
}

impl std::str::FromStr for Sex {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "M" => Ok(Self::M),
      "F" => Ok(Self::F),
      "Mx" => Ok(Self::Mx),
      _ => Err(format!("Unknown sex category: {}", s)),
    }
  }
}

/// Equipment class. Serialized names match the competition rule sets
/// the backend was trained on, hyphens included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equipment {
  Raw,
  Wraps,
  #[serde(rename = "Single-ply")]
  SinglePly,
  #[serde(rename = "Multi-ply")]
  MultiPly,
  Straps,
  Unlimited,
}

impl Equipment {
  pub const ALL: [Equipment; 6] = [
    Equipment::Raw,
    Equipment::Wraps,
    Equipment::SinglePly,
    Equipment::MultiPly,
    Equipment::Straps,
    Equipment::Unlimited,
  ];
}

impl std::fmt::Display for Equipment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Raw => write!(f, "Raw"),
      Self::Wraps => write!(f, "Wraps"),
      Self::SinglePly => write!(f, "Single-ply"),
      Self::MultiPly => write!(f, "Multi-ply"),
      Self::Straps => write!(f, "Straps"),
      Self::Unlimited => write!(f, "Unlimited"),
    }
  }
}

impl std::str::FromStr for Equipment {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Raw" => Ok(Self::Raw),
      "Wraps" => Ok(Self::Wraps),
      "Single-ply" => Ok(Self::SinglePly),
      "Multi-ply" => Ok(Self::MultiPly),
      "Straps" => Ok(Self::Straps),
      "Unlimited" => Ok(Self::Unlimited),
      _ => Err(format!("Unknown equipment class: {}", s)),
    }
  }
}

/// Self-reported training background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Experience {
  Beginner,
  Intermediate,
  Advanced,
  Elite,
}

impl std::fmt::Display for Experience {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Beginner => write!(f, "Beginner"),
      Self::Intermediate => write!(f, "Intermediate"),
      Self::Advanced => write!(f, "Advanced"),
      Self::Elite => write!(f, "Elite"),
    }
  }
}

impl std::str::FromStr for Experience {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Beginner" => Ok(Self::Beginner),
      "Intermediate" => Ok(Self::Intermediate),
      "Advanced" => Ok(Self::Advanced),
      "Elite" => Ok(Self::Elite),
      _ => Err(format!("Unknown experience level: {}", s)),
    }
  }
}

/// An athlete as the prediction pipeline sees them. Semantic ranges
/// (age, bodyweight) are enforced by `validation`, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
  pub id: Option<String>,
  pub sex: Sex,
  pub age: i64,
  pub bodyweight: f64,
  pub equipment: Equipment,
  #[serde(rename = "weightClass")]
  pub weight_class: Option<String>,
  pub experience: Option<Experience>,
  pub goals: Option<Vec<String>>,
}

/// Best recorded lifts, used for personal-best snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteStats {
  pub squat: Option<f64>,
  pub bench: Option<f64>,
  pub deadlift: Option<f64>,
  pub total: f64,
  pub wilks: Option<f64>,
  pub date: Option<chrono::NaiveDate>,
}
