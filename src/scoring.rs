//! Derived performance metrics
//!
//! Wilks scoring on the simplified single-polynomial coefficients,
//! IPF-style weight classes and competition age groups. All pure
//! functions; the store never calls the network for these.

use crate::models::Sex;

const WILKS_COEFFS_FEMALE: [f64; 6] = [
  -125.425539779,
  13.71219419,
  -0.03307250631,
  -0.001050400051,
  9.38773881e-06,
  -2.3334613e-08,
];

const WILKS_COEFFS_MALE: [f64; 6] = [
  -216.0475144,
  16.2606339,
  -0.002388645,
  -0.00113732,
  7.01863e-06,
  -1.291e-08,
];

const WEIGHT_CLASSES_FEMALE: [f64; 7] = [47.0, 52.0, 57.0, 63.0, 69.0, 76.0, 84.0];
const WEIGHT_CLASSES_MALE: [f64; 7] = [59.0, 66.0, 74.0, 83.0, 93.0, 105.0, 120.0];

/// Wilks score for a total at a given bodyweight. `Mx` athletes score on
/// the male coefficient set.
pub fn calculate_wilks(total_kg: f64, bodyweight_kg: f64, sex: Sex) -> f64 {
  let coeffs = match sex {
    Sex::F => &WILKS_COEFFS_FEMALE,
    Sex::M | Sex::Mx => &WILKS_COEFFS_MALE,
  };

  let mut coefficient = 0.0;
  for (i, c) in coeffs.iter().enumerate() {
    coefficient += c * bodyweight_kg.powi(i as i32);
  }

  total_kg * 500.0 / coefficient
}

/// Competition age-group label.
pub fn age_group(age: i64) -> &'static str {
  if age < 20 {
    "Junior"
  } else if age < 24 {
    "Sub-Junior"
  } else if age < 40 {
    "Open"
  } else if age < 50 {
    "Masters 1"
  } else if age < 60 {
    "Masters 2"
  } else if age < 70 {
    "Masters 3"
  } else {
    "Masters 4+"
  }
}

/// Simplified IPF weight class, e.g. `"74kg"` or `"120kg+"`. `Mx` uses
/// the male classes.
pub fn weight_class(bodyweight_kg: f64, sex: Sex) -> String {
  let classes = match sex {
    Sex::F => &WEIGHT_CLASSES_FEMALE,
    Sex::M | Sex::Mx => &WEIGHT_CLASSES_MALE,
  };

  for class in classes {
    if bodyweight_kg <= *class {
      return format!("{}kg", class);
    }
  }
  format!("{}kg+", classes[classes.len() - 1])
}
