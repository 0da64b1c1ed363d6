use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Oldest age accepted from form input.
const MAX_AGE_YEARS: u32 = 130;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("Age must be a whole number between 1 and 130: {0}")]
    InvalidAge(String),

    #[error("Weight must be a positive number of kilograms: {0}")]
    InvalidWeight(String),

    #[error("Height must be a positive number of centimetres: {0}")]
    InvalidHeight(String),

    #[error("Sex must be one of male, female, other: {0}")]
    InvalidSex(String),
}

/// Demographic profile filled in field by field during a session.
///
/// Every setter returns a new profile so readers never observe a
/// half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub sex: Option<Sex>,
}

/// A profile with every field present and valid. Narrative generation
/// accepts only this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: Sex,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(&self, age: u32) -> Self {
        Self {
            age: Some(age),
            ..self.clone()
        }
    }

    pub fn with_weight_kg(&self, weight_kg: f64) -> Self {
        Self {
            weight_kg: Some(weight_kg),
            ..self.clone()
        }
    }

    pub fn with_height_cm(&self, height_cm: f64) -> Self {
        Self {
            height_cm: Some(height_cm),
            ..self.clone()
        }
    }

    pub fn with_sex(&self, sex: Sex) -> Self {
        Self {
            sex: Some(sex),
            ..self.clone()
        }
    }

    /// Returns the validated profile when all four fields are usable.
    pub fn complete(&self) -> Option<CompleteProfile> {
        let age = self.age.filter(|a| (1..=MAX_AGE_YEARS).contains(a))?;
        let weight_kg = self.weight_kg.filter(|w| is_positive(*w))?;
        let height_cm = self.height_cm.filter(|h| is_positive(*h))?;
        let sex = self.sex?;
        Some(CompleteProfile {
            age,
            weight_kg,
            height_cm,
            sex,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}

impl From<CompleteProfile> for UserProfile {
    fn from(p: CompleteProfile) -> Self {
        Self {
            age: Some(p.age),
            weight_kg: Some(p.weight_kg),
            height_cm: Some(p.height_cm),
            sex: Some(p.sex),
        }
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

// ── Form input parsing ───────────────────────────────────

pub fn parse_age(input: &str) -> Result<u32, ProfileError> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|a| (1..=MAX_AGE_YEARS).contains(a))
        .ok_or_else(|| ProfileError::InvalidAge(input.to_string()))
}

pub fn parse_weight_kg(input: &str) -> Result<f64, ProfileError> {
    parse_positive(input).ok_or_else(|| ProfileError::InvalidWeight(input.to_string()))
}

pub fn parse_height_cm(input: &str) -> Result<f64, ProfileError> {
    parse_positive(input).ok_or_else(|| ProfileError::InvalidHeight(input.to_string()))
}

pub fn parse_sex(input: &str) -> Result<Sex, ProfileError> {
    input
        .trim()
        .to_lowercase()
        .parse::<Sex>()
        .map_err(|_| ProfileError::InvalidSex(input.to_string()))
}

fn parse_positive(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| is_positive(*v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> UserProfile {
        UserProfile::new()
            .with_age(42)
            .with_weight_kg(70.0)
            .with_height_cm(175.0)
            .with_sex(Sex::Female)
    }

    #[test]
    fn empty_profile_is_incomplete() {
        assert!(!UserProfile::new().is_complete());
    }

    #[test]
    fn all_fields_make_profile_complete() {
        let complete = full_profile().complete().unwrap();
        assert_eq!(complete.age, 42);
        assert_eq!(complete.sex, Sex::Female);
    }

    #[test]
    fn missing_any_field_is_incomplete() {
        let p = full_profile();
        assert!(!UserProfile { age: None, ..p.clone() }.is_complete());
        assert!(!UserProfile { weight_kg: None, ..p.clone() }.is_complete());
        assert!(!UserProfile { height_cm: None, ..p.clone() }.is_complete());
        assert!(!UserProfile { sex: None, ..p }.is_complete());
    }

    #[test]
    fn invalid_values_are_incomplete() {
        assert!(!full_profile().with_age(0).is_complete());
        assert!(!full_profile().with_weight_kg(-3.0).is_complete());
        assert!(!full_profile().with_height_cm(f64::NAN).is_complete());
    }

    #[test]
    fn setters_leave_original_untouched() {
        let original = UserProfile::new().with_age(30);
        let updated = original.with_sex(Sex::Male);
        assert_eq!(original.sex, None);
        assert_eq!(updated.age, Some(30));
        assert_eq!(updated.sex, Some(Sex::Male));
    }

    #[test]
    fn parses_form_values() {
        assert_eq!(parse_age(" 51 "), Ok(51));
        assert_eq!(parse_weight_kg("80.5"), Ok(80.5));
        assert_eq!(parse_height_cm("160"), Ok(160.0));
        assert_eq!(parse_sex("Female"), Ok(Sex::Female));
    }

    #[test]
    fn rejects_bad_form_values() {
        assert!(matches!(parse_age("abc"), Err(ProfileError::InvalidAge(_))));
        assert!(matches!(parse_age("0"), Err(ProfileError::InvalidAge(_))));
        assert!(matches!(parse_weight_kg("0"), Err(ProfileError::InvalidWeight(_))));
        assert!(matches!(parse_height_cm("tall"), Err(ProfileError::InvalidHeight(_))));
        assert!(matches!(parse_sex("x"), Err(ProfileError::InvalidSex(_))));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(full_profile()).unwrap();
        assert_eq!(json["weightKg"], 70.0);
        assert_eq!(json["heightCm"], 175.0);
        assert_eq!(json["sex"], "female");
    }
}
