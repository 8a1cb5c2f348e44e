//! Profile model and merge semantics
//!
//! A profile is the biographical + lifestyle snapshot for one identity.
//! Updates replace the prior snapshot in full, except that omitted fields
//! retain their prior value; lifestyle sub-fields merge independently with
//! the same rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender, informational only: the estimator does not weight it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Lifestyle flags feeding the estimator's adjustments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    pub smoker: bool,
    pub drinker: bool,
    pub regular_exercise: bool,
    pub healthy_diet: bool,
}

/// Per-identity biographical + lifestyle record
///
/// A profile with no birthdate is a valid partial profile: it can be
/// stored and returned, it just cannot be estimated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub country: Option<String>,
    pub lifestyle: Lifestyle,
}

/// Partial lifestyle update; omitted flags retain their prior value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleUpdate {
    pub smoker: Option<bool>,
    pub drinker: Option<bool>,
    pub regular_exercise: Option<bool>,
    pub healthy_diet: Option<bool>,
}

/// Partial profile update; omitted fields retain their prior value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub country: Option<String>,
    pub lifestyle: Option<LifestyleUpdate>,
}

impl Profile {
    /// Merge an update into this profile, retaining prior values where the
    /// update omits a field. Lifestyle sub-fields merge independently.
    pub fn merge(&self, update: &ProfileUpdate) -> Profile {
        let lifestyle = match &update.lifestyle {
            Some(ls) => Lifestyle {
                smoker: ls.smoker.unwrap_or(self.lifestyle.smoker),
                drinker: ls.drinker.unwrap_or(self.lifestyle.drinker),
                regular_exercise: ls.regular_exercise.unwrap_or(self.lifestyle.regular_exercise),
                healthy_diet: ls.healthy_diet.unwrap_or(self.lifestyle.healthy_diet),
            },
            None => self.lifestyle,
        };

        Profile {
            birthdate: update.birthdate.or(self.birthdate),
            gender: update.gender.or(self.gender),
            height_cm: update.height_cm.or(self.height_cm),
            weight_kg: update.weight_kg.or(self.weight_kg),
            country: update.country.clone().or_else(|| self.country.clone()),
            lifestyle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_profile() -> Profile {
        Profile {
            birthdate: Some(date(1990, 6, 15)),
            gender: Some(Gender::Female),
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
            country: Some("France".to_string()),
            lifestyle: Lifestyle {
                smoker: true,
                drinker: false,
                regular_exercise: true,
                healthy_diet: false,
            },
        }
    }

    #[test]
    fn test_merge_retains_prior_on_omit() {
        let prior = full_profile();
        let update = ProfileUpdate {
            weight_kg: Some(66.5),
            ..Default::default()
        };

        let merged = prior.merge(&update);

        assert_eq!(merged.weight_kg, Some(66.5));
        assert_eq!(merged.birthdate, prior.birthdate);
        assert_eq!(merged.gender, prior.gender);
        assert_eq!(merged.country, prior.country);
        assert_eq!(merged.lifestyle, prior.lifestyle);
    }

    #[test]
    fn test_lifestyle_subfields_merge_independently() {
        let prior = full_profile();
        let update = ProfileUpdate {
            lifestyle: Some(LifestyleUpdate {
                smoker: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = prior.merge(&update);

        assert!(!merged.lifestyle.smoker);
        assert!(!merged.lifestyle.drinker);
        assert!(merged.lifestyle.regular_exercise);
        assert!(!merged.lifestyle.healthy_diet);
    }

    #[test]
    fn test_merge_full_replacement() {
        let prior = full_profile();
        let update = ProfileUpdate {
            birthdate: Some(date(1985, 1, 1)),
            gender: Some(Gender::Male),
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            country: Some("Japan".to_string()),
            lifestyle: Some(LifestyleUpdate {
                smoker: Some(false),
                drinker: Some(true),
                regular_exercise: Some(false),
                healthy_diet: Some(true),
            }),
        };

        let merged = prior.merge(&update);

        assert_eq!(merged.birthdate, Some(date(1985, 1, 1)));
        assert_eq!(merged.gender, Some(Gender::Male));
        assert_eq!(merged.country, Some("Japan".to_string()));
        assert_eq!(
            merged.lifestyle,
            Lifestyle {
                smoker: false,
                drinker: true,
                regular_exercise: false,
                healthy_diet: true,
            }
        );
    }

    #[test]
    fn test_merge_into_empty_profile() {
        let prior = Profile::default();
        let update = ProfileUpdate {
            birthdate: Some(date(2000, 2, 29)),
            ..Default::default()
        };

        let merged = prior.merge(&update);

        assert_eq!(merged.birthdate, Some(date(2000, 2, 29)));
        assert_eq!(merged.gender, None);
        assert_eq!(merged.lifestyle, Lifestyle::default());
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let json = serde_json::to_value(full_profile()).unwrap();
        assert!(json.get("heightCm").is_some());
        assert!(json["lifestyle"].get("regularExercise").is_some());
        assert!(json["lifestyle"].get("healthyDiet").is_some());
    }
}
