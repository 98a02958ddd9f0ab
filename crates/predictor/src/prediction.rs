//! Provider response shapes.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A decoded provider response that yields one predicted attribute.
pub trait AttributePrediction: DeserializeOwned + Send {
    type Output: Send;

    /// Provider name used in logs and errors.
    const ATTRIBUTE: &'static str;

    fn extract(self) -> Self::Output;
}

/// `{"age": 30}`. Providers send `null` for unknown names.
#[derive(Debug, Clone, Deserialize)]
pub struct AgePrediction {
    #[serde(default)]
    pub age: Option<i32>,
}

impl AttributePrediction for AgePrediction {
    type Output = i32;
    const ATTRIBUTE: &'static str = "age";

    fn extract(self) -> i32 {
        self.age.unwrap_or_default()
    }
}

/// `{"gender": "male"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderPrediction {
    #[serde(default)]
    pub gender: Option<String>,
}

impl AttributePrediction for GenderPrediction {
    type Output = String;
    const ATTRIBUTE: &'static str = "gender";

    fn extract(self) -> String {
        self.gender.unwrap_or_default()
    }
}

/// One candidate country from the nationality provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryProbability {
    pub country_id: String,
    pub probability: f64,
}

/// `{"country": [{"country_id": "RU", "probability": 0.8}, ...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalityPrediction {
    #[serde(default)]
    pub country: Vec<CountryProbability>,
}

impl AttributePrediction for NationalityPrediction {
    type Output = String;
    const ATTRIBUTE: &'static str = "nationality";

    /// Most probable country; the first one wins on equal probability.
    /// Candidates with zero probability never win, so an empty or all-zero
    /// list yields an empty string.
    fn extract(self) -> String {
        let mut best: Option<CountryProbability> = None;
        let mut best_probability = 0.0;

        for candidate in self.country {
            if candidate.probability > best_probability {
                best_probability = candidate.probability;
                best = Some(candidate);
            }
        }

        best.map(|c| c.country_id).unwrap_or_default()
    }
}
