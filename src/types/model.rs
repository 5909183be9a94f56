use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model or a custom string value for models that may
/// be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for newer, tuned, or preview models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 1.5 Flash
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,

    /// Gemini 1.5 Flash-8B
    #[serde(rename = "gemini-1.5-flash-8b")]
    Gemini15Flash8b,

    /// Gemini 1.5 Pro
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.0 Flash-Lite
    #[serde(rename = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Flash-Lite
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl KnownModel {
    const ALL: [KnownModel; 8] = [
        KnownModel::Gemini15Flash,
        KnownModel::Gemini15Flash8b,
        KnownModel::Gemini15Pro,
        KnownModel::Gemini20Flash,
        KnownModel::Gemini20FlashLite,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25FlashLite,
        KnownModel::Gemini25Pro,
    ];

    /// The identifier used in API paths, e.g. `gemini-1.5-flash`.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini15Flash => "gemini-1.5-flash",
            KnownModel::Gemini15Flash8b => "gemini-1.5-flash-8b",
            KnownModel::Gemini15Pro => "gemini-1.5-pro",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini20FlashLite => "gemini-2.0-flash-lite",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The API accepts both `gemini-1.5-flash` and `models/gemini-1.5-flash`.
        let s = s.strip_prefix("models/").unwrap_or(s);
        KnownModel::ALL
            .iter()
            .find(|known| known.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("models/").unwrap_or(s);
        Ok(s.parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini15Flash);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-1.5-flash""#);
    }

    #[test]
    fn custom_model_serialization() {
        let model = Model::Custom("gemini-exp-1206".to_string());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-exp-1206""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-2.5-pro""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini25Pro));

        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn parse_known_and_custom() {
        let model: Model = "gemini-2.0-flash".parse().unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini20Flash));

        let model: Model = "models/gemini-1.5-pro".parse().unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini15Pro));

        let model: Model = "my-tuned-model".parse().unwrap();
        assert_eq!(model, Model::Custom("my-tuned-model".to_string()));
    }

    #[test]
    fn parse_strips_models_prefix_from_custom() {
        let model: Model = "models/my-tuned-model".parse().unwrap();
        assert_eq!(model, Model::Custom("my-tuned-model".to_string()));
    }

    #[test]
    fn display_round_trips_every_known_model() {
        for known in KnownModel::ALL {
            let parsed: KnownModel = known.to_string().parse().unwrap();
            assert_eq!(parsed, known);
        }
    }
}
