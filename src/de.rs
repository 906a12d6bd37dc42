//! JSON decoding with the path of the offending value in error messages.
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {source}")]
pub struct ParseError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ParseError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ParseError {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ParseError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| ParseError {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}
