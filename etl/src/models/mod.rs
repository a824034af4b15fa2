use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One movie entry exactly as the provider returned it.
///
/// The shape belongs to the upstream API and may drift, so nothing is
/// checked until the record is transformed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMovieRecord(Map<String, Value>);

impl RawMovieRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl TryFrom<Value> for RawMovieRecord {
    type Error = common::Error;

    fn try_from(value: Value) -> common::Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(common::Error::InvalidInput(format!(
                "expected a JSON object for a movie record, got {}",
                other
            ))),
        }
    }
}
