use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize an already-decoded value, keeping the path to the failing node
/// in the error message.
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at path {path} → {}", err.into_inner()))
        }
    }
}
