//! Device domain entity

use serde::{Deserialize, Serialize};

/// A hardware device known to the registry.
///
/// None of the fields are validated: ids may repeat and `mac` / `firmware`
/// are free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub mac: String,
    pub firmware: String,
}

impl Device {
    pub fn new(id: i64, mac: impl Into<String>, firmware: impl Into<String>) -> Self {
        Self {
            id,
            mac: mac.into(),
            firmware: firmware.into(),
        }
    }
}

/// Devices the registry starts with when no seed is configured.
pub fn default_seed() -> Vec<Device> {
    vec![
        Device::new(1, "5F-22-CC-1F-43-82", "2.1.6"),
        Device::new(2, "EF-2B-C4-F5-D6-34", "2.1.6"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lowercase_field_names() {
        let device = Device::new(7, "AA-BB-CC-DD-EE-FF", "1.0.0");
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "mac": "AA-BB-CC-DD-EE-FF", "firmware": "1.0.0"})
        );
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = serde_json::from_str::<Device>(r#"{"id": 1, "mac": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("firmware"));
    }

    #[test]
    fn default_seed_keeps_order() {
        let seed = default_seed();
        let ids: Vec<i64> = seed.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
