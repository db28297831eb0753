use bon::Builder;
use serde::{Deserialize, Serialize};

/// Battery identifier: the dashboard uses Modbus slave IDs, older snapshots carry strings.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, derive_more::Display)]
#[serde(untagged)]
pub enum BatteryId {
    #[display("{_0}")]
    Number(u64),

    #[display("{_0}")]
    Text(String),
}

impl From<u64> for BatteryId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for BatteryId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// Live battery snapshot as polled by the dashboard.
#[must_use]
#[derive(Clone, Debug, Deserialize, Builder)]
pub struct BatterySnapshot {
    #[builder(into)]
    pub id: BatteryId,

    #[serde(default)]
    pub soc: Option<f64>,

    #[serde(default)]
    pub soh: Option<f64>,

    #[serde(default)]
    pub voltage: Option<f64>,

    #[serde(default)]
    pub current: Option<f64>,

    #[serde(default)]
    pub pack_voltage: Option<f64>,

    #[serde(default)]
    #[builder(into)]
    pub status: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub device_info: serde_json::Value,

    #[serde(default)]
    #[builder(default)]
    pub raw_values: serde_json::Value,

    #[serde(default)]
    #[builder(default)]
    pub last_updated: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn deserialize_battery_ok() -> Result {
        // language=json
        let body = r#"{
            "id": 214,
            "soc": 88,
            "soh": 97,
            "voltage": 53.12,
            "current": -4.5,
            "pack_voltage": 53.1,
            "status": "discharging",
            "device_info": {"model": "ESM-48150B1"},
            "raw_values": [5312, 5310, 65086, 88, 97],
            "last_updated": 1760774400
        }"#;
        let battery = serde_json::from_str::<BatterySnapshot>(body)?;
        assert_eq!(battery.id, BatteryId::Number(214));
        assert_eq!(battery.soh, Some(97.0));
        assert_eq!(battery.status.as_deref(), Some("discharging"));
        Ok(())
    }

    #[test]
    fn deserialize_minimal_battery_ok() -> Result {
        let battery = serde_json::from_str::<BatterySnapshot>(r#"{"id": "rack-1"}"#)?;
        assert_eq!(battery.id.to_string(), "rack-1");
        assert!(battery.soh.is_none());
        Ok(())
    }

    #[test]
    fn builder_ok() {
        let battery = BatterySnapshot::builder().id(3_u64).soh(95.0).build();
        assert_eq!(battery.id, BatteryId::Number(3));
        assert_eq!(battery.soh, Some(95.0));
        assert!(battery.device_info.is_null());
    }
}
