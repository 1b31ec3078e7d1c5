//! Device types known to the monitoring dashboard and the telemetry
//! parameters rendered for each of them.
//!
//! The table is a compile-time constant. Lookups never fail: an unknown
//! identifier is simply `None`.

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

/// A category of monitored equipment and its ordered telemetry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceType {
    /// Unique identifier, used as the catalog key.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Telemetry field names in display order.
    pub params: &'static [&'static str],
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DeviceType", 2)?;
        s.serialize_field("name", self.name)?;
        s.serialize_field("params", self.params)?;
        s.end()
    }
}

/// Returns the device type registered under `id`.
pub fn get_device_type(id: &str) -> Option<&'static DeviceType> {
    DEVICE_TYPES.iter().find(|item| item.id == id)
}

/// All device types in dataset order.
pub fn device_types() -> &'static [DeviceType] {
    DEVICE_TYPES
}

/// Whole catalog, serialized as `{ "<ID>": { "name": .., "params": [..] } }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DEVICE_TYPES.len()))?;
        for item in DEVICE_TYPES {
            map.serialize_entry(item.id, item)?;
        }
        map.end()
    }
}

/// Precision air conditioner.
pub const CONDITIONER: DeviceType = DeviceType {
    id: "CONDITIONER",
    name: "Кондиционеры",
    params: &[
        "airTemperature",
        "setpointAirTemperature",
        "supplyAirTemperature",
        "humidity",
        "setpointHumidity",
        "compressor1Status",
        "compressor2Status",
        "eev1Superheat",
        "eev2Superheat",
        "eev1ValveOpening",
        "eev2ValveOpening",
        "humidifierRunning",
        "fan1Running",
        "fan1Speed",
        "maintenanceDate",
        "OnOff",
    ],
};

/// Diesel generator set.
pub const DGU: DeviceType = DeviceType {
    id: "DGU",
    name: "ДГУ",
    params: &[
        "genVoltageL1N",
        "genVoltageL2N",
        "genVoltageL3N",
        "genVoltageL1L2",
        "genVoltageL2L3",
        "genVoltageL1L3",
        "genCurrentL1",
        "genCurrentL2",
        "genCurrentL3",
        "activePowerTotal",
        "reactivePowerTotal",
        "PF",
        "activePowerL1",
        "activePowerL2",
        "activePowerL3",
        "reactivePowerL1",
        "reactivePowerL2",
        "reactivePowerL3",
        "PFL1",
        "PFL2",
        "PFL3",
        "engineSpeed",
        "genFrequency",
        "batteryVoltage",
        "oilPressure",
        "coolantTemp",
        "fuelLevel",
        "gensetMode",
    ],
};

/// Power-quality meter.
pub const MIPS: DeviceType = DeviceType {
    id: "MIPS",
    name: "МИПС",
    params: &[
        "voltageL1",
        "voltageL2",
        "voltageL3",
        "currentTotal",
        "currentL1",
        "currentL2",
        "currentL3",
        "fullPowerTotal",
        "fullPowerL1",
        "fullPowerL2",
        "fullPowerL3",
        "activePowerTotal",
        "activePowerL1",
        "activePowerL2",
        "activePowerL3",
        "reactivePowerTotal",
        "reactivePowerL1",
        "reactivePowerL2",
        "reactivePowerL3",
    ],
};

/// Input voltage presence monitor.
pub const USDD: DeviceType = DeviceType {
    id: "USDD",
    name: "УСДД",
    params: &[
        "input1VoltageAvailable",
        "input2VoltageAvailable",
        "dguVoltageAvailable",
    ],
};

/// Alarm journal records.
pub const ALARMS: DeviceType = DeviceType {
    id: "ALARMS",
    name: "Alarms",
    params: &["ackTs", "clearTs", "type", "startTs", "status"],
};

static DEVICE_TYPES: &[DeviceType] = &[CONDITIONER, DGU, MIPS, USDD, ALARMS];
