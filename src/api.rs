//! Snapshots produced by the register-reading and device-info services.

pub mod battery;
pub mod device_info;
pub mod registers;

pub use self::{
    battery::{BatteryId, BatterySnapshot},
    device_info::{DeviceInfo, ElectronicLabel},
    registers::{Cell, CellArray, ProcessedValue, Register, RegisterSnapshot},
};
