//! Backend seam for the okFrontPanel SDK.
//!
//! [`FrontPanel`] mirrors the operations of one vendor device handle. The
//! device layer only ever talks to hardware through this trait, so the SDK
//! stays an external collaborator and tests can run against a mock.

use std::path::Path;

/// Vendor return code for success.
pub const NO_ERROR: i32 = 0;

/// Vendor return code for a generic failure.
pub const FAILED: i32 = -1;

/// USB link speed reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsbSpeed {
    #[default]
    Unknown,
    Full,
    High,
    Super,
}

impl UsbSpeed {
    /// Map the SDK's `ok_USBSpeed` value. Unknown values map to `Unknown`.
    pub fn from_vendor(value: i32) -> UsbSpeed {
        match value {
            1 => UsbSpeed::Full,
            2 => UsbSpeed::High,
            3 => UsbSpeed::Super,
            _ => UsbSpeed::Unknown,
        }
    }
}

/// Identity of an opened device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    /// User-assigned device ID
    pub device_id: String,
    /// Factory serial number
    pub serial: String,
    /// Device firmware major version
    pub major_version: u32,
    /// Device firmware minor version
    pub minor_version: u32,
    /// USB link speed
    pub usb_speed: UsbSpeed,
}

/// One vendor device handle.
///
/// Methods returning `i32`/`i64` pass the vendor code through unchanged:
/// `0` (or a non-negative byte count) on success, negative on failure.
pub trait FrontPanel: Send {
    /// Whether the vendor library could be loaded.
    fn is_library_loaded(&self) -> bool;

    /// Number of attached devices.
    fn device_count(&mut self) -> usize;

    /// Serial number of the device at `index` in the attached list.
    fn device_list_serial(&mut self, index: usize) -> String;

    /// Open the device with the given serial.
    fn open_by_serial(&mut self, serial: &str) -> i32;

    /// Identity of the opened device.
    fn device_info(&mut self) -> DeviceInfo;

    /// Close the handle. Closing a closed handle is a no-op.
    fn close(&mut self);

    /// Whether the handle refers to an open device.
    fn is_open(&self) -> bool;

    /// Load the PLL configuration stored on the device.
    fn load_default_pll_configuration(&mut self) -> i32;

    /// Download a bitstream to the FPGA.
    fn configure_fpga(&mut self, firmware: &Path) -> i32;

    /// Whether the loaded design contains the FrontPanel host interface.
    fn is_front_panel_enabled(&mut self) -> bool;

    /// Transfer timeout in milliseconds.
    fn set_timeout(&mut self, timeout_ms: u32);

    /// Reset the FPGA logic.
    fn reset_fpga(&mut self) -> i32;

    /// Read the device ID from the device.
    fn device_id(&mut self) -> String;

    /// Store a new device ID on the device.
    fn set_device_id(&mut self, device_id: &str);

    /// Stage a wire-in value; sent by [`FrontPanel::update_wire_ins`].
    fn set_wire_in_value(&mut self, address: u32, value: u32) -> i32;

    /// Send all staged wire-in values.
    fn update_wire_ins(&mut self);

    /// Fetch all wire-out values from the device.
    fn update_wire_outs(&mut self);

    /// Wire-out value as of the last update.
    fn wire_out_value(&mut self, address: u32) -> u32;

    /// Write a register over the register bridge.
    fn write_register(&mut self, address: u32, value: u32) -> i32;

    /// Read a register over the register bridge.
    fn read_register(&mut self, address: u32) -> Result<u32, i32>;

    /// Write to a block pipe. `data.len()` is a multiple of `block_size`.
    fn write_to_block_pipe_in(&mut self, address: u32, block_size: usize, data: &[u8]) -> i64;

    /// Read from a block pipe. `data.len()` is a multiple of `block_size`.
    fn read_from_block_pipe_out(&mut self, address: u32, block_size: usize, data: &mut [u8])
        -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_speed_from_vendor() {
        assert_eq!(UsbSpeed::from_vendor(0), UsbSpeed::Unknown);
        assert_eq!(UsbSpeed::from_vendor(1), UsbSpeed::Full);
        assert_eq!(UsbSpeed::from_vendor(2), UsbSpeed::High);
        assert_eq!(UsbSpeed::from_vendor(3), UsbSpeed::Super);
        assert_eq!(UsbSpeed::from_vendor(17), UsbSpeed::Unknown);
    }
}
