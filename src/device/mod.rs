//! Host-side FrontPanel device handling.
//!
//! [`FpDevice`] wraps one [`FrontPanel`] backend handle and adds the
//! bookkeeping around it: open/configure sequencing, connection checks,
//! block-pipe padding, close-on-failure and the last error message.

use std::path::Path;
use std::time::Duration;

pub mod backend;
pub mod error;
#[cfg(feature = "vendor-sdk")]
pub mod ffi;
pub mod log;
pub mod pipe;
pub mod session;

pub use backend::{DeviceInfo, FrontPanel, UsbSpeed};
pub use error::{DeviceError, DeviceResult};
pub use log::{DeviceLog, LogLevel};
pub use session::{Session, SessionError};

use backend::{FAILED, NO_ERROR};

/// Default block size for pipe transfers.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Serial and device ID of an attached device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListing {
    pub serial: String,
    pub device_id: String,
}

/// Serials of all attached devices.
pub fn list_devices(backend: &mut impl FrontPanel) -> Vec<String> {
    (0..backend.device_count())
        .map(|i| backend.device_list_serial(i))
        .collect()
}

/// Serial and device ID of every attached device that can be opened.
///
/// Devices that fail to open (typically held by another process) are skipped.
pub fn list_devices_info(backend: &mut impl FrontPanel) -> Vec<DeviceListing> {
    let mut devices = Vec::new();
    for serial in list_devices(backend) {
        if backend.open_by_serial(&serial) != NO_ERROR {
            tracing::debug!("skipping device {}: cannot open", serial);
            continue;
        }
        let info = backend.device_info();
        backend.close();
        devices.push(DeviceListing {
            serial,
            device_id: info.device_id,
        });
    }
    devices
}

/// Device ID of the device with `serial`, or `None` if it cannot be opened.
pub fn device_id_of(backend: &mut impl FrontPanel, serial: &str) -> Option<String> {
    if backend.open_by_serial(serial) != NO_ERROR {
        return None;
    }
    let info = backend.device_info();
    backend.close();
    Some(info.device_id)
}

/// One FrontPanel device.
#[derive(Debug)]
pub struct FpDevice<B: FrontPanel> {
    backend: B,
    connected: bool,
    serial: String,
    device_id: String,
    firmware_version: String,
    usb3: bool,
    close_on_failure: bool,
    last_error: Option<String>,
}

impl<B: FrontPanel> FpDevice<B> {
    /// Wrap a backend handle. The device starts closed.
    pub fn new(backend: B) -> Self {
        FpDevice {
            backend,
            connected: false,
            serial: String::new(),
            device_id: String::new(),
            firmware_version: String::new(),
            usb3: false,
            close_on_failure: false,
            last_error: None,
        }
    }

    /// Open the device with `serial`, optionally downloading `firmware`.
    ///
    /// The device is left closed on every error path.
    pub fn open(&mut self, serial: &str, firmware: Option<&Path>) -> DeviceResult<()> {
        if self.connected {
            return Err(self.fail(DeviceError::AlreadyOpened));
        }

        if !self.backend.is_library_loaded() {
            return Err(self.fail(DeviceError::LibraryNotFound));
        }

        if self.backend.open_by_serial(serial) != NO_ERROR {
            return Err(self.fail(DeviceError::CannotOpen {
                serial: serial.to_string(),
            }));
        }
        self.connected = true;

        let info = self.backend.device_info();
        self.firmware_version = format!("Firmware {}.{}", info.major_version, info.minor_version);
        self.device_id = info.device_id;
        self.serial = info.serial;
        self.usb3 = info.usb_speed == UsbSpeed::Super;

        self.backend.load_default_pll_configuration();

        if let Some(firmware) = firmware {
            if self.backend.configure_fpga(firmware) != NO_ERROR {
                self.close();
                return Err(self.fail(DeviceError::FpgaConfigFailed {
                    firmware: firmware.to_path_buf(),
                }));
            }
            tracing::debug!("configured FPGA with {}", firmware.display());
        }

        if !self.backend.is_front_panel_enabled() {
            self.close();
            return Err(self.fail(DeviceError::FrontPanelNotEnabled));
        }

        tracing::info!(
            "opened device {} ({}, {})",
            self.serial,
            self.device_id,
            self.firmware_version
        );
        Ok(())
    }

    /// Close the device. Closing a closed device is a no-op.
    pub fn close(&mut self) {
        if self.connected {
            self.backend.close();
            self.connected = false;
            tracing::debug!("closed device {}", self.serial);
        }
    }

    /// Whether the device is open.
    pub fn is_open(&self) -> bool {
        self.connected && self.backend.is_open()
    }

    /// Close the device after a vendor `Failed` code.
    pub fn set_close_on_failure(&mut self, close_on_failure: bool) {
        self.close_on_failure = close_on_failure;
    }

    /// Reset the FPGA logic.
    pub fn reset(&mut self) -> DeviceResult<()> {
        self.ensure_connected()?;
        let rc = self.backend.reset_fpga();
        self.check(rc as i64).map(|_| ())
    }

    /// Set the transfer timeout.
    pub fn set_timeout(&mut self, timeout: Duration) -> DeviceResult<()> {
        self.ensure_connected()?;
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        self.backend.set_timeout(millis);
        Ok(())
    }

    /// Read the device ID from the device.
    pub fn read_device_id(&mut self) -> DeviceResult<String> {
        self.ensure_connected()?;
        Ok(self.backend.device_id())
    }

    /// Store a new device ID on the device.
    pub fn set_device_id(&mut self, device_id: &str) -> DeviceResult<()> {
        self.ensure_connected()?;
        self.backend.set_device_id(device_id);
        Ok(())
    }

    /// Set a wire-in value, sending all staged wire-ins when `send_now`.
    pub fn set_wire_in(&mut self, address: u32, value: u32, send_now: bool) -> DeviceResult<()> {
        self.ensure_connected()?;
        let rc = self.backend.set_wire_in_value(address, value);
        if rc == FAILED && self.close_on_failure {
            self.close();
            return Err(self.fail(DeviceError::Vendor(rc as i64)));
        }
        if send_now {
            self.backend.update_wire_ins();
        }
        self.check(rc as i64).map(|_| ())
    }

    /// Read a wire-out value, fetching fresh values first when `refresh`.
    pub fn wire_out(&mut self, address: u32, refresh: bool) -> DeviceResult<u32> {
        self.ensure_connected()?;
        if refresh {
            self.backend.update_wire_outs();
        }
        Ok(self.backend.wire_out_value(address))
    }

    /// Write a register.
    pub fn write_register(&mut self, address: u32, value: u32) -> DeviceResult<()> {
        self.ensure_connected()?;
        let rc = self.backend.write_register(address, value);
        self.check(rc as i64).map(|_| ())
    }

    /// Read a register.
    pub fn read_register(&mut self, address: u32) -> DeviceResult<u32> {
        self.ensure_connected()?;
        match self.backend.read_register(address) {
            Ok(value) => Ok(value),
            Err(rc) => self.check(rc as i64).map(|_| 0),
        }
    }

    /// Write `data` to the block pipe at `address`.
    ///
    /// Lengths that are not a multiple of `block_size` are zero-padded.
    /// Returns the byte count reported by the device.
    pub fn write_pipe(&mut self, address: u32, data: &[u8], block_size: usize) -> DeviceResult<usize> {
        self.ensure_connected()?;
        let padded = pipe::padded_len(data.len(), block_size).map_err(|e| self.fail(e))?;

        let rc = if padded == data.len() {
            self.backend.write_to_block_pipe_in(address, block_size, data)
        } else {
            let staged = pipe::staged(data, padded);
            self.backend.write_to_block_pipe_in(address, block_size, &staged)
        };

        self.check(rc).map(|n| n as usize)
    }

    /// Fill `buf` from the block pipe at `address`.
    ///
    /// Lengths that are not a multiple of `block_size` are read through a
    /// padded buffer; only `buf.len()` bytes are copied back.
    pub fn read_pipe(&mut self, address: u32, buf: &mut [u8], block_size: usize) -> DeviceResult<usize> {
        self.ensure_connected()?;
        let padded = pipe::padded_len(buf.len(), block_size).map_err(|e| self.fail(e))?;

        if padded == buf.len() {
            let rc = self.backend.read_from_block_pipe_out(address, block_size, buf);
            return self.check(rc).map(|n| n as usize);
        }

        let mut staged = vec![0u8; padded];
        let rc = self
            .backend
            .read_from_block_pipe_out(address, block_size, &mut staged);
        let read = self.check(rc)? as usize;
        let copied = read.min(buf.len());
        buf[..copied].copy_from_slice(&staged[..copied]);
        Ok(copied)
    }

    /// Serial number recorded at open.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Device ID recorded at open.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Firmware string recorded at open, e.g. `Firmware 1.4`.
    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }

    /// Whether the device is attached at USB 3 speed.
    pub fn is_usb3_speed(&self) -> bool {
        self.usb3
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_connected(&mut self) -> DeviceResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(self.fail(DeviceError::NotConnected))
        }
    }

    /// Map a vendor code, closing the device on `Failed` when configured.
    fn check(&mut self, rc: i64) -> DeviceResult<i64> {
        if rc >= 0 {
            return Ok(rc);
        }
        if rc == FAILED as i64 && self.close_on_failure {
            self.close();
        }
        Err(self.fail(DeviceError::Vendor(rc)))
    }

    fn fail(&mut self, err: DeviceError) -> DeviceError {
        tracing::debug!("device error: {}", err);
        self.last_error = Some(err.to_string());
        err
    }
}

impl<B: FrontPanel> Drop for FpDevice<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::test_support::MockFrontPanel;

    const SERIAL: &str = "1740000JJK";

    fn opened(mock: &MockFrontPanel) -> FpDevice<MockFrontPanel> {
        let mut dev = FpDevice::new(mock.clone());
        dev.open(SERIAL, None).unwrap();
        dev
    }

    #[test]
    fn test_list_devices_skips_busy() {
        let mut mock = MockFrontPanel::new()
            .with_device("A1", "XEM7310")
            .with_busy_device("B2", "XEM7360")
            .with_device("C3", "XEM8310");

        assert_eq!(list_devices(&mut mock), vec!["A1", "B2", "C3"]);

        let info = list_devices_info(&mut mock);
        assert_eq!(info.len(), 2);
        assert_eq!(info[1].serial, "C3");
        assert_eq!(info[1].device_id, "XEM8310");
        assert!(mock.state().opened.is_none());
    }

    #[test]
    fn test_device_id_of() {
        let mut mock = MockFrontPanel::new().with_device("A1", "board-a");
        assert_eq!(device_id_of(&mut mock, "A1").as_deref(), Some("board-a"));
        assert_eq!(device_id_of(&mut mock, "nope"), None);
    }

    #[test]
    fn test_open_records_identity() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let dev = opened(&mock);

        assert!(dev.is_open());
        assert_eq!(dev.serial(), SERIAL);
        assert_eq!(dev.device_id(), "counter");
        assert_eq!(dev.firmware_version(), "Firmware 1.4");
        assert!(dev.is_usb3_speed());
        assert!(mock.state().pll_loaded);
    }

    #[test]
    fn test_open_twice() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        let err = dev.open(SERIAL, None).unwrap_err();
        assert_eq!(err, DeviceError::AlreadyOpened);
        assert_eq!(err.code(), -101);
        assert!(dev.is_open());
    }

    #[test]
    fn test_open_unknown_serial() {
        let mock = MockFrontPanel::new();
        let mut dev = FpDevice::new(mock);
        let err = dev.open("missing", None).unwrap_err();
        assert_eq!(err.code(), DeviceError::CANNOT_OPEN);
        assert!(!dev.is_open());
        assert!(dev.last_error().unwrap().contains("missing"));
    }

    #[test]
    fn test_open_without_library() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .without_library();
        let mut dev = FpDevice::new(mock.clone());
        let err = dev.open(SERIAL, None).unwrap_err();
        assert_eq!(err, DeviceError::LibraryNotFound);
        assert_eq!(err.code(), -100);
        assert!(!dev.is_open());
        assert!(mock.state().opened.is_none());
    }

    #[test]
    fn test_open_with_firmware() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = FpDevice::new(mock.clone());
        dev.open(SERIAL, Some(Path::new("counter.bit"))).unwrap();
        assert_eq!(
            mock.state().configured_with,
            Some(PathBuf::from("counter.bit"))
        );
    }

    #[test]
    fn test_open_configuration_failure_closes() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .failing_configuration();
        let mut dev = FpDevice::new(mock.clone());
        let err = dev.open(SERIAL, Some(Path::new("bad.bit"))).unwrap_err();
        assert_eq!(err.code(), DeviceError::FPGA_CONFIG_FAILED);
        assert!(!dev.is_open());
        assert!(mock.state().opened.is_none());
    }

    #[test]
    fn test_open_without_front_panel_closes() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .without_front_panel();
        let mut dev = FpDevice::new(mock.clone());
        let err = dev.open(SERIAL, None).unwrap_err();
        assert_eq!(err, DeviceError::FrontPanelNotEnabled);
        assert!(!dev.is_open());
        assert_eq!(mock.state().close_calls, 1);
    }

    #[test]
    fn test_operations_require_connection() {
        let mut dev = FpDevice::new(MockFrontPanel::new());
        assert_eq!(dev.reset(), Err(DeviceError::NotConnected));
        assert_eq!(dev.wire_out(0x20, true), Err(DeviceError::NotConnected));
        assert_eq!(dev.read_register(0), Err(DeviceError::NotConnected));
        assert_eq!(
            dev.write_pipe(0x80, &[1, 2, 3], 16),
            Err(DeviceError::NotConnected)
        );
        let mut buf = [0u8; 4];
        assert_eq!(dev.read_pipe(0xa0, &mut buf, 4), Err(DeviceError::NotConnected));
        assert_eq!(
            dev.set_timeout(Duration::from_secs(1)),
            Err(DeviceError::NotConnected)
        );
        assert_eq!(dev.read_device_id(), Err(DeviceError::NotConnected));
        assert_eq!(dev.set_device_id("x"), Err(DeviceError::NotConnected));
        assert_eq!(dev.set_wire_in(0, 1, true), Err(DeviceError::NotConnected));
        assert_eq!(dev.last_error(), Some("device not connected"));
    }

    #[test]
    fn test_wires() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .with_wire_out(0x20, 0xdead_beef);
        let mut dev = opened(&mock);

        dev.set_wire_in(0x00, 5, false).unwrap();
        assert!(mock.state().wire_ins.is_empty());
        dev.set_wire_in(0x01, 7, true).unwrap();
        assert_eq!(mock.state().wire_ins.get(&0x00), Some(&5));
        assert_eq!(mock.state().wire_ins.get(&0x01), Some(&7));

        assert_eq!(dev.wire_out(0x20, true).unwrap(), 0xdead_beef);
        assert_eq!(dev.wire_out(0x20, false).unwrap(), 0xdead_beef);
        assert_eq!(mock.state().wire_out_updates, 1);
    }

    #[test]
    fn test_registers() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        dev.write_register(0x1000, 42).unwrap();
        assert_eq!(dev.read_register(0x1000).unwrap(), 42);
        assert_eq!(dev.read_register(0x2000).unwrap(), 0);
    }

    #[test]
    fn test_write_pipe_pads_to_block() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);

        let n = dev.write_pipe(0x80, &[1, 2, 3, 4, 5], 4).unwrap();
        assert_eq!(n, 8);
        let state = mock.state();
        assert_eq!(state.pipe_writes[0], (0x80, 4, vec![1, 2, 3, 4, 5, 0, 0, 0]));
    }

    #[test]
    fn test_write_pipe_exact_multiple() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        dev.write_pipe(0x80, &[9; 8], 4).unwrap();
        assert_eq!(mock.state().pipe_writes[0].2, vec![9; 8]);
    }

    #[test]
    fn test_read_pipe_copies_requested_length() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .with_pipe_out(0xa0, (1..=16).collect());
        let mut dev = opened(&mock);

        let mut buf = [0u8; 6];
        let n = dev.read_pipe(0xa0, &mut buf, 4).unwrap();
        assert_eq!(n, 6);
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
        assert_eq!(mock.state().pipe_read_lengths, vec![8]);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        let err = dev.write_pipe(0x80, &[1], 0).unwrap_err();
        assert_eq!(err, DeviceError::InvalidBlockSize);
        assert!(dev.is_open());
    }

    #[test]
    fn test_failure_without_close_on_failure() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .failing_transfers();
        let mut dev = opened(&mock);

        assert_eq!(dev.write_register(1, 1), Err(DeviceError::Vendor(-1)));
        assert!(dev.is_open());
    }

    #[test]
    fn test_close_on_failure() {
        let mock = MockFrontPanel::new()
            .with_device(SERIAL, "counter")
            .failing_transfers();
        let mut dev = opened(&mock);
        dev.set_close_on_failure(true);

        let err = dev.set_wire_in(0, 1, true).unwrap_err();
        assert_eq!(err.code(), -1);
        assert!(!dev.is_open());
        assert_eq!(mock.state().wire_in_updates, 0);
        assert_eq!(dev.read_register(0), Err(DeviceError::NotConnected));
    }

    #[test]
    fn test_timeout_and_reset() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        dev.set_timeout(Duration::from_millis(2500)).unwrap();
        dev.reset().unwrap();
        assert_eq!(mock.state().timeout_ms, Some(2500));
        assert_eq!(mock.state().resets, 1);
    }

    #[test]
    fn test_device_id_roundtrip() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        dev.set_device_id("renamed").unwrap();
        assert_eq!(dev.read_device_id().unwrap(), "renamed");
        assert_eq!(dev.device_id(), "counter");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mock = MockFrontPanel::new().with_device(SERIAL, "counter");
        let mut dev = opened(&mock);
        dev.close();
        dev.close();
        assert_eq!(mock.state().close_calls, 1);
        drop(dev);
        assert_eq!(mock.state().close_calls, 1);
    }
}
