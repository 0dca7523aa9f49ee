//! Test utilities and mocks for fpdev unit tests.
//!
//! Provides an in-memory [`FrontPanel`] implementation so the device layer
//! and sessions can be exercised without hardware or the vendor SDK.
//!
//! # Example
//!
//! ```rust,ignore
//! use fpdev::test_support::MockFrontPanel;
//!
//! let mock = MockFrontPanel::new().with_device("1740000ABC", "XEM7310");
//! let mut dev = FpDevice::new(mock.clone());
//! dev.open("1740000ABC", None)?;
//! assert!(mock.state().pll_loaded);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::backend::{DeviceInfo, FrontPanel, UsbSpeed, FAILED, NO_ERROR};

/// An attached mock device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub serial: String,
    pub device_id: String,
    /// Whether `open_by_serial` succeeds
    pub openable: bool,
}

/// Observable state of a [`MockFrontPanel`].
#[derive(Debug)]
pub struct MockState {
    pub devices: Vec<MockDevice>,
    /// Index of the opened device
    pub opened: Option<usize>,
    pub library_loaded: bool,
    pub front_panel_enabled: bool,
    pub fail_configuration: bool,
    pub fail_transfers: bool,
    pub pll_loaded: bool,
    pub configured_with: Option<PathBuf>,
    pub timeout_ms: Option<u32>,
    pub resets: usize,
    pub close_calls: usize,
    /// Staged wire-in values
    pub staged_wire_ins: HashMap<u32, u32>,
    /// Wire-in values sent to the device
    pub wire_ins: HashMap<u32, u32>,
    pub wire_in_updates: usize,
    pub wire_outs: HashMap<u32, u32>,
    pub wire_out_updates: usize,
    pub registers: HashMap<u32, u32>,
    /// Every block-pipe write as (address, block size, data)
    pub pipe_writes: Vec<(u32, usize, Vec<u8>)>,
    /// Data served by block-pipe reads per address
    pub pipe_out: HashMap<u32, Vec<u8>>,
    /// Length of every block-pipe read request
    pub pipe_read_lengths: Vec<usize>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            devices: Vec::new(),
            opened: None,
            library_loaded: true,
            front_panel_enabled: true,
            fail_configuration: false,
            fail_transfers: false,
            pll_loaded: false,
            configured_with: None,
            timeout_ms: None,
            resets: 0,
            close_calls: 0,
            staged_wire_ins: HashMap::new(),
            wire_ins: HashMap::new(),
            wire_in_updates: 0,
            wire_outs: HashMap::new(),
            wire_out_updates: 0,
            registers: HashMap::new(),
            pipe_writes: Vec::new(),
            pipe_out: HashMap::new(),
            pipe_read_lengths: Vec::new(),
        }
    }
}

/// In-memory FrontPanel backend.
///
/// Clones share state, so a test can keep one handle for inspection after
/// moving another into a device.
#[derive(Debug, Clone, Default)]
pub struct MockFrontPanel {
    state: Arc<Mutex<MockState>>,
}

impl MockFrontPanel {
    /// Create a backend with no devices attached.
    pub fn new() -> Self {
        MockFrontPanel::default()
    }

    /// Attach a device that can be opened.
    pub fn with_device(self, serial: &str, device_id: &str) -> Self {
        self.state().devices.push(MockDevice {
            serial: serial.to_string(),
            device_id: device_id.to_string(),
            openable: true,
        });
        self
    }

    /// Attach a device that refuses to open (e.g. in use by another process).
    pub fn with_busy_device(self, serial: &str, device_id: &str) -> Self {
        self.state().devices.push(MockDevice {
            serial: serial.to_string(),
            device_id: device_id.to_string(),
            openable: false,
        });
        self
    }

    /// Report the vendor library as missing.
    pub fn without_library(self) -> Self {
        self.state().library_loaded = false;
        self
    }

    /// Make FPGA configuration fail.
    pub fn failing_configuration(self) -> Self {
        self.state().fail_configuration = true;
        self
    }

    /// Report the FrontPanel interface as missing.
    pub fn without_front_panel(self) -> Self {
        self.state().front_panel_enabled = false;
        self
    }

    /// Make every transfer return `FAILED`.
    pub fn failing_transfers(self) -> Self {
        self.state().fail_transfers = true;
        self
    }

    /// Serve `data` from the pipe-out endpoint at `address`.
    pub fn with_pipe_out(self, address: u32, data: Vec<u8>) -> Self {
        self.state().pipe_out.insert(address, data);
        self
    }

    /// Set a wire-out value.
    pub fn with_wire_out(self, address: u32, value: u32) -> Self {
        self.state().wire_outs.insert(address, value);
        self
    }

    /// Lock and inspect the shared state.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn transfer_code(&self) -> i32 {
        if self.state().fail_transfers {
            FAILED
        } else {
            NO_ERROR
        }
    }
}

impl FrontPanel for MockFrontPanel {
    fn is_library_loaded(&self) -> bool {
        self.state().library_loaded
    }

    fn device_count(&mut self) -> usize {
        self.state().devices.len()
    }

    fn device_list_serial(&mut self, index: usize) -> String {
        self.state()
            .devices
            .get(index)
            .map(|d| d.serial.clone())
            .unwrap_or_default()
    }

    fn open_by_serial(&mut self, serial: &str) -> i32 {
        let mut state = self.state();
        let found = state
            .devices
            .iter()
            .position(|d| d.serial == serial && d.openable);
        match found {
            Some(index) => {
                state.opened = Some(index);
                NO_ERROR
            }
            None => -9,
        }
    }

    fn device_info(&mut self) -> DeviceInfo {
        let state = self.state();
        match state.opened.and_then(|i| state.devices.get(i)) {
            Some(dev) => DeviceInfo {
                device_id: dev.device_id.clone(),
                serial: dev.serial.clone(),
                major_version: 1,
                minor_version: 4,
                usb_speed: UsbSpeed::Super,
            },
            None => DeviceInfo::default(),
        }
    }

    fn close(&mut self) {
        let mut state = self.state();
        state.opened = None;
        state.close_calls += 1;
    }

    fn is_open(&self) -> bool {
        self.state().opened.is_some()
    }

    fn load_default_pll_configuration(&mut self) -> i32 {
        self.state().pll_loaded = true;
        NO_ERROR
    }

    fn configure_fpga(&mut self, firmware: &Path) -> i32 {
        let mut state = self.state();
        if state.fail_configuration {
            return FAILED;
        }
        state.configured_with = Some(firmware.to_path_buf());
        NO_ERROR
    }

    fn is_front_panel_enabled(&mut self) -> bool {
        self.state().front_panel_enabled
    }

    fn set_timeout(&mut self, timeout_ms: u32) {
        self.state().timeout_ms = Some(timeout_ms);
    }

    fn reset_fpga(&mut self) -> i32 {
        self.state().resets += 1;
        NO_ERROR
    }

    fn device_id(&mut self) -> String {
        let state = self.state();
        state
            .opened
            .and_then(|i| state.devices.get(i))
            .map(|d| d.device_id.clone())
            .unwrap_or_default()
    }

    fn set_device_id(&mut self, device_id: &str) {
        let mut state = self.state();
        if let Some(index) = state.opened {
            state.devices[index].device_id = device_id.to_string();
        }
    }

    fn set_wire_in_value(&mut self, address: u32, value: u32) -> i32 {
        let rc = self.transfer_code();
        if rc == NO_ERROR {
            self.state().staged_wire_ins.insert(address, value);
        }
        rc
    }

    fn update_wire_ins(&mut self) {
        let mut state = self.state();
        let staged: Vec<(u32, u32)> = state.staged_wire_ins.drain().collect();
        state.wire_ins.extend(staged);
        state.wire_in_updates += 1;
    }

    fn update_wire_outs(&mut self) {
        self.state().wire_out_updates += 1;
    }

    fn wire_out_value(&mut self, address: u32) -> u32 {
        self.state().wire_outs.get(&address).copied().unwrap_or(0)
    }

    fn write_register(&mut self, address: u32, value: u32) -> i32 {
        let rc = self.transfer_code();
        if rc == NO_ERROR {
            self.state().registers.insert(address, value);
        }
        rc
    }

    fn read_register(&mut self, address: u32) -> Result<u32, i32> {
        let rc = self.transfer_code();
        if rc != NO_ERROR {
            return Err(rc);
        }
        Ok(self.state().registers.get(&address).copied().unwrap_or(0))
    }

    fn write_to_block_pipe_in(&mut self, address: u32, block_size: usize, data: &[u8]) -> i64 {
        let rc = self.transfer_code();
        if rc != NO_ERROR {
            return rc as i64;
        }
        self.state()
            .pipe_writes
            .push((address, block_size, data.to_vec()));
        data.len() as i64
    }

    fn read_from_block_pipe_out(
        &mut self,
        address: u32,
        _block_size: usize,
        data: &mut [u8],
    ) -> i64 {
        let rc = self.transfer_code();
        if rc != NO_ERROR {
            return rc as i64;
        }
        let mut state = self.state();
        state.pipe_read_lengths.push(data.len());
        let source = state.pipe_out.get(&address).cloned().unwrap_or_default();
        for (dst, src) in data.iter_mut().zip(source.iter().chain(std::iter::repeat(&0))) {
            *dst = *src;
        }
        data.len() as i64
    }
}
