//! Device session: one device plus its log, as exposed to extension callers.
//!
//! A session creates backend handles on demand through a factory, so device
//! enumeration never disturbs the handle of the opened device.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use super::backend::FrontPanel;
use super::error::DeviceError;
use super::log::{DeviceLog, LogLevel};
use super::{list_devices_info, DeviceListing, FpDevice, DEFAULT_BLOCK_SIZE};

/// Errors raised by [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Device not opened.")]
    NotOpened,

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("device log: {0}")]
    Log(#[from] io::Error),
}

impl SessionError {
    /// Numeric code for device errors, `None` otherwise.
    pub fn device_code(&self) -> Option<i64> {
        match self {
            SessionError::Device(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// Session result alias.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// A device session.
pub struct Session<B, F>
where
    B: FrontPanel,
    F: FnMut() -> B,
{
    factory: F,
    device: Option<FpDevice<B>>,
    log: Option<DeviceLog>,
}

impl<B, F> Session<B, F>
where
    B: FrontPanel,
    F: FnMut() -> B,
{
    /// Create a session that makes backend handles with `factory`.
    pub fn new(factory: F) -> Self {
        Session {
            factory,
            device: None,
            log: None,
        }
    }

    /// Serial and device ID of every attached device that can be opened.
    pub fn list_devices(&mut self) -> Vec<DeviceListing> {
        let mut backend = (self.factory)();
        list_devices_info(&mut backend)
    }

    /// Open a device, replacing any previous device and log.
    ///
    /// The log (if any) is created at debug level before the device is
    /// opened. A device that fails to open still belongs to the session, so
    /// later calls report the device error rather than [`SessionError::NotOpened`].
    pub fn open(
        &mut self,
        serial: &str,
        firmware: Option<&Path>,
        log_file: Option<&Path>,
    ) -> SessionResult<()> {
        self.device = None;
        self.log = None;

        if let Some(path) = log_file {
            self.log = Some(DeviceLog::create(path, LogLevel::Debug)?);
        }

        let mut device = FpDevice::new((self.factory)());
        let result = device.open(serial, firmware);

        if let Some(log) = self.log.as_mut() {
            match &result {
                Ok(()) => log.log(LogLevel::Message, &format!("Device {} opened.", serial))?,
                Err(err) => log.log(LogLevel::Error, &err.to_string())?,
            }
        }

        self.device = Some(device);
        result.map_err(SessionError::from)
    }

    /// Close the device and the log.
    pub fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        self.log = None;
    }

    /// Whether a device is present and open.
    pub fn is_open(&self) -> bool {
        self.device.as_ref().is_some_and(|d| d.is_open())
    }

    /// The session's device.
    pub fn device(&mut self) -> SessionResult<&mut FpDevice<B>> {
        self.device.as_mut().ok_or(SessionError::NotOpened)
    }

    pub fn set_wire_in(&mut self, address: u32, value: u32, send_now: bool) -> SessionResult<()> {
        Ok(self.device()?.set_wire_in(address, value, send_now)?)
    }

    pub fn wire_out(&mut self, address: u32, refresh: bool) -> SessionResult<u32> {
        Ok(self.device()?.wire_out(address, refresh)?)
    }

    pub fn write_register(&mut self, address: u32, value: u32) -> SessionResult<()> {
        Ok(self.device()?.write_register(address, value)?)
    }

    pub fn read_register(&mut self, address: u32) -> SessionResult<u32> {
        Ok(self.device()?.read_register(address)?)
    }

    /// Write a block pipe; `block_size` defaults to [`DEFAULT_BLOCK_SIZE`].
    pub fn write_pipe(
        &mut self,
        address: u32,
        data: &[u8],
        block_size: Option<usize>,
    ) -> SessionResult<usize> {
        let block_size = block_size.unwrap_or(DEFAULT_BLOCK_SIZE);
        Ok(self.device()?.write_pipe(address, data, block_size)?)
    }

    /// Read a block pipe; `block_size` defaults to [`DEFAULT_BLOCK_SIZE`].
    pub fn read_pipe(
        &mut self,
        address: u32,
        buf: &mut [u8],
        block_size: Option<usize>,
    ) -> SessionResult<usize> {
        let block_size = block_size.unwrap_or(DEFAULT_BLOCK_SIZE);
        Ok(self.device()?.read_pipe(address, buf, block_size)?)
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> SessionResult<()> {
        Ok(self.device()?.set_timeout(timeout)?)
    }

    pub fn device_id(&mut self) -> SessionResult<String> {
        Ok(self.device()?.read_device_id()?)
    }

    pub fn set_device_id(&mut self, device_id: &str) -> SessionResult<()> {
        Ok(self.device()?.set_device_id(device_id)?)
    }

    /// Write to the session log.
    ///
    /// Sessions opened without a log file accept and drop the record.
    pub fn log(&mut self, level: LogLevel, text: &str, no_time: bool) -> SessionResult<()> {
        self.device()?;
        let Some(log) = self.log.as_mut() else {
            return Ok(());
        };
        if no_time {
            log.log_no_time(level, text)?;
        } else {
            log.log(level, text)?;
        }
        Ok(())
    }
}
