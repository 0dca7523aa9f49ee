//! Device error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`FpDevice`](super::FpDevice).
///
/// Every variant maps to a stable numeric code through [`DeviceError::code`],
/// matching the codes the extension module has always returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("FrontPanel library could not be loaded")]
    LibraryNotFound,

    #[error("cannot open: device already opened")]
    AlreadyOpened,

    #[error("device `{serial}` could not be opened")]
    CannotOpen { serial: String },

    #[error("FPGA configuration with `{}` failed", firmware.display())]
    FpgaConfigFailed { firmware: PathBuf },

    #[error("FrontPanel support is not enabled")]
    FrontPanelNotEnabled,

    #[error("device not connected")]
    NotConnected,

    #[error("pipe block size must be non-zero")]
    InvalidBlockSize,

    #[error("FrontPanel call failed with code {0}")]
    Vendor(i64),
}

impl DeviceError {
    pub const LIBRARY_NOT_FOUND: i64 = -100;
    pub const ALREADY_OPENED: i64 = -101;
    pub const CANNOT_OPEN: i64 = -102;
    pub const FPGA_CONFIG_FAILED: i64 = -103;
    pub const FRONT_PANEL_NOT_ENABLED: i64 = -104;
    pub const NOT_CONNECTED: i64 = -105;
    pub const INVALID_BLOCK_SIZE: i64 = -106;

    /// Numeric error code.
    ///
    /// Vendor failures keep the code the SDK returned.
    pub fn code(&self) -> i64 {
        match self {
            DeviceError::LibraryNotFound => Self::LIBRARY_NOT_FOUND,
            DeviceError::AlreadyOpened => Self::ALREADY_OPENED,
            DeviceError::CannotOpen { .. } => Self::CANNOT_OPEN,
            DeviceError::FpgaConfigFailed { .. } => Self::FPGA_CONFIG_FAILED,
            DeviceError::FrontPanelNotEnabled => Self::FRONT_PANEL_NOT_ENABLED,
            DeviceError::NotConnected => Self::NOT_CONNECTED,
            DeviceError::InvalidBlockSize => Self::INVALID_BLOCK_SIZE,
            DeviceError::Vendor(code) => *code,
        }
    }
}

/// Result alias for device operations.
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(DeviceError::LibraryNotFound.code(), -100);
        assert_eq!(DeviceError::AlreadyOpened.code(), -101);
        assert_eq!(
            DeviceError::CannotOpen {
                serial: "X".to_string()
            }
            .code(),
            -102
        );
        assert_eq!(
            DeviceError::FpgaConfigFailed {
                firmware: PathBuf::from("top.bit")
            }
            .code(),
            -103
        );
        assert_eq!(DeviceError::FrontPanelNotEnabled.code(), -104);
        assert_eq!(DeviceError::NotConnected.code(), -105);
        assert_eq!(DeviceError::Vendor(-8).code(), -8);
    }

    #[test]
    fn test_messages() {
        let err = DeviceError::CannotOpen {
            serial: "1234ABCD".to_string(),
        };
        assert_eq!(err.to_string(), "device `1234ABCD` could not be opened");
    }
}
