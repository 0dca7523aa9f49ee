//! okFrontPanel C API backend.
//!
//! Only compiled with the `vendor-sdk` feature; `build.rs` then links the
//! library from the vendor directory selected for the target platform.

use std::ffi::{c_char, c_int, c_long, c_uint, c_void, CStr, CString};
use std::path::Path;

use super::backend::{DeviceInfo, FrontPanel, UsbSpeed, FAILED};
use super::error::{DeviceError, DeviceResult};

type Handle = *mut c_void;

// Serial numbers are at most 10 characters and device IDs at most 32.
const STRING_BUF_LEN: usize = 64;

const MAX_DEVICE_ID_LENGTH: usize = 33;
const MAX_SERIAL_NUMBER_LENGTH: usize = 11;
const MAX_PRODUCT_NAME_LENGTH: usize = 128;

/// Leading fields of the SDK's `okTDeviceInfo`.
///
/// The SDK fills a larger structure; `reserved` absorbs the fields after the
/// device version, which are not read here.
#[repr(C)]
struct RawDeviceInfo {
    device_id: [c_char; MAX_DEVICE_ID_LENGTH],
    serial_number: [c_char; MAX_SERIAL_NUMBER_LENGTH],
    product_name: [c_char; MAX_PRODUCT_NAME_LENGTH],
    product_id: c_int,
    device_interface: c_int,
    usb_speed: c_int,
    device_major_version: c_int,
    device_minor_version: c_int,
    reserved: [u8; 1024],
}

impl RawDeviceInfo {
    fn zeroed() -> Self {
        RawDeviceInfo {
            device_id: [0; MAX_DEVICE_ID_LENGTH],
            serial_number: [0; MAX_SERIAL_NUMBER_LENGTH],
            product_name: [0; MAX_PRODUCT_NAME_LENGTH],
            product_id: 0,
            device_interface: 0,
            usb_speed: 0,
            device_major_version: 0,
            device_minor_version: 0,
            reserved: [0; 1024],
        }
    }
}

#[link(name = "okFrontPanel")]
extern "C" {
    fn okFrontPanelDLL_GetVersion(date: *mut c_char, time: *mut c_char);

    fn okFrontPanel_Construct() -> Handle;
    fn okFrontPanel_Destruct(hnd: Handle);
    fn okFrontPanel_GetDeviceCount(hnd: Handle) -> c_int;
    fn okFrontPanel_GetDeviceListSerial(hnd: Handle, num: c_int, buf: *mut c_char);
    fn okFrontPanel_OpenBySerial(hnd: Handle, serial: *const c_char) -> c_int;
    fn okFrontPanel_Close(hnd: Handle);
    fn okFrontPanel_IsOpen(hnd: Handle) -> c_int;
    fn okFrontPanel_GetSerialNumber(hnd: Handle, buf: *mut c_char);
    fn okFrontPanel_GetDeviceID(hnd: Handle, buf: *mut c_char);
    fn okFrontPanel_SetDeviceID(hnd: Handle, id: *const c_char);
    fn okFrontPanel_GetDeviceInfo(hnd: Handle, info: *mut RawDeviceInfo) -> c_int;
    fn okFrontPanel_GetDeviceMajorVersion(hnd: Handle) -> c_int;
    fn okFrontPanel_GetDeviceMinorVersion(hnd: Handle) -> c_int;
    fn okFrontPanel_LoadDefaultPLLConfiguration(hnd: Handle) -> c_int;
    fn okFrontPanel_ConfigureFPGA(hnd: Handle, filename: *const c_char) -> c_int;
    fn okFrontPanel_IsFrontPanelEnabled(hnd: Handle) -> c_int;
    fn okFrontPanel_SetTimeout(hnd: Handle, timeout: c_int);
    fn okFrontPanel_ResetFPGA(hnd: Handle) -> c_int;
    fn okFrontPanel_SetWireInValue(hnd: Handle, ep: c_int, val: c_uint, mask: c_uint) -> c_int;
    fn okFrontPanel_UpdateWireIns(hnd: Handle);
    fn okFrontPanel_UpdateWireOuts(hnd: Handle);
    fn okFrontPanel_GetWireOutValue(hnd: Handle, ep: c_int) -> c_uint;
    fn okFrontPanel_WriteRegister(hnd: Handle, addr: c_uint, data: c_uint) -> c_int;
    fn okFrontPanel_ReadRegister(hnd: Handle, addr: c_uint, data: *mut c_uint) -> c_int;
    fn okFrontPanel_WriteToBlockPipeIn(
        hnd: Handle,
        ep: c_int,
        block_size: c_int,
        length: c_long,
        data: *const u8,
    ) -> c_long;
    fn okFrontPanel_ReadFromBlockPipeOut(
        hnd: Handle,
        ep: c_int,
        block_size: c_int,
        length: c_long,
        data: *mut u8,
    ) -> c_long;
}

/// Build date and time of the linked SDK.
pub fn library_version() -> DeviceResult<String> {
    let mut date = [0 as c_char; 32];
    let mut time = [0 as c_char; 32];
    // SAFETY: both buffers exceed the 32 bytes the SDK writes at most.
    unsafe { okFrontPanelDLL_GetVersion(date.as_mut_ptr(), time.as_mut_ptr()) };
    let date = buf_to_string(&date);
    if date.is_empty() {
        return Err(DeviceError::LibraryNotFound);
    }
    Ok(format!("{} {}", date, buf_to_string(&time)))
}

fn buf_to_string(buf: &[c_char]) -> String {
    // SAFETY: the buffer is zero-initialised and the SDK NUL-terminates.
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

/// A device handle of the okFrontPanel SDK.
#[derive(Debug)]
pub struct VendorFrontPanel {
    hnd: Handle,
}

// The SDK handle has no thread affinity; it is only ever used through `&mut`.
unsafe impl Send for VendorFrontPanel {}

impl VendorFrontPanel {
    /// Construct a fresh, unopened handle.
    pub fn new() -> Self {
        // SAFETY: construction has no preconditions.
        let hnd = unsafe { okFrontPanel_Construct() };
        VendorFrontPanel { hnd }
    }

    fn read_string(&self, f: unsafe extern "C" fn(Handle, *mut c_char)) -> String {
        let mut buf = [0 as c_char; STRING_BUF_LEN];
        // SAFETY: the handle is live and the buffer is large enough.
        unsafe { f(self.hnd, buf.as_mut_ptr()) };
        buf_to_string(&buf)
    }
}

impl Default for VendorFrontPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VendorFrontPanel {
    fn drop(&mut self) {
        // SAFETY: the handle came from okFrontPanel_Construct and is dropped once.
        unsafe { okFrontPanel_Destruct(self.hnd) };
    }
}

impl FrontPanel for VendorFrontPanel {
    fn is_library_loaded(&self) -> bool {
        library_version().is_ok()
    }

    fn device_count(&mut self) -> usize {
        // SAFETY: the handle is live for the lifetime of `self`.
        let n = unsafe { okFrontPanel_GetDeviceCount(self.hnd) };
        n.max(0) as usize
    }

    fn device_list_serial(&mut self, index: usize) -> String {
        let mut buf = [0 as c_char; STRING_BUF_LEN];
        // SAFETY: the handle is live and the buffer exceeds the serial length.
        unsafe { okFrontPanel_GetDeviceListSerial(self.hnd, index as c_int, buf.as_mut_ptr()) };
        buf_to_string(&buf)
    }

    fn open_by_serial(&mut self, serial: &str) -> i32 {
        let serial = to_cstring(serial);
        // SAFETY: the handle is live and `serial` is NUL-terminated.
        unsafe { okFrontPanel_OpenBySerial(self.hnd, serial.as_ptr()) }
    }

    fn device_info(&mut self) -> DeviceInfo {
        let mut raw = RawDeviceInfo::zeroed();
        // SAFETY: the handle is live and `raw` is larger than `okTDeviceInfo`.
        let rc = unsafe { okFrontPanel_GetDeviceInfo(self.hnd, &mut raw) };
        if rc == 0 {
            return DeviceInfo {
                device_id: buf_to_string(&raw.device_id),
                serial: buf_to_string(&raw.serial_number),
                major_version: raw.device_major_version.max(0) as u32,
                minor_version: raw.device_minor_version.max(0) as u32,
                usb_speed: UsbSpeed::from_vendor(raw.usb_speed),
            };
        }

        // SAFETY: the handle is live; the version getters take no buffers.
        let (major, minor) = unsafe {
            (
                okFrontPanel_GetDeviceMajorVersion(self.hnd),
                okFrontPanel_GetDeviceMinorVersion(self.hnd),
            )
        };
        DeviceInfo {
            device_id: self.read_string(okFrontPanel_GetDeviceID),
            serial: self.read_string(okFrontPanel_GetSerialNumber),
            major_version: major.max(0) as u32,
            minor_version: minor.max(0) as u32,
            usb_speed: UsbSpeed::Unknown,
        }
    }

    fn close(&mut self) {
        // SAFETY: the handle is live; closing a closed handle is allowed.
        unsafe { okFrontPanel_Close(self.hnd) };
    }

    fn is_open(&self) -> bool {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_IsOpen(self.hnd) != 0 }
    }

    fn load_default_pll_configuration(&mut self) -> i32 {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_LoadDefaultPLLConfiguration(self.hnd) }
    }

    fn configure_fpga(&mut self, firmware: &Path) -> i32 {
        let path = to_cstring(&firmware.to_string_lossy());
        // SAFETY: the handle is live and `path` is NUL-terminated.
        unsafe { okFrontPanel_ConfigureFPGA(self.hnd, path.as_ptr()) }
    }

    fn is_front_panel_enabled(&mut self) -> bool {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_IsFrontPanelEnabled(self.hnd) != 0 }
    }

    fn set_timeout(&mut self, timeout_ms: u32) {
        let timeout = c_int::try_from(timeout_ms).unwrap_or(c_int::MAX);
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_SetTimeout(self.hnd, timeout) };
    }

    fn reset_fpga(&mut self) -> i32 {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_ResetFPGA(self.hnd) }
    }

    fn device_id(&mut self) -> String {
        self.read_string(okFrontPanel_GetDeviceID)
    }

    fn set_device_id(&mut self, device_id: &str) {
        let id = to_cstring(device_id);
        // SAFETY: the handle is live and `id` is NUL-terminated.
        unsafe { okFrontPanel_SetDeviceID(self.hnd, id.as_ptr()) };
    }

    fn set_wire_in_value(&mut self, address: u32, value: u32) -> i32 {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_SetWireInValue(self.hnd, address as c_int, value, 0xffff_ffff) }
    }

    fn update_wire_ins(&mut self) {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_UpdateWireIns(self.hnd) };
    }

    fn update_wire_outs(&mut self) {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_UpdateWireOuts(self.hnd) };
    }

    fn wire_out_value(&mut self, address: u32) -> u32 {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_GetWireOutValue(self.hnd, address as c_int) }
    }

    fn write_register(&mut self, address: u32, value: u32) -> i32 {
        // SAFETY: the handle is live.
        unsafe { okFrontPanel_WriteRegister(self.hnd, address, value) }
    }

    fn read_register(&mut self, address: u32) -> Result<u32, i32> {
        let mut value: c_uint = 0;
        // SAFETY: the handle is live and `value` outlives the call.
        let rc = unsafe { okFrontPanel_ReadRegister(self.hnd, address, &mut value) };
        if rc == 0 {
            Ok(value)
        } else {
            Err(rc)
        }
    }

    fn write_to_block_pipe_in(&mut self, address: u32, block_size: usize, data: &[u8]) -> i64 {
        let (Ok(block), Ok(len)) = (c_int::try_from(block_size), c_long::try_from(data.len())) else {
            return FAILED as i64;
        };
        // SAFETY: the handle is live and `data` holds `len` readable bytes.
        unsafe {
            okFrontPanel_WriteToBlockPipeIn(self.hnd, address as c_int, block, len, data.as_ptr())
                as i64
        }
    }

    fn read_from_block_pipe_out(&mut self, address: u32, block_size: usize, data: &mut [u8]) -> i64 {
        let (Ok(block), Ok(len)) = (c_int::try_from(block_size), c_long::try_from(data.len())) else {
            return FAILED as i64;
        };
        // SAFETY: the handle is live and `data` holds `len` writable bytes.
        unsafe {
            okFrontPanel_ReadFromBlockPipeOut(
                self.hnd,
                address as c_int,
                block,
                len,
                data.as_mut_ptr(),
            ) as i64
        }
    }
}
