//! FFI bindings for Synheart Lumen
//!
//! This module provides C-compatible functions for driving the engine from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `lumen_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::actuators::{intensity_to_bri, kelvin_to_mired, ActuatorKind};
use crate::encoder::FrameEncoder;
use crate::pipeline::LightingEngine;
use crate::types::{MetricsSnapshot, TimeOfDay};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to a LightingEngine
pub struct LumenEngineHandle {
    engine: LightingEngine,
    encoder: FrameEncoder,
}

/// Create an engine from a YAML (or JSON) configuration document.
///
/// # Safety
/// - `config` must be a valid null-terminated C string.
/// - Must be freed with `lumen_engine_free`.
/// - Returns NULL on error; call `lumen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lumen_engine_new(config: *const c_char) -> *mut LumenEngineHandle {
    clear_last_error();

    let config_str = match cstr_to_string(config) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    // YAML is a superset of JSON, so one parser covers both
    match LightingEngine::from_yaml(&config_str) {
        Ok(engine) => Box::into_raw(Box::new(LumenEngineHandle {
            engine,
            encoder: FrameEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `lumen_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lumen_engine_free(engine: *mut LumenEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Run one tick and return a frame record JSON.
///
/// `seconds_of_day` selects the circadian time; pass a negative value to use
/// the current local time. `actuator` is `"hue"` or `"rgb"`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `lumen_engine_new`.
/// - `metrics_json` and `actuator` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `lumen_free_string`.
/// - Returns NULL on error; call `lumen_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lumen_engine_tick(
    engine: *mut LumenEngineHandle,
    metrics_json: *const c_char,
    seconds_of_day: i32,
    actuator: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &mut *engine;

    let metrics_str = match cstr_to_string(metrics_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid metrics string pointer");
            return ptr::null_mut();
        }
    };

    let actuator_str = match cstr_to_string(actuator) {
        Some(s) => s,
        None => {
            set_last_error("Invalid actuator string pointer");
            return ptr::null_mut();
        }
    };

    let kind: ActuatorKind = match actuator_str.parse() {
        Ok(kind) => kind,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let snapshot = match MetricsSnapshot::from_json(&metrics_str) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let at = if seconds_of_day < 0 {
        TimeOfDay::now_local()
    } else {
        TimeOfDay::from_seconds(seconds_of_day as u32)
    };

    let (frame, command) = handle.engine.tick_for(&snapshot, at, kind);

    match handle
        .encoder
        .encode_to_json(frame, command, snapshot.timestamp.clone())
    {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset the engine's smoothing history.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `lumen_engine_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn lumen_engine_reset(engine: *mut LumenEngineHandle) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    (*engine).engine.reset();
    0
}

// ============================================================================
// Stateless Conversions
// ============================================================================

/// Convert Kelvin to a bridge mired code (153-500).
#[no_mangle]
pub extern "C" fn lumen_kelvin_to_mired(kelvin: f64) -> u16 {
    kelvin_to_mired(kelvin)
}

/// Convert relative intensity (0-1) to bridge brightness (1-254).
#[no_mangle]
pub extern "C" fn lumen_intensity_to_bri(intensity: f64) -> u8 {
    intensity_to_bri(intensity)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Lumen functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Lumen function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lumen_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Lumen function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn lumen_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Lumen library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn lumen_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
