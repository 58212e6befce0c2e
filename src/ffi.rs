//! FFI bindings for carecast
//!
//! This module provides C-compatible functions for calling carecast from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `carecast_free_string`.
//!
//! The engine itself never reads a clock; the optional `now_rfc3339` argument
//! is the one place wall-clock time enters, and passing NULL substitutes the
//! host's current UTC time.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::engine::CareEngine;
use crate::schema::EventLogAdapter;
use crate::types::{CareConfig, Event};

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

/// Parse the optional reference time; NULL means "now"
unsafe fn parse_reference_time(ptr: *const c_char) -> Result<DateTime<Utc>, String> {
    if ptr.is_null() {
        return Ok(Utc::now());
    }
    let text = match cstr_to_string(ptr) {
        Some(s) => s,
        None => return Err("Invalid reference time string pointer".to_string()),
    };
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid RFC 3339 reference time '{}': {}", text, e))
}

/// Parse the config JSON; NULL means defaults (no birth date, no overrides)
unsafe fn parse_config(ptr: *const c_char) -> Result<CareConfig, String> {
    if ptr.is_null() {
        return Ok(CareConfig::default());
    }
    let text = match cstr_to_string(ptr) {
        Some(s) => s,
        None => return Err("Invalid config string pointer".to_string()),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid config JSON: {}", e))
}

/// Parse a JSON array of care.event.v1 records into engine events
fn parse_events(json: &str) -> Result<Vec<Event>, String> {
    let records = EventLogAdapter::parse_array(json).map_err(|e| e.to_string())?;
    EventLogAdapter::to_events(records).map_err(|e| e.to_string())
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build a care.forecast.v1 report from an event log.
///
/// # Safety
/// - `events_json` must be a valid null-terminated C string holding a JSON
///   array of care.event.v1 records.
/// - `config_json` may be NULL (defaults) or a valid null-terminated C string.
/// - `now_rfc3339` may be NULL (current time) or a valid null-terminated
///   RFC 3339 timestamp.
/// - Returns a newly allocated string that must be freed with `carecast_free_string`.
/// - Returns NULL on error; call `carecast_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn carecast_report_json(
    events_json: *const c_char,
    config_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let events_str = match cstr_to_string(events_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid events JSON string pointer");
            return ptr::null_mut();
        }
    };

    let config = match parse_config(config_json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let now = match parse_reference_time(now_rfc3339) {
        Ok(t) => t,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let events = match parse_events(&events_str) {
        Ok(events) => events,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let engine = CareEngine::new(config);
    match engine.report_json(&events, now) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Validate a JSON array of care.event.v1 records.
///
/// Returns a JSON array of failures, one `{index, event_id, error}` object
/// per invalid record. An empty array means the whole log is valid.
///
/// # Safety
/// - `events_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `carecast_free_string`.
/// - Returns NULL on error; call `carecast_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn carecast_validate_events(events_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let events_str = match cstr_to_string(events_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid events JSON string pointer");
            return ptr::null_mut();
        }
    };

    let records = match EventLogAdapter::parse_array(&events_str) {
        Ok(records) => records,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let failures: Vec<serde_json::Value> = EventLogAdapter::validate_events(&records)
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "index": r.index,
                "event_id": r.event_id,
                "error": r.error.map(|e| e.to_string()),
            })
        })
        .collect();

    match serde_json::to_string(&failures) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to a CareEngine
pub struct CareEngineHandle {
    engine: CareEngine,
}

/// Create a new CareEngine from a config JSON string.
///
/// # Safety
/// - `config_json` may be NULL (defaults) or a valid null-terminated C string.
/// - Returns a pointer to a newly allocated CareEngine.
/// - Must be freed with `carecast_engine_free`.
/// - Returns NULL on error; call `carecast_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn carecast_engine_new(config_json: *const c_char) -> *mut CareEngineHandle {
    clear_last_error();

    let config = match parse_config(config_json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let handle = Box::new(CareEngineHandle {
        engine: CareEngine::new(config),
    });
    Box::into_raw(handle)
}

/// Free a CareEngine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `carecast_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn carecast_engine_free(engine: *mut CareEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Build a care.forecast.v1 report with a stateful engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `carecast_engine_new`.
/// - `events_json` must be a valid null-terminated C string.
/// - `now_rfc3339` may be NULL (current time) or a valid null-terminated
///   RFC 3339 timestamp.
/// - Returns a newly allocated string that must be freed with `carecast_free_string`.
/// - Returns NULL on error; call `carecast_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn carecast_engine_report(
    engine: *mut CareEngineHandle,
    events_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;

    let events_str = match cstr_to_string(events_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid events JSON string pointer");
            return ptr::null_mut();
        }
    };

    let now = match parse_reference_time(now_rfc3339) {
        Ok(t) => t,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    let events = match parse_events(&events_str) {
        Ok(events) => events,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };

    match handle.engine.report_json(&events, now) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by carecast functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a carecast function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn carecast_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next carecast function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn carecast_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the carecast library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn carecast_version() -> *const c_char {
    // Use a static CString to avoid allocation
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_events_json() -> CString {
        CString::new(
            r#"[
            {
                "schema_version": "care.event.v1",
                "activity": {"type": "feeding", "method": "bottle"},
                "recorded_at": "2024-03-01T06:00:00Z",
                "amount_ml": 100.0
            },
            {
                "schema_version": "care.event.v1",
                "activity": {"type": "feeding", "method": "bottle"},
                "recorded_at": "2024-03-01T09:00:00Z",
                "amount_ml": 110.0
            },
            {
                "schema_version": "care.event.v1",
                "activity": {"type": "diaper", "kind": "wet"},
                "recorded_at": "2024-03-01T06:45:00Z"
            }
        ]"#,
        )
        .unwrap()
    }

    fn sample_config_json() -> CString {
        CString::new(r#"{"birth_date": "2024-01-15T00:00:00Z"}"#).unwrap()
    }

    #[test]
    fn test_ffi_report_json() {
        let events = sample_events_json();
        let config = sample_config_json();
        let now = CString::new("2024-03-01T10:00:00Z").unwrap();

        unsafe {
            let result = carecast_report_json(events.as_ptr(), config.as_ptr(), now.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("care.forecast.v1"));
            assert!(result_str.contains("\"feeding\""));

            carecast_free_string(result);
        }
    }

    #[test]
    fn test_ffi_report_with_null_config_and_now() {
        let events = sample_events_json();

        unsafe {
            let result = carecast_report_json(events.as_ptr(), ptr::null(), ptr::null());
            assert!(!result.is_null());
            carecast_free_string(result);
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let events = sample_events_json();
        let config = sample_config_json();
        let now = CString::new("2024-03-01T10:00:00Z").unwrap();

        unsafe {
            let engine = carecast_engine_new(config.as_ptr());
            assert!(!engine.is_null());

            let result = carecast_engine_report(engine, events.as_ptr(), now.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("care.forecast.v1"));

            carecast_free_string(result);
            carecast_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_validate_events() {
        let json = CString::new(
            r#"[
            {
                "schema_version": "care.event.v1",
                "activity": {"type": "diaper", "kind": "wet"},
                "recorded_at": "2024-03-01T06:00:00Z"
            },
            {
                "schema_version": "care.event.v0",
                "activity": {"type": "pumping"},
                "recorded_at": "2024-03-01T07:00:00Z"
            }
        ]"#,
        )
        .unwrap();

        unsafe {
            let result = carecast_validate_events(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"index\":1"));
            assert!(result_str.contains("schema version"));

            carecast_free_string(result);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid_json = CString::new("not json").unwrap();

        unsafe {
            let result = carecast_report_json(invalid_json.as_ptr(), ptr::null(), ptr::null());
            assert!(result.is_null());

            let error = carecast_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_rejects_bad_reference_time() {
        let events = sample_events_json();
        let bad_now = CString::new("yesterday-ish").unwrap();

        unsafe {
            let result = carecast_report_json(events.as_ptr(), ptr::null(), bad_now.as_ptr());
            assert!(result.is_null());

            let error = carecast_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("RFC 3339"));
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = carecast_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
