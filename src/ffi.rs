//! FFI bindings for HabitFlow
//!
//! This module provides C-compatible functions for calling HabitFlow from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `habitflow_free_string`.
//!
//! Timestamps are RFC 3339 strings; their offset decides which calendar day
//! counts as "today".

use chrono::Utc;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::dashboard::{
    build_dashboard, dashboard_from_json, insights_from_json, parse_reference_time,
    recommendations_json,
};
use crate::error::Result;
use crate::state::AppState;
use crate::types::{NewHabit, Period, TargetFrequency};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Like `cstr_to_string`, but records an error naming the argument
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn result_to_cstr(result: Result<String>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute the dashboard for a snapshot.
///
/// # Safety
/// - `snapshot_json` and `now_rfc3339` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_dashboard(
    snapshot_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_arg(snapshot_json, "snapshot JSON") else {
        return ptr::null_mut();
    };
    let Some(now) = required_arg(now_rfc3339, "timestamp") else {
        return ptr::null_mut();
    };

    result_to_cstr(dashboard_from_json(&json, &now))
}

/// Generate the insight list for a snapshot.
///
/// # Safety
/// - `snapshot_json` and `now_rfc3339` must be valid null-terminated C strings.
/// - Returns a newly allocated JSON array that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_generate_insights(
    snapshot_json: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_arg(snapshot_json, "snapshot JSON") else {
        return ptr::null_mut();
    };
    let Some(now) = required_arg(now_rfc3339, "timestamp") else {
        return ptr::null_mut();
    };

    result_to_cstr(insights_from_json(&json, &now))
}

/// Habit recommendations for a user with `habit_count` habits at local `hour` (0-23).
///
/// # Safety
/// - Returns a newly allocated JSON array that must be freed with `habitflow_free_string`.
#[no_mangle]
pub unsafe extern "C" fn habitflow_recommendations(habit_count: u32, hour: u32) -> *mut c_char {
    clear_last_error();
    result_to_cstr(recommendations_json(habit_count as usize, hour))
}

// ============================================================================
// Stateful API
// ============================================================================

/// Opaque handle to an AppState
pub struct HabitFlowStateHandle {
    state: AppState,
}

/// Create a state, optionally from a snapshot.
///
/// # Safety
/// - `snapshot_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `habitflow_state_free`.
/// - Returns NULL if the snapshot cannot be parsed.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_new(snapshot_json: *const c_char) -> *mut HabitFlowStateHandle {
    clear_last_error();

    let state = if snapshot_json.is_null() {
        AppState::new()
    } else {
        let Some(json) = required_arg(snapshot_json, "snapshot JSON") else {
            return ptr::null_mut();
        };
        match AppState::from_json(&json) {
            Ok(state) => state,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(HabitFlowStateHandle { state }))
}

/// Free a state.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `habitflow_state_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_free(handle: *mut HabitFlowStateHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Create a habit and return it as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `habitflow_state_new`.
/// - `name` must be a valid null-terminated C string.
/// - `frequency` must be NULL (daily) or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_create_habit(
    handle: *mut HabitFlowStateHandle,
    name: *const c_char,
    frequency: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }
    let handle = &mut *handle;

    let Some(name) = required_arg(name, "name") else {
        return ptr::null_mut();
    };

    let result = (|| -> Result<String> {
        let frequency = match cstr_to_string(frequency) {
            Some(f) => f.parse::<TargetFrequency>()?,
            None => TargetFrequency::default(),
        };
        let habit = handle
            .state
            .create_habit(NewHabit::new(name).with_frequency(frequency))?;
        Ok(serde_json::to_string(&habit)?)
    })();

    result_to_cstr(result)
}

/// Mark a habit (by id or name) completed and return the entry as JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `habitflow_state_new`.
/// - `habit` must be a valid null-terminated C string.
/// - `now_rfc3339` must be NULL (current time) or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_track(
    handle: *mut HabitFlowStateHandle,
    habit: *const c_char,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }
    let handle = &mut *handle;

    let Some(habit) = required_arg(habit, "habit") else {
        return ptr::null_mut();
    };

    let result = (|| -> Result<String> {
        let now = match cstr_to_string(now_rfc3339) {
            Some(ts) => parse_reference_time(&ts)?.with_timezone(&Utc),
            None => Utc::now(),
        };
        let habit_id = handle.state.habits().resolve(&habit)?.id;
        let entry = handle.state.track(habit_id, now)?;
        Ok(serde_json::to_string(&entry)?)
    })();

    result_to_cstr(result)
}

/// Compute the dashboard for the current state.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `habitflow_state_new`.
/// - `now_rfc3339` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_dashboard(
    handle: *const HabitFlowStateHandle,
    now_rfc3339: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }
    let handle = &*handle;

    let Some(now) = required_arg(now_rfc3339, "timestamp") else {
        return ptr::null_mut();
    };

    let result = parse_reference_time(&now).and_then(|now| {
        let dashboard = build_dashboard(&handle.state, now, Period::default());
        Ok(serde_json::to_string(&dashboard)?)
    });

    result_to_cstr(result)
}

/// Serialize the state to snapshot JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `habitflow_state_new`.
/// - Returns a newly allocated string that must be freed with `habitflow_free_string`.
/// - Returns NULL on error; call `habitflow_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn habitflow_state_snapshot(handle: *const HabitFlowStateHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null state pointer");
        return ptr::null_mut();
    }

    result_to_cstr((*handle).state.to_json())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by HabitFlow functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a HabitFlow function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn habitflow_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next HabitFlow function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn habitflow_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the HabitFlow library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn habitflow_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2024-06-10T08:00:00Z";

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        habitflow_free_string(ptr);
        s
    }

    unsafe fn last_error() -> String {
        let error = habitflow_last_error();
        assert!(!error.is_null());
        CStr::from_ptr(error).to_str().unwrap().to_string()
    }

    #[test]
    fn test_ffi_dashboard() {
        let snapshot = CString::new(r#"{"version":1}"#).unwrap();
        let now = CString::new(NOW).unwrap();

        unsafe {
            let json = take_string(habitflow_dashboard(snapshot.as_ptr(), now.as_ptr()));
            assert!(json.contains("\"producer\""));
            assert!(json.contains("\"insights\""));
        }
    }

    #[test]
    fn test_ffi_generate_insights() {
        let snapshot = CString::new(r#"{"version":1}"#).unwrap();
        let now = CString::new(NOW).unwrap();

        unsafe {
            let json = take_string(habitflow_generate_insights(snapshot.as_ptr(), now.as_ptr()));
            assert!(json.starts_with('['));
            assert!(json.contains("2-3 simple habits"));
        }
    }

    #[test]
    fn test_ffi_recommendations() {
        unsafe {
            let json = take_string(habitflow_recommendations(2, 7));
            assert!(json.contains("Morning Exercise"));
        }
    }

    #[test]
    fn test_ffi_state_lifecycle() {
        unsafe {
            let handle = habitflow_state_new(ptr::null());
            assert!(!handle.is_null());

            let name = CString::new("Read").unwrap();
            let habit = take_string(habitflow_state_create_habit(handle, name.as_ptr(), ptr::null()));
            assert!(habit.contains("\"daily\""));

            let now = CString::new(NOW).unwrap();
            let entry = take_string(habitflow_state_track(handle, name.as_ptr(), now.as_ptr()));
            assert!(entry.contains("\"completed\":true"));

            let snapshot = take_string(habitflow_state_snapshot(handle));
            habitflow_state_free(handle);

            // restore into a fresh handle and compute its dashboard
            let snapshot = CString::new(snapshot).unwrap();
            let restored = habitflow_state_new(snapshot.as_ptr());
            assert!(!restored.is_null());

            let dashboard = take_string(habitflow_state_dashboard(restored, now.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&dashboard).unwrap();
            assert_eq!(value["stats"]["streak_days"], 1);

            habitflow_state_free(restored);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let bad = CString::new("not json").unwrap();
            let now = CString::new(NOW).unwrap();

            assert!(habitflow_dashboard(bad.as_ptr(), now.as_ptr()).is_null());
            assert!(last_error().contains("JSON"));

            assert!(habitflow_state_new(bad.as_ptr()).is_null());

            let handle = habitflow_state_new(ptr::null());
            let unknown = CString::new("Swim").unwrap();
            assert!(habitflow_state_track(handle, unknown.as_ptr(), ptr::null()).is_null());
            assert!(last_error().contains("Unknown habit"));

            assert!(habitflow_state_snapshot(ptr::null()).is_null());
            assert!(last_error().contains("Null state"));

            habitflow_state_free(handle);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = habitflow_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::HABITFLOW_VERSION);
        }
    }
}
