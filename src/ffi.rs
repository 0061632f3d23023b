//! FFI bindings for faux-update
//!
//! C-compatible entry points for the Android/iOS host. Everything crosses the
//! boundary as null-terminated JSON strings; returned strings are allocated
//! here and must be released with `faux_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::error::SessionError;
use crate::progress::compute_progress;
use crate::recap::{PrankRecap, ShareCard};
use crate::session::SessionController;
use crate::types::{InputEvent, SessionConfig};

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

/// Record `err` and return NULL
fn fail<T>(err: SessionError) -> *mut T {
    log::warn!("ffi call failed: {}", err);
    set_last_error(&err.to_string());
    ptr::null_mut()
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn json_to_cstr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => fail(e.into()),
    }
}

// ============================================================================
// Session API
// ============================================================================

/// Opaque handle to a running session
pub struct FauxSessionHandle {
    controller: SessionController,
}

/// Start a session from `SessionConfig` JSON.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - `start_ms` is the host's monotonic clock in the time base of event timestamps.
/// - Returns a handle that must be freed with `faux_session_free`, or NULL on
///   error; call `faux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn faux_session_new(
    config_json: *const c_char,
    start_ms: u64,
) -> *mut FauxSessionHandle {
    clear_last_error();

    let Some(json) = cstr_to_string(config_json) else {
        return fail(SessionError::InvalidInput(
            "Invalid config string pointer".to_string(),
        ));
    };

    let controller = match SessionConfig::from_json(&json)
        .and_then(|config| SessionController::new(config, start_ms))
    {
        Ok(controller) => controller,
        Err(e) => return fail(e),
    };

    Box::into_raw(Box::new(FauxSessionHandle { controller }))
}

/// Free a session.
///
/// # Safety
/// - `session` must be a pointer returned by `faux_session_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn faux_session_free(session: *mut FauxSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Feed one `InputEvent` JSON; returns `EventOutcome` JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `faux_session_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `faux_free_string`.
/// - Returns NULL on error; call `faux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn faux_session_event(
    session: *mut FauxSessionHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        return fail(SessionError::InvalidInput("Null session pointer".to_string()));
    }
    let handle = &mut *session;

    let Some(json) = cstr_to_string(event_json) else {
        return fail(SessionError::InvalidInput(
            "Invalid event string pointer".to_string(),
        ));
    };

    let event: InputEvent = match serde_json::from_str(&json) {
        Ok(event) => event,
        Err(e) => return fail(e.into()),
    };

    json_to_cstr(&handle.controller.on_event(&event))
}

/// Advance the session by one timer tick; returns `TickOutcome` JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `faux_session_new`.
/// - Returns a newly allocated string that must be freed with `faux_free_string`.
/// - Returns NULL on error; call `faux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn faux_session_tick(session: *mut FauxSessionHandle) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        return fail(SessionError::InvalidInput("Null session pointer".to_string()));
    }
    let handle = &mut *session;

    json_to_cstr(&handle.controller.on_tick())
}

/// Host-initiated teardown; returns `TeardownActions` JSON.
///
/// Repeated calls return an all-false action set.
///
/// # Safety
/// - `session` must be a valid pointer returned by `faux_session_new`.
/// - Returns a newly allocated string that must be freed with `faux_free_string`.
/// - Returns NULL on error; call `faux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn faux_session_teardown(session: *mut FauxSessionHandle) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        return fail(SessionError::InvalidInput("Null session pointer".to_string()));
    }
    let handle = &mut *session;

    json_to_cstr(&handle.controller.on_teardown())
}

/// Whether the host must register an accelerometer listener.
///
/// # Safety
/// - `session` must be a valid pointer returned by `faux_session_new`, or NULL
///   (which returns false).
#[no_mangle]
pub unsafe extern "C" fn faux_session_wants_accelerometer(
    session: *const FauxSessionHandle,
) -> bool {
    if session.is_null() {
        return false;
    }
    (*session).controller.wants_accelerometer()
}

// ============================================================================
// Stateless API
// ============================================================================

/// Percentage to display for an elapsed-time fraction.
#[no_mangle]
pub extern "C" fn faux_progress(fraction: f64) -> u8 {
    compute_progress(fraction)
}

/// Build share card JSON from `PrankRecap` JSON.
///
/// # Safety
/// - `recap_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `faux_free_string`.
/// - Returns NULL on error; call `faux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn faux_recap_share_card(recap_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = cstr_to_string(recap_json) else {
        return fail(SessionError::InvalidInput(
            "Invalid recap string pointer".to_string(),
        ));
    };

    match PrankRecap::from_json(&json) {
        Ok(recap) => json_to_cstr(&ShareCard::build(&recap)),
        Err(e) => fail(e),
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by faux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a faux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn faux_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next faux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn faux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn faux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
