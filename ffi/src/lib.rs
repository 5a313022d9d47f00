//! C ABI for `pets-core`, for mobile hosts that run HTTP themselves.
//!
//! # Overview
//! The host asks for a request (`pets_build_*`), executes it on its own
//! stack, and hands the status and body back (`pets_parse_*`). An upload is
//! two round trips: resolve a target, then POST to the URL it returned.
//! Targets are single-use, so resolve again for every upload.
//!
//! # Design
//! - No panic unwinds into C: each exported body runs under `catch_unwind`.
//! - Parse calls all answer with `FfiPetsResult`; `data_tag` names the
//!   payload behind `data`.
//! - Whatever this library returns, the host releases with the matching
//!   `pets_free_*`.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use pets_core::{decode_image, encode_jpeg, ClientConfig, HttpResponse, UploadRequest, UploadTarget};
use tracing::warn;

use types::*;

/// Read a C string argument. Invalid UTF-8 reads as empty.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn read_str(ptr: *const c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or("")
        .to_string()
}

/// Copy `len` bytes from `ptr`. Null or zero length reads as empty.
///
/// # Safety
/// When non-null, `ptr` must be valid for `len` bytes.
unsafe fn read_bytes(ptr: *const u8, len: u32) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len as usize) }.to_vec()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client whose endpoints hang off `base_url` (`/pets`, `/upload`).
///
/// Null `base_url` (or a panic) yields null. Release with `pets_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn pets_client_new(base_url: *const c_char) -> *mut FfiPetsClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { read_str(base_url) };
        let client = FfiPetsClient::new(ClientConfig::with_base_url(&url));
        Box::into_raw(Box::new(client))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client bound to the production endpoints.
#[unsafe(no_mangle)]
pub extern "C" fn pets_client_new_default() -> *mut FfiPetsClient {
    catch_unwind(|| Box::into_raw(Box::new(FfiPetsClient::new(ClientConfig::default()))))
        .unwrap_or(std::ptr::null_mut())
}

/// Release a client from `pets_client_new*`. Null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn pets_client_free(client: *mut FfiPetsClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// The fixed application identifier the client sends with every upload.
/// Release with `pets_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn pets_client_app_id(client: *const FfiPetsClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        c_string(client.config.app_id().to_string())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// GET for the pets catalog, or null without a client.
/// Release with `pets_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn pets_build_fetch_all(client: *const FfiPetsClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.catalog.build_fetch_all()).unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// GET that asks the server for a one-time upload target.
#[unsafe(no_mangle)]
pub extern "C" fn pets_build_resolve_target(client: *const FfiPetsClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.pipeline.build_resolve_target())
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the multipart POST for one upload.
///
/// `target_url` must come from a successful `pets_parse_resolve_target`.
/// `image`/`image_len` hold an encoded image (JPEG or PNG); it is re-encoded
/// as JPEG before framing. Each call uses a fresh boundary.
///
/// Returns null on failure. When `out_error` is non-null it receives `Ok`
/// on success, otherwise `NullArg`, `ImageEncoding` (the image could not be
/// decoded or re-encoded), `TooLarge` or `Panic`.
#[unsafe(no_mangle)]
pub extern "C" fn pets_build_upload(
    client: *const FfiPetsClient,
    target_url: *const c_char,
    image: *const u8,
    image_len: u32,
    original_url: *const c_char,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    let outcome = catch_unwind(|| {
        if client.is_null() || target_url.is_null() || image.is_null() || original_url.is_null() {
            return Err(FfiErrorCode::NullArg);
        }
        let client = unsafe { &*client };
        let target = UploadTarget {
            url: unsafe { read_str(target_url) },
        };
        let raw = unsafe { read_bytes(image, image_len) };
        let jpeg = decode_image(&raw)
            .and_then(|img| encode_jpeg(&img))
            .map_err(|e| {
                warn!(error = %e, "rejecting upload image");
                FfiErrorCode::from(e.kind())
            })?;
        let request = UploadRequest {
            app_id: client.config.app_id().to_string(),
            original_url: unsafe { read_str(original_url) },
            image_bytes: jpeg,
        };
        FfiHttpRequest::from_core(client.pipeline.build_post_multipart(&target, &request))
    });

    let (request, code) = match outcome {
        Ok(Ok(request)) => (request, FfiErrorCode::Ok),
        Ok(Err(code)) => (std::ptr::null_mut(), code),
        Err(_) => (std::ptr::null_mut(), FfiErrorCode::Panic),
    };
    if !out_error.is_null() {
        unsafe { out_error.write(code) };
    }
    request
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Copy the host's response into core form.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, unsafe { read_bytes(resp.body, resp.body_len) })
}

/// Parse the catalog response.
///
/// Returns a result with `data_tag = PetList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn pets_parse_fetch_all(
    client: *const FfiPetsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiPetsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiPetsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiPetsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.catalog.parse_fetch_all(core_resp) {
            Ok(pets) => FfiPetsResult::ok_pet_list(pets),
            Err(e) => FfiPetsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPetsResult::panic("panic in pets_parse_fetch_all"))
}

/// Parse the upload-target response.
///
/// Returns a result with `data_tag = UploadTarget` on success.
#[unsafe(no_mangle)]
pub extern "C" fn pets_parse_resolve_target(
    client: *const FfiPetsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiPetsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiPetsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiPetsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.pipeline.parse_resolve_target(core_resp) {
            Ok(target) => FfiPetsResult::ok_upload_target(target),
            Err(e) => FfiPetsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPetsResult::panic("panic in pets_parse_resolve_target"))
}

/// Parse the multipart POST response.
///
/// Returns `error_code = Ok` with no data only for status 200.
#[unsafe(no_mangle)]
pub extern "C" fn pets_parse_upload(
    client: *const FfiPetsClient,
    response: *const FfiHttpResponse,
) -> *mut FfiPetsResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiPetsResult::null_arg("client");
        }
        if response.is_null() {
            return FfiPetsResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.pipeline.parse_post_multipart(core_resp) {
            Ok(()) => FfiPetsResult::ok_empty(),
            Err(e) => FfiPetsResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiPetsResult::panic("panic in pets_parse_upload"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Release a request from any `pets_build_*`. Null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn pets_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.body,
                    req.body_len as usize,
                ))
            });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiPetsResult` returned by any `pets_parse_*` function.
/// Null is ignored. `data_tag` decides how `data` is released.
#[unsafe(no_mangle)]
pub extern "C" fn pets_free_result(result: *mut FfiPetsResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::PetList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiPetList) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    };
                    for item in items.iter() {
                        free_ffi_pet_fields(item);
                    }
                }
            }
            FfiDataTag::UploadTarget => {
                let target = unsafe { Box::from_raw(result.data as *mut FfiUploadTarget) };
                if !target.url.is_null() {
                    drop(unsafe { CString::from_raw(target.url) });
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free the C-string fields of an `FfiPet` (but not the struct itself).
fn free_ffi_pet_fields(pet: &FfiPet) {
    for field in [pet.title, pet.description, pet.image_url, pet.created_at] {
        if !field.is_null() {
            drop(unsafe { CString::from_raw(field) });
        }
    }
}

/// Release a string from `pets_client_app_id`. Null is ignored.
#[unsafe(no_mangle)]
pub extern "C" fn pets_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
