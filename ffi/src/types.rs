//! C layouts of the pets data handed to and from the host.
//!
//! Strings travel as NUL-terminated `*mut c_char`, lists and binary bodies
//! as pointer plus `u32` length. Everything allocated here is released by a
//! `pets_free_*` function in `lib.rs`.

use std::ffi::CString;
use std::os::raw::c_char;

use pets_core::{
    ApiError, ClientConfig, ErrorKind, HttpMethod, ImageUploadPipeline, PetCatalogClient,
    PetRecord, UploadTarget,
};

/// Opaque handle to a configured client. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiPetsClient {
    pub(crate) config: ClientConfig,
    pub(crate) catalog: PetCatalogClient,
    pub(crate) pipeline: ImageUploadPipeline,
}

impl FfiPetsClient {
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self {
            catalog: PetCatalogClient::new(&config.pets_url),
            pipeline: ImageUploadPipeline::new(&config.upload_target_url),
            config,
        }
    }
}

/// Allocate a C string, dropping the content if it holds an interior NUL.
pub(crate) fn c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Length as the `u32` the C structs carry.
pub(crate) fn c_len(len: usize) -> Result<u32, FfiErrorCode> {
    u32::try_from(len).map_err(|_| FfiErrorCode::TooLarge)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request verb. Only GET and POST occur.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// One request header, name and value.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request for the host to execute.
///
/// Built by `pets_build_*` functions. The host executes the request and
/// passes the response back through the matching `pets_parse_*`. `body` is
/// binary (the upload body contains JPEG data) and is null when absent.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: u32,
}

impl FfiHttpRequest {
    /// Move a core request onto the heap in C layout. Fails with `TooLarge`
    /// before allocating anything if a length does not fit in `u32`.
    pub(crate) fn from_core(req: pets_core::HttpRequest) -> Result<*mut Self, FfiErrorCode> {
        let body_len = c_len(req.body.as_ref().map_or(0, Vec::len))?;
        let headers_len = c_len(req.headers.len())?;
        let url = c_string(req.url);

        let body = match req.body {
            Some(b) if !b.is_empty() => Box::into_raw(b.into_boxed_slice()) as *mut u8,
            _ => std::ptr::null_mut(),
        };

        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Ok(Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            body_len,
        })))
    }
}

// ---------------------------------------------------------------------------
// Response input (owned by the host)
// ---------------------------------------------------------------------------

/// What the host got back: status and raw body bytes.
///
/// Lives on the host side. `pets_parse_*` copies the body and never frees
/// it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiPetsResult` and through the `out_error`
/// parameter of `pets_build_upload`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Transport = 1,
    Decode = 2,
    TargetResolution = 3,
    InvalidTargetUrl = 4,
    UploadRejected = 5,
    ImageEncoding = 6,
    Panic = 7,
    NullArg = 8,
    /// A body or list longer than `u32::MAX`.
    TooLarge = 9,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::Decode => FfiErrorCode::Decode,
            ErrorKind::TargetResolution => FfiErrorCode::TargetResolution,
            ErrorKind::InvalidTargetUrl => FfiErrorCode::InvalidTargetUrl,
            ErrorKind::UploadRejected => FfiErrorCode::UploadRejected,
            ErrorKind::ImageEncoding => FfiErrorCode::ImageEncoding,
        }
    }
}

/// Tag that tells `pets_free_result` what `FfiPetsResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    PetList = 1,
    UploadTarget = 2,
}

/// A single pet record exposed to C.
#[repr(C)]
pub struct FfiPet {
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub image_url: *mut c_char,
    pub created_at: *mut c_char,
}

/// A list of pet records exposed to C, in server order.
#[repr(C)]
pub struct FfiPetList {
    pub items: *mut FfiPet,
    pub len: u32,
}

/// A resolved, validated upload target.
#[repr(C)]
pub struct FfiUploadTarget {
    pub url: *mut c_char,
}

/// Outcome of every `pets_parse_*` call.
///
/// `error_code == Ok` means `error_message` is null and `data_tag` says what
/// `data` holds (possibly nothing). Any other code carries a message, and
/// `http_status` when the server rejected an upload; `data` is then null.
#[repr(C)]
pub struct FfiPetsResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiPetsResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiPetsResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiPetsResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying an `FfiPetList`.
    pub(crate) fn ok_pet_list(pets: Vec<PetRecord>) -> *mut Self {
        let Ok(len) = c_len(pets.len()) else {
            return Self::err(
                FfiErrorCode::TooLarge,
                0,
                format!("{} records do not fit in a C list", pets.len()),
            );
        };
        let items = if pets.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_pets: Box<[FfiPet]> = pets
                .into_iter()
                .map(|p| FfiPet {
                    title: c_string(p.title),
                    description: c_string(p.description),
                    image_url: c_string(p.image_url),
                    created_at: c_string(p.created_at),
                })
                .collect();
            Box::into_raw(ffi_pets) as *mut FfiPet
        };

        let ffi_list = Box::new(FfiPetList { items, len });
        Self::ok(
            FfiDataTag::PetList,
            Box::into_raw(ffi_list) as *mut std::ffi::c_void,
        )
    }

    /// Build a success result carrying an `FfiUploadTarget`.
    pub(crate) fn ok_upload_target(target: UploadTarget) -> *mut Self {
        let ffi_target = Box::new(FfiUploadTarget {
            url: c_string(target.url),
        });
        Self::ok(
            FfiDataTag::UploadTarget,
            Box::into_raw(ffi_target) as *mut std::ffi::c_void,
        )
    }

    /// Build a success result with no data payload (accepted upload).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Map a core error onto its code and message.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let http_status = err.http_status().unwrap_or(0);
        Self::err(err.kind().into(), http_status, err.to_string())
    }

    /// `name` is the offending parameter.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
