//! Table-driven checks of every build/parse pair, fed from `test-vectors/*.json`.
//!
//! A case names the request it expects, the response to feed back, and
//! either the decoded value or the `ErrorKind` that must come out.

use pets_core::{
    ErrorKind, HttpMethod, HttpResponse, ImageUploadPipeline, PetCatalogClient, PetRecord,
    UploadRequest, UploadTarget,
};

const BASE_URL: &str = "http://localhost:3000";

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "Transport" => ErrorKind::Transport,
        "Decode" => ErrorKind::Decode,
        "TargetResolution" => ErrorKind::TargetResolution,
        "InvalidTargetUrl" => ErrorKind::InvalidTargetUrl,
        "UploadRejected" => ErrorKind::UploadRejected,
        other => panic!("unknown error kind: {other}"),
    }
}

fn simulated_response(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_test_vectors() {
    let raw = include_str!("../../test-vectors/catalog.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = PetCatalogClient::new(&format!("{BASE_URL}/pets"));
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_fetch_all();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let result = c.parse_fetch_all(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), parse_kind(expected_error.as_str().unwrap()), "{name}: error kind");
        } else {
            let pets = result.unwrap();
            let expected: Vec<PetRecord> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(pets, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Upload target
// ---------------------------------------------------------------------------

#[test]
fn upload_target_test_vectors() {
    let raw = include_str!("../../test-vectors/upload_target.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let p = ImageUploadPipeline::new(&format!("{BASE_URL}/upload"));
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = p.build_resolve_target();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        // Verify parse
        let result = p.parse_resolve_target(simulated_response(case));
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), parse_kind(expected_error.as_str().unwrap()), "{name}: error kind");
        } else {
            let target = result.unwrap();
            let expected = case["expected_result"]["url"].as_str().unwrap();
            assert_eq!(target.url, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Multipart POST
// ---------------------------------------------------------------------------

#[test]
fn upload_test_vectors() {
    let raw = include_str!("../../test-vectors/upload.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let p = ImageUploadPipeline::new(&format!("{BASE_URL}/upload"));
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let target = UploadTarget {
            url: case["target"].as_str().unwrap().to_string(),
        };
        let request = UploadRequest {
            app_id: input["app_id"].as_str().unwrap().to_string(),
            original_url: input["original_url"].as_str().unwrap().to_string(),
            image_bytes: serde_json::from_value(input["image_bytes"].clone()).unwrap(),
        };

        // Verify build
        let req = p.build_post_multipart(&target, &request);
        assert_eq!(req.method, HttpMethod::Post, "{name}: method");
        assert_eq!(req.url, target.url, "{name}: url");

        let content_type = req.header("content-type").unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap_or_else(|| panic!("{name}: bad content-type {content_type}"));
        let body = req.body.as_deref().unwrap();
        let parts = split_parts(body, boundary);

        let names: Vec<String> = parts.iter().map(|(headers, _)| part_name(headers)).collect();
        let expected_names: Vec<String> = serde_json::from_value(case["expected_parts"].clone()).unwrap();
        assert_eq!(names, expected_names, "{name}: part names");

        assert_eq!(parts[0].1, request.app_id.as_bytes(), "{name}: appid");
        assert_eq!(parts[1].1, request.original_url.as_bytes(), "{name}: original");
        assert!(parts[2].0.contains("filename=\"image.jpg\""), "{name}: filename");
        assert!(parts[2].0.contains("Content-Type: image/jpeg"), "{name}: file type");
        assert_eq!(parts[2].1, request.image_bytes.as_slice(), "{name}: file data");

        // Verify parse
        let result = p.parse_post_multipart(simulated_response(case));
        match case["expected_result"].as_str().unwrap() {
            "Success" => assert!(result.is_ok(), "{name}: expected success"),
            kind => assert_eq!(result.unwrap_err().kind(), parse_kind(kind), "{name}: error kind"),
        }
    }
}

/// Split a multipart body into `(header block, content)` pairs.
fn split_parts<'a>(body: &'a [u8], boundary: &str) -> Vec<(String, &'a [u8])> {
    let delimiter = format!("--{boundary}");
    let closing = format!("{delimiter}--\r\n");
    assert!(body.ends_with(closing.as_bytes()), "body must end with closing delimiter");

    let mut parts = Vec::new();
    let mut rest = body;
    let opening = format!("{delimiter}\r\n");
    while rest.starts_with(opening.as_bytes()) {
        rest = &rest[opening.len()..];
        let header_end = find(rest, b"\r\n\r\n").expect("part headers end");
        let headers = String::from_utf8(rest[..header_end].to_vec()).unwrap();
        rest = &rest[header_end + 4..];

        let next = format!("\r\n{delimiter}");
        let content_end = find(rest, next.as_bytes()).expect("part content end");
        parts.push((headers, &rest[..content_end]));
        rest = &rest[content_end + 2..];
    }
    assert_eq!(rest, closing.as_bytes());
    parts
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn part_name(headers: &str) -> String {
    let start = headers.find("name=\"").expect("name attribute") + 6;
    let len = headers[start..].find('"').unwrap();
    headers[start..start + len].to_string()
}
