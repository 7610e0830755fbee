use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

/// A complete, valid request body for `PATCH /session/request`.
pub fn complete_request(send_copy: bool) -> Value {
    json!({
        "requester": "Jane Doe",
        "requester_email": "jane@example.org",
        "lab_group": "Tumour Biology",
        "protocol": "A23-0042",
        "facility": "BC Cancer",
        "transfer_date": "2025-11-10",
        "strain": "C57BL/6J",
        "quantity": 5,
        "sex": "Female",
        "dob_entries": ["2025-08-01", "2025-08-15"],
        "cage_numbers": "C12, C13",
        "send_copy": send_copy
    })
}

pub fn file_part(name: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_type("application/octet-stream")
}

pub fn upload_form(names: &[&str]) -> MultipartForm {
    names.iter().fold(MultipartForm::new(), |form, name| {
        form.add_part("files", file_part(name, b"PK\x03\x04fixture"))
    })
}
