//! Canned backend payloads

use serde_json::{json, Value};

/// Two-page template: `full_name` required on page one, `notes` optional on
/// page two alongside a required `date`
pub fn two_page_template() -> Value {
    json!({
        "id": 1,
        "name": "Certificate",
        "version": "1.0",
        "type": "official",
        "description": "Completion certificate",
        "pages": [
            {
                "id": 11,
                "name": "front",
                "html": "<h1>{{ full_name }}</h1>",
                "fields": [
                    {"name": "full_name", "label": "Full name", "required": true},
                    {"name": "title", "label": "Title", "required": false}
                ],
                "assets": [
                    {"id": 100, "name": "logo.png", "type": "image/png", "size": 2048, "url": "/media/logo.png"},
                    {"id": 101, "name": "seal.svg", "type": "image/svg+xml", "size": 512, "url": "/media/seal.svg"}
                ]
            },
            {
                "id": 12,
                "name": "back",
                "fields": [
                    {"name": "date", "label": "Date", "required": true, "type": "date"},
                    {"name": "notes", "label": "Notes", "required": false}
                ]
            }
        ]
    })
}

/// Single-page template with one required `title`
pub fn single_field_template() -> Value {
    json!({
        "id": 1,
        "name": "Memo",
        "type": "business",
        "pages": [
            {"id": 5, "name": "main", "fields": [{"name": "title", "label": "Title", "required": true}]}
        ]
    })
}

/// Template with no pages
pub fn empty_template() -> Value {
    json!({"id": 3, "name": "Draft", "type": "personal", "pages": []})
}
