use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "new_password": { "type": "string", "minLength": 1 },
            "request_timeout_secs": { "type": "integer", "minimum": 1 },
            "trigger_timeout_secs": { "type": "integer", "minimum": 1 },
            "uid_search_bound": { "type": "integer", "minimum": 1 },
            "token_length": { "type": "integer", "minimum": 1, "maximum": 256 },
            "xss_port": { "type": "integer", "minimum": 1, "maximum": 65535 },
            "shell_port": { "type": "integer", "minimum": 1, "maximum": 65535 },
            "trigger_delay_ms": { "type": "integer", "minimum": 0 },
            "settle_delay_ms": { "type": "integer", "minimum": 0 },
            "continue_on_bypass_failure": { "type": "boolean" },
            "injection_anchor": { "type": "string", "minLength": 1 },
            "session_cookie": { "type": "string", "minLength": 1 },
            "spray_tokens": {
                "type": "array",
                "minItems": 1,
                "items": { "type": "string" }
            },
            "markers": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "user_exists": { "type": "string" },
                    "email_sent": { "type": "string" },
                    "password_changed": { "type": "string" },
                    "login": { "type": "array", "items": { "type": "string" } },
                    "motd_login": { "type": "string" },
                    "profile_saved": { "type": "string" },
                    "motd_set": { "type": "string" },
                    "upload_saved": { "type": "string" }
                }
            }
        }
    })
});
