//! Field and event names shared by every structured log line
//!
//! The logging macros in `imxdiff-core` emit these names as tracing field
//! identifiers; the test capture layer reads events back through them.

/// Module path of the emitting call site
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

pub const FIELD_CONTAINER_ID: &str = "container_id";
/// Object identifier a diagnostic or error is keyed by
pub const FIELD_PUIC: &str = "puic";
pub const FIELD_DOCUMENT_HASH: &str = "document_hash";
pub const FIELD_SCHEMA_VERSION: &str = "schema_version";
pub const FIELD_OBJECT_COUNT: &str = "object_count";

/// Ledger severity, upper case
pub const FIELD_SEVERITY: &str = "severity";
pub const FIELD_ERR_KIND: &str = "err_kind";
/// Stable `ERR_*` code
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERR_MESSAGE: &str = "err_message";

/// Operation boundary events
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
/// One ledger entry dispatched on drain
pub const EVENT_DIAGNOSTIC: &str = "diagnostic";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [EVENT_START, EVENT_END, EVENT_END_ERROR, EVENT_DIAGNOSTIC];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_fields_are_flat_identifiers() {
        // tracing field names in the macros can not contain dots
        for name in [FIELD_ERR_KIND, FIELD_ERR_CODE, FIELD_ERR_MESSAGE] {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
