//! Operation and diagnostic logging macros
//!
//! Every operation boundary in the workspace logs through these so that the
//! `component` / `op` / `event` fields stay uniform. `component` is the
//! module path of the call site. The macros reach `tracing` and the schema
//! constants through `imxdiff_core`, so callers need no extra dependency.

/// Shared expansion of every event macro.
#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $event:ident, $op:expr $(, $($field:tt)*)?) => {
        $crate::__private::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::__private::schema::$event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use imxdiff_core::log_op_start;
/// log_op_start!("build");
/// log_op_start!("build", container_id = "c-1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, EVENT_START, $op $(, $($field)*)?)
    };
}

/// Log the successful end of an operation. `duration_ms` is mandatory.
///
/// # Example
///
/// ```
/// # use imxdiff_core::log_op_end;
/// log_op_end!("build", duration_ms = 42);
/// log_op_end!("build", duration_ms = 42, object_count = 7);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, EVENT_END, $op, duration_ms = $duration $(, $($field)*)?)
    };
}

/// Log a failed operation
///
/// Accepts anything convertible into `ExError`; its code, kind, message and
/// identifier become event fields.
///
/// # Example
///
/// ```
/// # use imxdiff_core::{log_op_error, errors::ImxError};
/// let err = ImxError::InvalidInput { message: "empty".to_string() };
/// log_op_error!("compare", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__op_event!(
            error,
            EVENT_END_ERROR,
            $op,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
            puic = ex_err.entity_id().unwrap_or_default()
            $(, $($field)*)?
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __diagnostic_event {
    ($level:ident, $op:expr, $entry:ident, $container_id:ident) => {
        $crate::__op_event!(
            $level,
            EVENT_DIAGNOSTIC,
            $op,
            severity = %$entry.severity,
            err_code = $entry.kind.code(),
            puic = %$entry.puic,
            container_id = $container_id,
            "{}",
            $entry.message
        )
    };
}

/// Log one ledger entry at the level matching its severity. CRITICAL
/// entries log at ERROR.
///
/// # Example
///
/// ```
/// # use imxdiff_core::{log_diagnostic, ExErrorKind, LedgerEntry, Severity};
/// let entry = LedgerEntry::new(
///     ExErrorKind::UnconnectedExtension,
///     Severity::Warning,
///     "rc-1",
///     "reffed object not present",
/// );
/// log_diagnostic!("drain", &entry);
/// ```
#[macro_export]
macro_rules! log_diagnostic {
    ($op:expr, $entry:expr) => {{
        let entry: &$crate::ledger::LedgerEntry = $entry;
        let container_id = entry
            .container_id
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or_default();
        match entry.severity {
            $crate::ledger::Severity::Debug => {
                $crate::__diagnostic_event!(debug, $op, entry, container_id)
            }
            $crate::ledger::Severity::Info => {
                $crate::__diagnostic_event!(info, $op, entry, container_id)
            }
            $crate::ledger::Severity::Warning => {
                $crate::__diagnostic_event!(warn, $op, entry, container_id)
            }
            $crate::ledger::Severity::Error | $crate::ledger::Severity::Critical => {
                $crate::__diagnostic_event!(error, $op, entry, container_id)
            }
        }
    }};
}
