//! Canonical logging macros
//!
//! Every operation boundary logs exactly one `start` and one `end` or
//! `end_error` event carrying the same `op` field.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use ledgerutil_core::log_op_start;
/// log_op_start!("open_snapshot");
/// log_op_start!("open_snapshot", snapshot = "/data/snap1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use ledgerutil_core::log_op_end;
/// log_op_end!("open_snapshot", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error is borrowed, so the caller can still return it.
///
/// # Example
///
/// ```
/// # use ledgerutil_core::log_op_error;
/// # use ledgerutil_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Io);
/// log_op_error!("open_snapshot", &err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: &$crate::errors::ExError = $err;
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: &$crate::errors::ExError = $err;
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::ledgerutil_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
            $($field)*
        );
    }};
}
