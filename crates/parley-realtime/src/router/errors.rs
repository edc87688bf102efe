//! Mapping from engine errors to client error events.

use tracing::{debug, error};

use parley_core::AppError;
use parley_core::error::ErrorKind;

use crate::connection::handle::ConnectionId;
use crate::message::builder::build_error;
use crate::message::types::OutboundMessage;

/// Builds the error event for a rejected action.
///
/// Client-facing kinds keep their message. Anything else is logged in full
/// and reported under `fallback` with a generic message.
pub(super) fn client_error(
    conn_id: ConnectionId,
    err: &AppError,
    fallback: ErrorKind,
) -> OutboundMessage {
    if err.kind.is_client_facing() {
        debug!(conn_id = %conn_id, error = %err, "Action rejected");
        return build_error(err.kind, err.message.clone());
    }

    error!(
        conn_id = %conn_id,
        error = %err,
        source = ?err.source,
        "Action failed"
    );
    build_error(fallback, generic_message(fallback))
}

/// Converts a collaborator failure during an access check into an
/// authorization error.
pub(super) fn access_check_failed(err: AppError) -> AppError {
    if err.kind == ErrorKind::Authorization {
        return err;
    }
    if !err.kind.is_client_facing() {
        error!(error = %err, source = ?err.source, "Membership check failed");
    }
    AppError::authorization("Not authorized")
}

fn generic_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Authorization => "Not authorized",
        _ => "Request could not be processed",
    }
}
