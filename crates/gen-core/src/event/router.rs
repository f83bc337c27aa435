//! Router de notificaciones: decodifica un mensaje crudo según el tipo
//! declarado. Sin efectos más allá de la decodificación.
use gen_domain::WorkflowKind;
use log::debug;

use super::types::{BuildNotificationPayload, OperationNotificationPayload};
use super::ExternalEvent;
use crate::errors::CoreEngineError;

/// Decodifica `raw` como un evento de tipo `kind`.
///
/// Un payload mal formado produce `CoreEngineError::Decode` con un extracto
/// del mensaje; el llamador no debe confirmar (ack) el mensaje.
pub fn route(raw: &str, kind: WorkflowKind) -> Result<ExternalEvent, CoreEngineError> {
    let event = match kind {
        WorkflowKind::Build => serde_json::from_str::<BuildNotificationPayload>(raw).map(ExternalEvent::from),
        WorkflowKind::Operation => serde_json::from_str::<OperationNotificationPayload>(raw).map(ExternalEvent::from),
    }.map_err(|e| CoreEngineError::decode(format!("malformed {kind} notification: {e}"), raw))?;
    debug!("route: decoded {kind} notification identifier='{}'", event.identifier());
    Ok(event)
}
