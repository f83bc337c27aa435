//! Eventos externos, router de notificaciones y payload de estado de ejecutores.

mod router;
mod status_update;
mod types;

pub use router::route;
pub use status_update::{EventStatus, StatusUpdate};
pub use types::{BuildEvent, ExternalEvent, OperationEvent};
