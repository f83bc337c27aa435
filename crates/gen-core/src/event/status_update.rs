//! Payload con el que los ejecutores de fases reportan su estado.
use serde::{Deserialize, Serialize};

/// Estado reportado por un ejecutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    New,
    Processing,
    Success,
    Error,
    Failed,
}

/// Actualización de estado `{ status, reason }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: EventStatus,
    #[serde(default)]
    pub reason: String,
}

impl StatusUpdate {
    pub fn new(status: EventStatus, reason: impl Into<String>) -> Self {
        Self { status,
               reason: reason.into() }
    }

    /// Construye el payload sustituyendo cada `{}` de `template` por el
    /// siguiente parámetro. Los `{}` sobrantes quedan literales y los
    /// parámetros sobrantes se ignoran.
    pub fn of(status: EventStatus, template: &str, params: &[&dyn std::fmt::Display]) -> Self {
        Self::new(status, format_positional(template, params))
    }
}

fn format_positional(template: &str, params: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut args = params.iter();
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(p) => out.push_str(&p.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
