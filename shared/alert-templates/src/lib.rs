//! Go-style text templates for alert notifications.
//!
//! Templates are rendered with `gtmpl` against an `ExtendedData` projection
//! of the alert group, with the same default `default.title` and
//! `default.message` definitions Grafana ships. Sources are pre-scanned so
//! pathological nesting or recursive `template` calls are rejected as parse
//! errors instead of exhausting the stack.

mod data;
mod defaults;
mod error;
mod funcs;
mod outline;
mod templates;

pub use data::join_url_path;
pub use defaults::{DEFAULT_MESSAGE_EMBED, DEFAULT_MESSAGE_TITLE_EMBED};
pub use error::{TemplateError, TemplateResult};
pub use templates::{AlertTemplater, Expansion, Templates};
