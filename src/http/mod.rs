mod classify;
mod client;
mod envelope;
mod error;
mod hooks;
mod msg_stack;
mod refresh;
mod request;

pub use classify::{Classifier, Outcome};
pub use client::ApiClient;
pub use envelope::BackendEnvelope;
pub use error::{ApiError, ErrorKind};
pub use hooks::{NullHooks, NullNotifier, Notifier, SessionHooks};
pub use msg_stack::ErrorMsgStack;
pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use request::{Body, PartData, PartValue, RequestDescriptor};
