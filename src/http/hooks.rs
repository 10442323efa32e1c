/// Session-side collaborator invoked when the backend terminates a session:
/// wipe whatever auth state the application holds, then move the user to
/// the login boundary.
pub trait SessionHooks: Send + Sync {
    fn reset_session(&self);
    fn to_login(&self);
}

/// Presentation collaborator for user-facing failure reporting.
pub trait Notifier: Send + Sync {
    /// Transient, non-blocking message.
    fn toast(&self, message: &str);

    /// Blocking confirmation dialog. Implementations must wire every way
    /// out of the dialog (confirm button, close button) to `on_close`; the
    /// pipeline runs session cleanup from that single callback.
    fn modal(&self, title: &str, content: &str, on_close: Box<dyn FnOnce() + Send>);
}

/// No-op hooks for headless or test use.
#[derive(Debug, Default)]
pub struct NullHooks;

impl SessionHooks for NullHooks {
    fn reset_session(&self) {}
    fn to_login(&self) {}
}

/// Notifier that drops everything, for headless or test use.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn toast(&self, _message: &str) {}
    fn modal(&self, _title: &str, _content: &str, _on_close: Box<dyn FnOnce() + Send>) {}
}
