use std::sync::Mutex;

/// Messages currently on screen, used to suppress duplicate modal prompts
/// when several in-flight requests fail with the same backend message.
///
/// Entries are pushed when a modal is shown and removed by the modal's
/// cleanup callback; only membership matters, ordering does not.
#[derive(Debug, Default)]
pub struct ErrorMsgStack {
    inner: Mutex<Vec<String>>,
}

impl ErrorMsgStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `msg` unless it is already present. Returns whether the
    /// message was newly inserted (i.e. whether a prompt should be shown).
    pub fn push(&self, msg: &str) -> bool {
        let mut stack = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if stack.iter().any(|existing| existing == msg) {
            return false;
        }
        stack.push(msg.to_owned());
        true
    }

    /// Remove one occurrence of `msg`, if present.
    pub fn remove(&self, msg: &str) {
        let mut stack = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = stack.iter().position(|existing| existing == msg) {
            stack.remove(index);
        }
    }

    pub fn contains(&self, msg: &str) -> bool {
        let stack = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        stack.iter().any(|existing| existing == msg)
    }

    pub fn is_empty(&self) -> bool {
        let stack = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_duplicates() {
        let stack = ErrorMsgStack::new();
        assert!(stack.push("session revoked"));
        assert!(!stack.push("session revoked"));
        assert!(stack.push("another message"));
        assert!(stack.contains("session revoked"));
    }

    #[test]
    fn remove_restores_pushability() {
        let stack = ErrorMsgStack::new();
        stack.push("session revoked");
        stack.remove("session revoked");
        assert!(!stack.contains("session revoked"));
        assert!(stack.push("session revoked"));
    }

    #[test]
    fn remove_missing_is_a_no_op() {
        let stack = ErrorMsgStack::new();
        stack.remove("never there");
        assert!(stack.is_empty());
    }
}
