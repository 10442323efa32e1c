mod session;
mod store;

pub use session::AuthSession;
pub use store::{AuthError, CredentialProvider, MemoryTokenStore, TokenStore};
