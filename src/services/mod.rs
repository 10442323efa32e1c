mod auth;
mod translate;

pub use auth::{AuthApi, LoginToken, RegisterPayload, UserInfo};
pub use translate::{SpeechClip, TextTranslation, TranslateApi};
