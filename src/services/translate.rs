use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::http::{ApiClient, ApiError, PartData, RequestDescriptor};

const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters for a full text translation call.
#[derive(Debug, Clone, Serialize)]
pub struct TextTranslation {
    pub text: String,
    pub target_language: String,
    pub model_provider: String,
    pub model_name: String,
    pub api_key: String,
    pub prompt_content: String,
    pub use_json_format: bool,
    pub custom_base_url: String,
    pub rpm_limit_translation: u32,
}

/// A recorded audio clip submitted for speech recognition.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub audio: Vec<u8>,
    pub language: String,
    pub engine_type: String,
}

impl SpeechClip {
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            language: "zh_cn".to_owned(),
            engine_type: "sms16k".to_owned(),
        }
    }
}

/// Translation and speech endpoints.
#[derive(Clone)]
pub struct TranslateApi {
    client: ApiClient,
}

impl TranslateApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
        model_provider: &str,
        model_name: &str,
        api_key: &str,
    ) -> Result<Value, ApiError> {
        let descriptor =
            RequestDescriptor::post("/api/translate_single_text/").json(serde_json::json!({
                "original_text": text,
                "target_language": target_language,
                "model_provider": model_provider,
                "model_name": model_name,
                "api_key": api_key,
            }));
        self.client.send(&descriptor).await
    }

    pub async fn translate_text_full(&self, params: &TextTranslation) -> Result<Value, ApiError> {
        let descriptor = RequestDescriptor::post("/api/text-translate/")
            .json(serde_json::to_value(params)?)
            .timeout(TRANSLATE_TIMEOUT);
        self.client.send(&descriptor).await
    }

    /// Upload a recorded clip for recognition. The multipart boundary is
    /// computed by the transport, so no content-type is set here.
    pub async fn speech_recognition(&self, clip: &SpeechClip) -> Result<Value, ApiError> {
        let descriptor = RequestDescriptor::post("/api/speech-recognition/")
            .multipart([
                PartData::file(
                    "audio_data",
                    "recording.wav",
                    "audio/wav",
                    clip.audio.clone(),
                ),
                PartData::text("audio_format", "wav"),
                PartData::text("language", clip.language.clone()),
                PartData::text("engine_type", clip.engine_type.clone()),
            ])
            .timeout(TRANSLATE_TIMEOUT);
        self.client.send(&descriptor).await
    }
}
