//! JSON envelopes exchanged with the client.

use std::collections::HashMap;

use companion_core::FrameError;
use segmenter::Segment;
use serde::{Deserialize, Serialize};
use settings::Settings;

/// Inbound client message. Unknown `type` values fail to decode and are
/// dropped at the frame boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    UserMessage { payload: UserPayload },
    SystemCommand { payload: CommandPayload },
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandPayload {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub value: String,
}

impl InboundMessage {
    /// Decodes one text frame. Invalid JSON and unrecognized message types
    /// are distinct errors, but both end as a logged drop.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| FrameError::InvalidJson(e.to_string()))?;
        serde_json::from_value(value).map_err(|_| FrameError::UnknownType)
    }

    /// The text fed into the conversation pipeline. User messages pass
    /// through; system commands render as a synthetic scene marker the model
    /// can react to.
    pub fn prompt_text(&self) -> String {
        match self {
            InboundMessage::UserMessage { payload } => payload.text.clone(),
            InboundMessage::SystemCommand { payload } => {
                if payload.command.is_empty() {
                    return String::new();
                }
                match payload.command.as_str() {
                    "set_time" => format!("{{时间：{}}}", payload.value),
                    "set_scene" => format!("{{切换场景：{}}}", payload.value),
                    other => format!("{{{}：{}}}", other, payload.value),
                }
            }
        }
    }

    /// Whether the reply envelope should be tagged `narration`.
    pub fn is_command(&self) -> bool {
        matches!(self, InboundMessage::SystemCommand { .. })
    }
}

/// Outbound server message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutboundMessage {
    ServerReady(ReadyPayload),
    AiResponse(SegmentsPayload),
    Narration(SegmentsPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentsPayload {
    pub segments: Vec<Segment>,
}

/// Hello payload sent once a connection becomes ready. All values come from
/// configuration and pass through unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyPayload {
    pub character_name: String,
    pub character_identity: String,
    pub ui_config: UiConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub background_day: String,
    pub background_night: String,
    pub character_sprite_dir: String,
    pub emotion_map: HashMap<String, String>,
    pub sfx_dir: String,
    pub emotion_sfx_map: HashMap<String, String>,
}

impl ReadyPayload {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            character_name: settings.get("Character", "CHARACTER_NAME", "AI"),
            character_identity: settings.get("Character", "CHARACTER_IDENTITY", "助手"),
            ui_config: UiConfig {
                background_day: settings.get("UI", "BACKGROUND_DAY_PATH", ""),
                background_night: settings.get("UI", "BACKGROUND_NIGHT_PATH", ""),
                character_sprite_dir: settings.get("UI", "CHARACTER_SPRITE_DIR", ""),
                emotion_map: settings.section("EmotionMap"),
                sfx_dir: settings.get("UI", "SFX_DIR", "assets/sfx/"),
                emotion_sfx_map: settings.section("EmotionSfxMap"),
            },
        }
    }
}
