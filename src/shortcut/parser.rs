//! Parsers for the page's opaque storage blobs.
//!
//! The page keeps its voice settings as JSON strings in key/value storage.
//! Only two keys matter here:
//!
//! | Key                      | Relevant shape                                                    |
//! |--------------------------|-------------------------------------------------------------------|
//! | [`MEDIA_ENGINE_KEY`]     | `{"default": {"mode": "...", "modeOptions": {"shortcut": [[0, code, 4], ...]}}}` |
//! | [`SELECTED_CHANNEL_KEY`] | `{"selectedVoiceChannelId": id \| null, "lastConnectedTime": n}`  |
//!
//! Every other field in those blobs is ignored.  Both parsers fail soft: a
//! malformed blob is logged and treated as "disabled" / "not broadcasting".

use serde::Deserialize;
use serde_json::Value;

use super::{PttShortcut, ShortcutError};

/// Storage key holding the voice engine settings (mode + PTT shortcut).
pub const MEDIA_ENGINE_KEY: &str = "MediaEngineStore";

/// Storage key holding the currently selected voice channel.
pub const SELECTED_CHANNEL_KEY: &str = "SelectedChannelStore";

/// Value of `default.mode` when push-to-talk is enabled.
pub const PUSH_TO_TALK_MODE: &str = "PUSH_TO_TALK";

/// Device class of a keyboard shortcut entry.
pub const DEVICE_KEYBOARD: i64 = 0;

/// Trigger class of a shortcut captured in the page (as opposed to a native
/// client hook).
pub const TRIGGER_BROWSER: i64 = 4;

// ---------------------------------------------------------------------------
// Blob shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaEngineBlob {
    default: MediaEngineSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaEngineSettings {
    mode: String,
    #[serde(default)]
    mode_options: Option<ModeOptions>,
}

#[derive(Debug, Deserialize)]
struct ModeOptions {
    shortcut: Vec<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectedChannelBlob {
    #[serde(default)]
    selected_voice_channel_id: Option<Value>,
    #[serde(default)]
    last_connected_time: Option<f64>,
}

// ---------------------------------------------------------------------------
// Shortcut
// ---------------------------------------------------------------------------

/// Strict parse of a [`MEDIA_ENGINE_KEY`] blob.
///
/// A blob whose mode is not push-to-talk parses successfully to
/// [`PttShortcut::Disabled`]; shape violations are errors.
pub fn try_parse_shortcut(blob: &str) -> Result<PttShortcut, ShortcutError> {
    let parsed: MediaEngineBlob = serde_json::from_str(blob)?;
    let settings = parsed.default;

    if settings.mode != PUSH_TO_TALK_MODE {
        return Ok(PttShortcut::Disabled);
    }

    let options = settings
        .mode_options
        .ok_or(ShortcutError::MissingShortcut)?;

    let mut codes = Vec::with_capacity(options.shortcut.len());
    for (index, entry) in options.shortcut.iter().enumerate() {
        let code = match entry.as_slice() {
            &[DEVICE_KEYBOARD, code, TRIGGER_BROWSER] => code,
            _ => {
                return Err(ShortcutError::UnrecognisedEntry {
                    index,
                    entry: entry.clone(),
                })
            }
        };
        let code = u32::try_from(code).map_err(|_| ShortcutError::CodeOutOfRange(code))?;
        codes.push(code);
    }

    Ok(PttShortcut::from_codes(codes))
}

/// Fail-soft parse of an optional [`MEDIA_ENGINE_KEY`] blob.
///
/// A missing blob (first use of the page) and any parse failure both yield
/// [`PttShortcut::Disabled`]; failures are logged.
pub fn parse_shortcut(blob: Option<&str>) -> PttShortcut {
    let Some(blob) = blob else {
        return PttShortcut::Disabled;
    };

    match try_parse_shortcut(blob) {
        Ok(shortcut) => shortcut,
        Err(e) => {
            log::error!("shortcut: couldn't parse PTT shortcut: {e}");
            PttShortcut::Disabled
        }
    }
}

/// Serialise `shortcut` into a minimal [`MEDIA_ENGINE_KEY`] blob.
///
/// A disabled shortcut is written as voice-activity mode with no
/// `modeOptions`.
pub fn encode_shortcut(shortcut: &PttShortcut) -> String {
    let value = match shortcut {
        PttShortcut::Enabled(spec) => {
            let entries: Vec<[i64; 3]> = spec
                .codes()
                .iter()
                .map(|&code| [DEVICE_KEYBOARD, i64::from(code), TRIGGER_BROWSER])
                .collect();
            serde_json::json!({
                "default": {
                    "mode": PUSH_TO_TALK_MODE,
                    "modeOptions": { "shortcut": entries },
                }
            })
        }
        PttShortcut::Disabled => serde_json::json!({
            "default": { "mode": "VOICE_ACTIVITY" }
        }),
    };
    value.to_string()
}

// ---------------------------------------------------------------------------
// Broadcasting status
// ---------------------------------------------------------------------------

/// Strict parse of a [`SELECTED_CHANNEL_KEY`] blob.
pub fn try_parse_broadcasting(blob: &str) -> Result<bool, ShortcutError> {
    let parsed: SelectedChannelBlob = serde_json::from_str(blob)?;
    let in_channel = parsed.selected_voice_channel_id.is_some();
    let connected = parsed.last_connected_time != Some(0.0);
    Ok(in_channel && connected)
}

/// Fail-soft parse of an optional [`SELECTED_CHANNEL_KEY`] blob.
///
/// The page is broadcasting iff a voice channel is selected and
/// `lastConnectedTime` is non-zero.
pub fn parse_broadcasting(blob: Option<&str>) -> bool {
    let Some(blob) = blob else {
        return false;
    };

    match try_parse_broadcasting(blob) {
        Ok(broadcasting) => broadcasting,
        Err(e) => {
            log::error!("shortcut: couldn't parse broadcasting status: {e}");
            false
        }
    }
}
