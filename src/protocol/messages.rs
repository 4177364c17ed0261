use serde::{Deserialize, Serialize};

/// Messages exchanged between the page and the privileged background
/// context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExtensionMessage {
    MuteTab {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    UnmuteTab {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Informational; the background only logs it.
    AdDetected {
        #[serde(default)]
        url: Option<String>,
        #[serde(rename = "adType")]
        ad_type: String,
        #[serde(rename = "fallbackToTabMute", default)]
        fallback_to_tab_mute: bool,
    },
}

impl ExtensionMessage {
    pub fn mute_tab(reason: &str) -> Self {
        Self::MuteTab {
            reason: Some(reason.to_string()),
        }
    }

    pub fn unmute_tab(reason: &str) -> Self {
        Self::UnmuteTab {
            reason: Some(reason.to_string()),
        }
    }
}

/// Reply to a request. Only `success: true` is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BridgeResponse {
    #[serde(default)]
    pub success: bool,
}

impl BridgeResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }

    pub fn failed() -> Self {
        Self { success: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mute_request_wire_shape() {
        let value = serde_json::to_value(ExtensionMessage::mute_tab("overlay-ad-unmutable")).unwrap();
        assert_eq!(value, json!({"type": "muteTab", "reason": "overlay-ad-unmutable"}));

        let bare = serde_json::to_value(ExtensionMessage::UnmuteTab { reason: None }).unwrap();
        assert_eq!(bare, json!({"type": "unmuteTab"}));
    }

    #[test]
    fn ad_notice_uses_camel_case_fields() {
        let parsed: ExtensionMessage = serde_json::from_value(json!({
            "type": "adDetected",
            "url": "https://doubleclick.net/ad.mp4",
            "adType": "video-src-ad",
            "fallbackToTabMute": true
        }))
        .unwrap();
        assert_eq!(
            parsed,
            ExtensionMessage::AdDetected {
                url: Some("https://doubleclick.net/ad.mp4".into()),
                ad_type: "video-src-ad".into(),
                fallback_to_tab_mute: true,
            }
        );
    }

    #[test]
    fn missing_success_is_failure() {
        let response: BridgeResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);
    }
}
