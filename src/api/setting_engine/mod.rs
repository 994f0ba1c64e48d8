#[cfg(test)]
mod setting_engine_test;

use crate::dtls_transport::srtp_protection_profile::{
    default_srtp_protection_profiles, SrtpProtectionProfile,
};

/// Video codec names the media engine implements natively. Every other video
/// codec needs an external implementation.
pub const DEFAULT_NATIVE_VIDEO_CODECS: &[&str] = &["VP8"];

const DEFAULT_NETWORK_THREAD_NAME: &str = "media-network";
const DEFAULT_PRESENTATION_THREAD_NAME: &str = "media-presentation";

#[derive(Clone)]
pub struct ThreadNames {
    pub network: String,
    pub presentation: String,
}

impl Default for ThreadNames {
    fn default() -> Self {
        ThreadNames {
            network: DEFAULT_NETWORK_THREAD_NAME.to_owned(),
            presentation: DEFAULT_PRESENTATION_THREAD_NAME.to_owned(),
        }
    }
}

/// SettingEngine allows influencing behavior in ways that are not
/// negotiated with the remote peer, e.g. which SRTP ciphers are offered or
/// which video codecs run natively.
#[derive(Clone)]
pub struct SettingEngine {
    pub(crate) srtp_protection_profiles: Vec<SrtpProtectionProfile>,
    pub(crate) native_video_codecs: Vec<String>,
    pub(crate) thread_names: ThreadNames,
}

impl Default for SettingEngine {
    fn default() -> Self {
        SettingEngine {
            srtp_protection_profiles: default_srtp_protection_profiles(),
            native_video_codecs: DEFAULT_NATIVE_VIDEO_CODECS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            thread_names: ThreadNames::default(),
        }
    }
}

impl SettingEngine {
    /// set_srtp_protection_profiles allows the user to override the default srtp Protection Profiles
    /// The default srtp protection profiles are provided by the function `default_srtp_protection_profiles`
    pub fn set_srtp_protection_profiles(&mut self, profiles: Vec<SrtpProtectionProfile>) {
        self.srtp_protection_profiles = profiles
    }

    /// set_native_video_codecs replaces the list of video codec names the
    /// conduits handle without an external implementation. Names compare
    /// case-sensitively against the negotiated codec names.
    pub fn set_native_video_codecs(&mut self, codecs: Vec<String>) {
        self.native_video_codecs = codecs;
    }

    pub fn set_network_thread_name(&mut self, name: String) {
        self.thread_names.network = name;
    }

    pub fn set_presentation_thread_name(&mut self, name: String) {
        self.thread_names.presentation = name;
    }
}
