use super::*;

#[test]
fn test_setting_engine_defaults() {
    let s = SettingEngine::default();

    assert_eq!(
        s.srtp_protection_profiles,
        vec![
            SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80,
            SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_32,
        ],
        "SettingEngine defaults aren't as expected."
    );
    assert_eq!(s.native_video_codecs, vec!["VP8".to_owned()]);
    assert_eq!(s.thread_names.network, "media-network");
    assert_eq!(s.thread_names.presentation, "media-presentation");
}

#[test]
fn test_setting_engine_setters() {
    let mut s = SettingEngine::default();

    s.set_srtp_protection_profiles(vec![SrtpProtectionProfile::Srtp_Aead_Aes_128_Gcm]);
    assert_eq!(
        s.srtp_protection_profiles,
        vec![SrtpProtectionProfile::Srtp_Aead_Aes_128_Gcm]
    );

    s.set_native_video_codecs(vec!["VP8".to_owned(), "VP9".to_owned()]);
    assert_eq!(s.native_video_codecs.len(), 2);

    s.set_network_thread_name("net-1".to_owned());
    s.set_presentation_thread_name("main-1".to_owned());
    assert_eq!(s.thread_names.network, "net-1");
    assert_eq!(s.thread_names.presentation, "main-1");

    let copy = s.clone();
    assert_eq!(copy.native_video_codecs, s.native_video_codecs);
}
