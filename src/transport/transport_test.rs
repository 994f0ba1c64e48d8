use std::sync::Arc;

use super::transport_flow_registry::flow_id;
use super::*;
use crate::dtls_transport::dtls_role::DTLSRole;
use crate::dtls_transport::srtp_protection_profile::SrtpProtectionProfile;
use crate::error::{Error, ErrorKind, Result};
use crate::ice_transport::IceContext;
use crate::peer_connection::peer_connection_test::*;
use crate::runtime::ExecutionContext;

fn new_registry(
    ice_context: Arc<dyn IceContext>,
    dtls_engine: Arc<MockDtlsEngine>,
) -> Result<TransportFlowRegistry> {
    Ok(TransportFlowRegistry::new(
        "1a2b3c",
        ice_context,
        security_context(dtls_engine),
        network_thread()?,
    ))
}

#[test]
fn test_flow_id() {
    assert_eq!(flow_id("1a2b3c", 0, false), "1a2b3c:0,rtp");
    assert_eq!(flow_id("1a2b3c", 4, true), "1a2b3c:4,rtcp");
}

#[tokio::test]
async fn test_get_or_create_reuses_flow() -> Result<()> {
    let ice = Arc::new(MockIceContext::new());
    let engine = Arc::new(MockDtlsEngine::default());
    let registry = new_registry(ice.clone(), engine.clone())?;
    let association = transport_association(DTLSRole::Client);

    let first = registry.get_or_create(0, false, &association).await?;
    let second = registry.get_or_create(0, false, &association).await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len().await, 1);

    let rtcp = registry.get_or_create(0, true, &association).await?;
    assert!(!Arc::ptr_eq(&first, &rtcp));
    assert_eq!(registry.len().await, 2);
    assert_eq!(first.id(), "1a2b3c:0,rtp");
    assert_eq!(rtcp.id(), "1a2b3c:0,rtcp");

    first.wait_established().await?;
    rtcp.wait_established().await?;
    assert_eq!(engine.handshakes(), 2);
    assert_eq!(ice.connected(), vec![(0, 1), (0, 2)]);
    assert_eq!(first.layer_ids(), vec!["ice", "dtls"]);
    assert_eq!(
        first.srtp_protection_profile(),
        Some(SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80)
    );

    Ok(())
}

#[tokio::test]
async fn test_concurrent_get_or_create() -> Result<()> {
    let registry = Arc::new(new_registry(
        Arc::new(MockIceContext::new()),
        Arc::new(MockDtlsEngine::default()),
    )?);
    let association = Arc::new(transport_association(DTLSRole::Server));

    let mut handles = vec![];
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        let association = Arc::clone(&association);
        handles.push(tokio::spawn(async move {
            registry.get_or_create(2, false, &association).await
        }));
    }

    let mut flows = vec![];
    for handle in handles {
        flows.push(handle.await.map_err(|e| Error::new(e.to_string()))??);
    }
    assert!(flows.iter().all(|f| Arc::ptr_eq(f, &flows[0])));
    assert_eq!(registry.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_malformed_fingerprint_is_not_registered() -> Result<()> {
    let registry = new_registry(
        Arc::new(MockIceContext::new()),
        Arc::new(MockDtlsEngine::default()),
    )?;

    let mut association = transport_association(DTLSRole::Client);
    association.fingerprints[0].value = "AB:CD:not-hex".to_owned();

    let err = registry
        .get_or_create(1, false, &association)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(registry.get(1, false).await.is_none());
    assert!(registry.is_empty().await);

    let association = transport_association(DTLSRole::Client);
    let flow = registry.get_or_create(1, false, &association).await?;
    assert_eq!(registry.get(1, false).await.map(|f| f.id().to_owned()), Some(flow.id().to_owned()));
    flow.wait_established().await?;

    Ok(())
}

#[tokio::test]
async fn test_invalid_security_configuration() -> Result<()> {
    let ice: Arc<dyn IceContext> = Arc::new(MockIceContext::new());
    let engine = Arc::new(MockDtlsEngine::default());

    // unknown hash function
    let registry = new_registry(Arc::clone(&ice), engine.clone())?;
    let mut association = transport_association(DTLSRole::Client);
    association.fingerprints[0].algorithm = "md5".to_owned();
    let result = registry.get_or_create(0, false, &association).await;
    assert_eq!(
        result.unwrap_err(),
        Error::ErrUnsupportedHashAlgorithm("md5".to_owned())
    );

    // digest too short for sha-256
    let mut association = transport_association(DTLSRole::Client);
    association.fingerprints[0].value = "AB:CD".to_owned();
    let result = registry.get_or_create(0, false, &association).await;
    assert!(matches!(
        result,
        Err(Error::ErrInvalidVerificationDigest { expected: 32, actual: 2, .. })
    ));

    // no local identity
    let mut security = security_context(engine.clone());
    security.identity_provider =
        Arc::new(crate::dtls_transport::identity::StaticIdentityProvider::new(None));
    let registry = TransportFlowRegistry::new("1a2b3c", Arc::clone(&ice), security, network_thread()?);
    let result = registry
        .get_or_create(0, false, &transport_association(DTLSRole::Client))
        .await;
    assert_eq!(result.unwrap_err(), Error::ErrMissingIdentity);
    assert!(registry.is_empty().await);

    // nothing to offer for SRTP
    let mut security = security_context(engine);
    security.srtp_protection_profiles = vec![];
    let registry = TransportFlowRegistry::new("1a2b3c", ice, security, network_thread()?);
    let result = registry
        .get_or_create(0, false, &transport_association(DTLSRole::Client))
        .await;
    assert_eq!(result.map_err(|e| e.kind()).err(), Some(ErrorKind::Configuration));
    assert!(registry.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_flow_is_visible_before_established() -> Result<()> {
    let (ice, gate) = MockIceContext::gated();
    let registry = new_registry(Arc::new(ice), Arc::new(MockDtlsEngine::default()))?;

    let flow = registry
        .get_or_create(0, false, &transport_association(DTLSRole::Client))
        .await?;
    assert_ne!(flow.state(), TransportFlowState::Established);

    let mut state_rx = flow.state_changes();
    while *state_rx.borrow_and_update() != TransportFlowState::LayersPushed {
        state_rx
            .changed()
            .await
            .map_err(|e| Error::new(e.to_string()))?;
    }
    assert_eq!(registry.get(0, false).await.map(|f| f.state()), Some(TransportFlowState::LayersPushed));

    gate.send_replace(true);
    flow.wait_established().await?;
    assert_eq!(flow.state(), TransportFlowState::Established);

    Ok(())
}

#[tokio::test]
async fn test_flow_fails_without_ice_media_stream() -> Result<()> {
    let registry = new_registry(
        Arc::new(MockIceContext::without_level(3)),
        Arc::new(MockDtlsEngine::default()),
    )?;

    let flow = registry
        .get_or_create(3, false, &transport_association(DTLSRole::Client))
        .await?;
    assert_eq!(flow.wait_established().await, Err(Error::ErrFlowFailed));
    assert_eq!(flow.state(), TransportFlowState::Failed);
    assert!(flow.layer_ids().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_flow_fails_on_terminal_errors() -> Result<()> {
    let engine = Arc::new(MockDtlsEngine::failing());
    let registry = new_registry(Arc::new(MockIceContext::new()), engine.clone())?;
    let flow = registry
        .get_or_create(0, false, &transport_association(DTLSRole::Server))
        .await?;
    assert_eq!(flow.wait_established().await, Err(Error::ErrFlowFailed));
    assert_eq!(engine.handshakes(), 1);
    assert_eq!(flow.srtp_protection_profile(), None);

    let engine = Arc::new(MockDtlsEngine::default());
    let registry = new_registry(Arc::new(MockIceContext::failing()), engine.clone())?;
    let flow = registry
        .get_or_create(0, false, &transport_association(DTLSRole::Server))
        .await?;
    assert_eq!(flow.wait_established().await, Err(Error::ErrFlowFailed));
    assert_eq!(engine.handshakes(), 0);

    Ok(())
}

#[tokio::test]
async fn test_close_all() -> Result<()> {
    let (ice, _gate) = MockIceContext::gated();
    let registry = new_registry(Arc::new(ice), Arc::new(MockDtlsEngine::default()))?;
    let association = transport_association(DTLSRole::Client);

    let rtp = registry.get_or_create(0, false, &association).await?;
    let rtcp = registry.get_or_create(0, true, &association).await?;
    let other = registry.get_or_create(1, false, &association).await?;
    let ids: Vec<String> = registry
        .flows()
        .await
        .iter()
        .map(|f| f.id().to_owned())
        .collect();
    assert_eq!(ids, vec!["1a2b3c:0,rtp", "1a2b3c:0,rtcp", "1a2b3c:1,rtp"]);

    let removed = registry.remove(1, false).await;
    assert!(removed.is_some());
    assert_eq!(registry.len().await, 2);
    assert_ne!(other.state(), TransportFlowState::Closed);

    registry.close_all().await;
    assert!(registry.is_empty().await);
    assert_eq!(rtp.state(), TransportFlowState::Closed);
    assert_eq!(rtcp.wait_established().await, Err(Error::ErrFlowClosed));

    assert!(registry.is_closed());
    assert!(matches!(
        registry.get_or_create(0, false, &association).await,
        Err(Error::ErrSessionClosed)
    ));
    assert!(registry.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_push_layers_requires_network_context() -> Result<()> {
    let flow = Arc::new(TransportFlow::new("x:0,rtp".to_owned(), 0, false));
    let result = flow.push_layers(TransportLayerStack::new());
    assert_eq!(
        result,
        Err(Error::ErrWrongExecutionContext {
            expected: ExecutionContext::Network,
            actual: ExecutionContext::Control,
        })
    );
    assert_eq!(flow.state(), TransportFlowState::Created);

    let network = network_thread()?;
    let pushed = Arc::clone(&flow);
    let results = network
        .dispatch(move || async move {
            let incomplete = pushed.push_layers(TransportLayerStack::new());
            let first = pushed.push_layers(complete_stack());
            let second = pushed.push_layers(complete_stack());
            (incomplete, first, second)
        })?
        .wait()
        .await?;
    assert_eq!(results.0, Err(Error::ErrTransportLayerOrder));
    assert_eq!(results.1, Ok(()));
    assert_eq!(results.2, Err(Error::ErrTransportLayersAlreadyPushed));

    flow.wait_established().await?;

    Ok(())
}

fn complete_stack() -> TransportLayerStack {
    let ctx: Arc<dyn IceContext> = Arc::new(MockIceContext::new());
    let mut ice = IceLayer::new("x", Default::default());
    if let Some(stream) = ctx.media_stream(0) {
        ice.set_parameters(Arc::clone(&ctx), stream, 1);
    }

    let mut dtls = DtlsLayer::new(Arc::new(MockDtlsEngine::default()));
    dtls.set_identity(test_identity());
    let _ = dtls.set_srtp_ciphers(vec![SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_32]);

    let mut stack = TransportLayerStack::new();
    let _ = stack.push(Box::new(ice));
    let _ = stack.push(Box::new(dtls));
    stack
}

#[test]
fn test_layer_stack_order() {
    let engine = Arc::new(MockDtlsEngine::default());
    let mut stack = TransportLayerStack::new();
    assert!(stack.is_empty());
    assert_eq!(
        stack.push(Box::new(DtlsLayer::new(engine.clone()))),
        Err(Error::ErrTransportLayerOrder)
    );
    assert_eq!(stack.push(Box::new(IceLayer::new("x", Default::default()))), Ok(()));
    assert_eq!(
        stack.push(Box::new(IceLayer::new("x", Default::default()))),
        Err(Error::ErrTransportLayerOrder)
    );
    assert!(!stack.is_complete());
    assert_eq!(stack.push(Box::new(DtlsLayer::new(engine.clone()))), Ok(()));
    assert!(stack.is_complete());
    assert_eq!(stack.ids(), vec!["ice", "dtls"]);
    assert_eq!(
        stack.push(Box::new(DtlsLayer::new(engine))),
        Err(Error::ErrTransportLayerOrder)
    );
}

#[test]
fn test_dtls_layer_configuration() {
    let mut dtls = DtlsLayer::new(Arc::new(MockDtlsEngine::default()));

    dtls.set_role(DTLSRole::Auto);
    assert_eq!(dtls.role(), DTLSRole::Server);
    dtls.set_role(DTLSRole::Client);
    assert_eq!(dtls.role(), DTLSRole::Client);

    assert_eq!(dtls.set_verification_digest("SHA-1", &[0u8; 20]), Ok(()));
    assert_eq!(dtls.verification_digests()[0].algorithm, "sha-1");
    assert!(dtls.set_verification_digest("sha-512", &[0u8; 64]).is_ok());
    assert!(dtls.set_verification_digest("sha-384", &[0u8; 20]).is_err());

    assert_eq!(
        dtls.set_srtp_ciphers(vec![
            SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80,
            SrtpProtectionProfile::Srtp_Aes128_Cm_Hmac_Sha1_80,
        ])
        .map_err(|e| e.kind()),
        Err(ErrorKind::Configuration)
    );
    assert!(dtls.srtp_ciphers().is_empty());
}
