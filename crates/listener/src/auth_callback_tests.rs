//! Tests for [`AuthCallback`].

use super::*;
use std::sync::Mutex;

struct FakeExchange {
    fail: bool,
}

impl TokenExchange for FakeExchange {
    fn exchange_code(&self, code: &str) -> anyhow::Result<String> {
        if self.fail {
            anyhow::bail!("bad_verification_code");
        }
        Ok(format!("token-for-{code}"))
    }
}

#[derive(Default)]
struct RecordingStore {
    stored: Mutex<Vec<(Option<InstallationId>, String)>>,
}

impl AuthorizationStore for RecordingStore {
    fn store(&self, installation_id: Option<InstallationId>, access_token: &str) -> anyhow::Result<()> {
        self.stored
            .lock()
            .unwrap()
            .push((installation_id, access_token.to_string()));
        Ok(())
    }
}

fn callback(fail: bool) -> (AuthCallback, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::default());
    let callback = AuthCallback::new(
        Arc::new(FakeExchange { fail }),
        Arc::clone(&store) as Arc<dyn AuthorizationStore>,
    );
    (callback, store)
}

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_code_is_exchanged_and_stored() {
    let (callback, store) = callback(false);

    let response = callback.handle(&query(&[("code", "abc"), ("installation_id", "77")]));

    assert_eq!(response, WebhookResponse::ok());
    assert_eq!(
        *store.stored.lock().unwrap(),
        vec![(Some(InstallationId::new(77)), "token-for-abc".to_string())]
    );
}

#[test]
fn test_installation_id_is_optional() {
    let (callback, store) = callback(false);

    assert!(callback.handle(&query(&[("code", "abc")])).is_success());
    assert_eq!(store.stored.lock().unwrap()[0].0, None);
}

#[test]
fn test_missing_code_is_bad_request() {
    let (callback, store) = callback(false);

    let response = callback.handle(&query(&[("installation_id", "77")]));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(store.stored.lock().unwrap().is_empty());
}

#[test]
fn test_non_numeric_installation_is_bad_request() {
    let (callback, _) = callback(false);

    let response = callback.handle(&query(&[("code", "abc"), ("installation_id", "seven")]));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("seven"));
}

#[test]
fn test_exchange_failure_is_bad_gateway() {
    let (callback, store) = callback(true);

    let response = callback.handle(&query(&[("code", "expired")]));

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(store.stored.lock().unwrap().is_empty());
}
