//! 宿主方法通道端到端场景

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use app_limiter::application::{EncodedPolicy, SyncCodec};
use app_limiter::domain::{
    ApplicationToken, AuthorizationMode, AuthorizationStatus, PickerOutcome, Selection,
    SelectionPurpose, ShieldPolicy,
};
use app_limiter::infrastructure::memory::{
    InMemoryEnforcementStore, RequestBehavior, ScriptedAuthorizationCenter, ScriptedPresenter,
    StaticPlatform, StoreSnapshot,
};
use app_limiter::{Collaborators, CommandDispatcher, MethodCall, MethodResponse, ReplySink};
use limiter_config::AppConfig;
use serde_json::{Value, json};

struct Harness {
    dispatcher: Arc<CommandDispatcher>,
    store: Arc<InMemoryEnforcementStore>,
    center: Arc<ScriptedAuthorizationCenter>,
    presenter: Arc<ScriptedPresenter>,
}

struct HarnessBuilder {
    version: String,
    store: InMemoryEnforcementStore,
    center: ScriptedAuthorizationCenter,
    presenter: ScriptedPresenter,
}

impl HarnessBuilder {
    fn new() -> Self {
        Self {
            version: "17.2".to_string(),
            store: InMemoryEnforcementStore::new(),
            center: ScriptedAuthorizationCenter::approved(),
            presenter: ScriptedPresenter::new(),
        }
    }

    fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    fn store(mut self, store: InMemoryEnforcementStore) -> Self {
        self.store = store;
        self
    }

    fn center(mut self, center: ScriptedAuthorizationCenter) -> Self {
        self.center = center;
        self
    }

    fn presenter(mut self, presenter: ScriptedPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    fn build(self) -> Harness {
        let store = Arc::new(self.store);
        let center = Arc::new(self.center);
        let presenter = Arc::new(self.presenter);

        let collaborators = Collaborators {
            authorization: center.clone(),
            store: store.clone(),
            presenter: presenter.clone(),
            platform: Arc::new(StaticPlatform::ios(self.version)),
        };
        let dispatcher = CommandDispatcher::new(&AppConfig::default(), collaborators).unwrap();

        Harness {
            dispatcher: Arc::new(dispatcher),
            store,
            center,
            presenter,
        }
    }
}

impl Harness {
    async fn call(&self, method: &str, arguments: Value) -> MethodResponse {
        self.dispatcher
            .invoke(MethodCall::with_arguments(method, arguments))
            .await
    }

    async fn call_via_sink(&self, method: &str, arguments: Value) -> MethodResponse {
        let (sink, receiver) = ReplySink::channel(method);
        self.dispatcher
            .handle(MethodCall::with_arguments(method, arguments), sink);
        receiver.await.unwrap()
    }
}

fn apps(tokens: &[&str]) -> ShieldPolicy<ApplicationToken> {
    ShieldPolicy::from_set(tokens.iter().map(|t| ApplicationToken::new(*t)).collect())
}

fn encoded(selection: &Selection) -> String {
    SyncCodec::encode(selection).unwrap().into_string()
}

#[tokio::test]
async fn test_unsupported_platform_never_reaches_gateway() {
    let h = HarnessBuilder::new()
        .version("15.7")
        .center(ScriptedAuthorizationCenter::new())
        .build();
    let payload = encoded(&Selection::new().with_applications(["com.x.a"]));

    let calls = [
        ("handleAppSelection", json!({})),
        ("getBlockedAppCount", json!({})),
        ("requestPermission", json!({})),
        ("requestChildDeviceAuthorization", json!({})),
        ("isAutomaticWebFilterEnabled", json!({})),
        ("setAutomaticWebFilter", json!({"enabled": true})),
        ("disableAutomaticWebFilter", json!({})),
        ("applyRemoteSettings", json!({"jsonString": payload})),
        ("setWebDomainRestrictions", json!({"domains": ["youtube.com"]})),
        ("applyRemoteSettings", json!({})),
        ("setWebDomainRestrictions", json!({"domains": 5})),
    ];

    for (method, arguments) in calls {
        let response = h.call(method, arguments).await;
        assert_eq!(response.error_code(), Some("UNSUPPORTED"), "{method}");
    }

    assert_eq!(h.center.request_count(), 0);
    assert_eq!(h.store.push_count(), 0);
    assert!(h.presenter.presentations().is_empty());

    let response = h.call("getPlatformVersion", Value::Null).await;
    assert_eq!(response, MethodResponse::success("iOS 15.7"));
}

#[tokio::test]
async fn test_remote_policy_replaces_selection_and_state() {
    let h = HarnessBuilder::new().build();
    let selection = Selection::new().with_applications(["com.y.b"]);

    let response = h
        .call("applyRemoteSettings", json!({"jsonString": encoded(&selection)}))
        .await;
    assert_eq!(response, MethodResponse::success(true));

    assert_eq!(h.dispatcher.policy_model().get_selection().await, selection);
    let state = h.dispatcher.enforcement_state().await;
    assert_eq!(state.shielded_applications, apps(&["com.y.b"]));
    assert_eq!(state.shielded_categories, ShieldPolicy::None);
    assert_eq!(h.store.snapshot().applications, apps(&["com.y.b"]));

    let response = h.call("getBlockedAppCount", json!({})).await;
    assert_eq!(response, MethodResponse::success(1));
}

#[tokio::test]
async fn test_controller_selection_applies_on_child_device() {
    let controller = HarnessBuilder::new().build();
    let child = HarnessBuilder::new().build();

    let selection = Selection::new()
        .with_applications(["com.x.a", "com.x.b"])
        .with_categories(["games"])
        .with_web_domains(["youtube.com"]);
    controller
        .presenter
        .push_outcome(PickerOutcome::Completed(selection.clone()));

    let response = controller
        .call("handleAppSelection", json!({"applyLocally": false}))
        .await;
    let payload = response.value().and_then(Value::as_str).unwrap().to_string();
    assert_eq!(controller.store.push_count(), 0);
    assert_eq!(
        controller.presenter.presentations()[0].purpose,
        SelectionPurpose::Discourage
    );

    let response = child
        .call("applyRemoteSettings", json!({"jsonString": payload}))
        .await;
    assert!(response.is_success());

    assert_eq!(child.dispatcher.policy_model().get_selection().await, selection);
    let snapshot = child.store.snapshot();
    assert_eq!(
        snapshot.applications,
        apps(&["com.x.a", "com.x.b", "com.apple.mobilesafari"])
    );
    assert_eq!(snapshot.web_domains.len(), 1);
}

#[tokio::test]
async fn test_authorization_is_rechecked_every_time() {
    let h = HarnessBuilder::new().build();
    let payload = encoded(&Selection::new().with_applications(["com.x.a"]));

    let response = h
        .call("applyRemoteSettings", json!({"jsonString": payload.clone()}))
        .await;
    assert!(response.is_success());

    // 用户在系统设置中撤销授权，再次请求被拒绝
    h.center
        .set_status(AuthorizationMode::Individual, AuthorizationStatus::Denied);
    h.center.set_behavior(RequestBehavior::Deny);

    let response = h
        .call("applyRemoteSettings", json!({"jsonString": payload}))
        .await;
    assert_eq!(response.error_code(), Some("PERMISSION_DENIED"));
    assert_eq!(h.center.request_count(), 1);
}

#[tokio::test]
async fn test_authorization_requests() {
    let h = HarnessBuilder::new()
        .center(ScriptedAuthorizationCenter::new())
        .build();

    let response = h.call("requestChildDeviceAuthorization", json!({})).await;
    assert_eq!(response, MethodResponse::success(true));
    let response = h.call("requestChildDeviceAuthorization", json!({})).await;
    assert_eq!(response, MethodResponse::success(true));
    assert_eq!(h.center.request_count(), 1);

    h.center
        .set_behavior(RequestBehavior::Fail("service unavailable".to_string()));
    let response = h.call("requestPermission", json!({})).await;
    assert_eq!(response.error_code(), Some("AUTH_ERROR"));
}

#[tokio::test]
async fn test_cancelled_picker_resolves_once_with_null() {
    let h = HarnessBuilder::new().build();
    h.presenter.push_outcome(PickerOutcome::Cancelled);

    let response = h.call_via_sink("handleAppSelection", json!({})).await;

    assert_eq!(response, MethodResponse::success(Value::Null));
    assert_eq!(h.store.push_count(), 0);
}

#[tokio::test]
async fn test_presentation_failure_is_reported() {
    let h = HarnessBuilder::new().build();
    h.presenter
        .push_error(limiter_errors::AppError::presentation("No root view controller"));

    let response = h.call_via_sink("handleAppSelection", json!({})).await;
    assert_eq!(response.error_code(), Some("PRESENT_ERROR"));
}

#[tokio::test]
async fn test_second_selection_fails_without_affecting_first() {
    let h = HarnessBuilder::new()
        .presenter(ScriptedPresenter::gated())
        .build();

    let (sink, first) = ReplySink::channel("handleAppSelection");
    h.dispatcher
        .handle(MethodCall::new("handleAppSelection"), sink);
    h.presenter.wait_presented().await;

    let second = h.call("handleAppSelection", json!({})).await;
    assert_eq!(second.error_code(), Some("SELECTION_IN_PROGRESS"));

    let selection = Selection::new().with_applications(["com.x.a"]);
    h.presenter
        .push_outcome(PickerOutcome::Completed(selection.clone()));
    h.presenter.release();

    let first = first.await.unwrap();
    let payload = first.value().and_then(Value::as_str).unwrap();
    assert_eq!(
        SyncCodec::decode(&EncodedPolicy::new(payload)).unwrap(),
        selection
    );
    assert_eq!(h.store.snapshot().applications, apps(&["com.x.a"]));
    assert_eq!(h.presenter.presentations().len(), 1);
}

async fn remote_policy_while_picker_open(apply_locally: bool) -> (Harness, Selection, Selection) {
    let h = HarnessBuilder::new()
        .presenter(ScriptedPresenter::gated())
        .build();

    let (sink, picker) = ReplySink::channel("handleAppSelection");
    h.dispatcher.handle(
        MethodCall::with_arguments("handleAppSelection", json!({"applyLocally": apply_locally})),
        sink,
    );
    h.presenter.wait_presented().await;

    let remote = Selection::new()
        .with_applications(["com.remote"])
        .with_web_domains(["YouTube.COM", "not a domain"]);
    let response = h
        .call("applyRemoteSettings", json!({"jsonString": encoded(&remote)}))
        .await;
    assert!(response.is_success());

    let model = h.dispatcher.policy_model().get_selection().await;
    assert_eq!(model.application_tokens, remote.application_tokens);
    assert_eq!(model.web_domains, ["youtube.com".to_string()].into_iter().collect());
    assert_eq!(
        h.store.snapshot().applications,
        apps(&["com.remote", "com.apple.mobilesafari"])
    );

    let picked = Selection::new().with_applications(["com.picked"]);
    h.presenter
        .push_outcome(PickerOutcome::Completed(picked.clone()));
    h.presenter.release();
    assert!(picker.await.unwrap().is_success());

    (h, remote, picked)
}

#[tokio::test]
async fn test_picker_completion_after_remote_policy_applies_in_order() {
    let (h, _remote, picked) = remote_policy_while_picker_open(true).await;

    assert_eq!(h.dispatcher.policy_model().get_selection().await, picked);
    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.applications, apps(&["com.picked"]));
    assert_eq!(snapshot.web_domains, ShieldPolicy::None);
    assert_eq!(
        h.dispatcher.enforcement_state().await.shielded_applications,
        snapshot.applications
    );
}

#[tokio::test]
async fn test_picker_completion_without_local_apply_keeps_remote_enforcement() {
    let (h, _remote, picked) = remote_policy_while_picker_open(false).await;

    assert_eq!(h.dispatcher.policy_model().get_selection().await, picked);
    let snapshot = h.store.snapshot();
    assert_eq!(
        snapshot.applications,
        apps(&["com.remote", "com.apple.mobilesafari"])
    );
    assert_eq!(snapshot.web_domains.len(), 1);
    assert_eq!(
        h.dispatcher.enforcement_state().await.shielded_applications,
        snapshot.applications
    );
}

#[tokio::test]
async fn test_abandoned_selection_frees_the_slot() {
    let h = HarnessBuilder::new()
        .presenter(ScriptedPresenter::gated())
        .build();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        h.dispatcher.invoke(MethodCall::new("handleAppSelection")),
    )
    .await;
    assert!(abandoned.is_err());

    h.presenter.push_outcome(PickerOutcome::Cancelled);
    h.presenter.release();
    let response = h.call("handleAppSelection", json!({})).await;
    assert_eq!(response, MethodResponse::success(Value::Null));
}

#[tokio::test]
async fn test_decoding_and_enforcement_errors_are_distinct() {
    let h = HarnessBuilder::new().build();

    let response = h
        .call("applyRemoteSettings", json!({"jsonString": "{not json"}))
        .await;
    assert_eq!(response.error_code(), Some("DECODING_ERROR"));

    let response = h
        .call(
            "applyRemoteSettings",
            json!({"jsonString": json!({"version": 2, "applicationTokens": []}).to_string()}),
        )
        .await;
    assert_eq!(response.error_code(), Some("DECODING_ERROR"));

    h.store.fail_pushes(true);
    let selection = Selection::new().with_applications(["com.x.a"]);
    let response = h
        .call("applyRemoteSettings", json!({"jsonString": encoded(&selection)}))
        .await;
    assert_eq!(response.error_code(), Some("ENFORCEMENT_ERROR"));
    assert_eq!(h.dispatcher.policy_model().get_selection().await, Selection::new());

    // 推送恢复后重试成功
    h.store.fail_pushes(false);
    let response = h
        .call("applyRemoteSettings", json!({"jsonString": encoded(&selection)}))
        .await;
    assert!(response.is_success());
}

#[tokio::test]
async fn test_bad_arguments_are_invalid_args() {
    let h = HarnessBuilder::new().build();

    let response = h.call("applyRemoteSettings", json!({})).await;
    assert_eq!(response.error_code(), Some("INVALID_ARGS"));

    let response = h.call("applyRemoteSettings", json!({"jsonString": 7})).await;
    assert_eq!(response.error_code(), Some("INVALID_ARGS"));

    let response = h
        .call("setWebDomainRestrictions", json!({"domains": "youtube.com"}))
        .await;
    assert_eq!(response.error_code(), Some("INVALID_ARGS"));
    assert_eq!(h.store.push_count(), 0);
}

#[tokio::test]
async fn test_unknown_method_is_not_implemented() {
    let h = HarnessBuilder::new().build();
    let response = h.call_via_sink("wipeDevice", json!({})).await;
    assert_eq!(response, MethodResponse::NotImplemented);
}

#[tokio::test]
async fn test_content_filter_toggle() {
    let h = HarnessBuilder::new().build();

    let response = h.call("setAutomaticWebFilter", json!({"enabled": true})).await;
    assert_eq!(response, MethodResponse::success(true));
    let response = h.call("isAutomaticWebFilterEnabled", json!({})).await;
    assert_eq!(response, MethodResponse::success(true));

    let response = h.call("setAutomaticWebFilter", json!({"enabled": false})).await;
    assert_eq!(response, MethodResponse::success(true));
    let response = h.call("isAutomaticWebFilterEnabled", json!({})).await;
    assert_eq!(response, MethodResponse::success(false));
}

#[tokio::test]
async fn test_web_domain_restrictions_report_rejected_domains() {
    let h = HarnessBuilder::new().build();

    let response = h
        .call(
            "setWebDomainRestrictions",
            json!({"domains": ["youtube.com", "not a domain"]}),
        )
        .await;
    assert_eq!(
        response,
        MethodResponse::success(json!({"applied": 1, "rejected": ["not a domain"]}))
    );
    assert_eq!(h.store.snapshot().applications, apps(&["com.apple.mobilesafari"]));

    let response = h
        .call("setWebDomainRestrictions", json!({"domains": []}))
        .await;
    assert!(response.is_success());
    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.web_domains, ShieldPolicy::None);
    assert_eq!(snapshot.applications, ShieldPolicy::None);
}

#[tokio::test]
async fn test_blocked_count_prefers_enforced_shield() {
    let leftover: BTreeSet<_> = ["a", "b"].into_iter().map(ApplicationToken::new).collect();
    let store = InMemoryEnforcementStore::with_snapshot(StoreSnapshot {
        applications: ShieldPolicy::from_set(leftover),
        ..StoreSnapshot::default()
    });
    let h = HarnessBuilder::new().store(store).build();

    let response = h.call("getBlockedAppCount", json!({})).await;
    assert_eq!(response, MethodResponse::success(2));
}
