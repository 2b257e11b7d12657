//! 命令与查询处理器

use std::sync::Arc;

use async_trait::async_trait;
use limiter_cqrs_core::{CommandHandler, QueryHandler};
use limiter_errors::{AppError, AppResult};
use tracing::{debug, info};

use super::authorization::AuthorizationGateway;
use super::codec::{EncodedPolicy, SyncCodec};
use super::commands::{
    ApplyRemotePolicyCommand, BeginSelectionCommand, BlockedAppCountQuery, ContentFilterStatusQuery,
    PlatformVersionQuery, RequestAuthorizationCommand, SetContentFilterCommand,
    SetWebDomainRestrictionsCommand,
};
use super::enforcement::{ApplyOutcome, DomainShieldOutcome, EnforcementAdapter};
use super::selection_slot::SelectionSlot;
use crate::domain::{
    ApplicationToken, AuthorizationMode, PickerOutcome, PlatformInfo, PolicyModel,
    PresentationRequest, SelectionPresenter,
};

/// 限制策略处理器
///
/// 所有特权操作在执行前都重新确认授权
pub struct RestrictionHandler {
    gateway: Arc<AuthorizationGateway>,
    enforcement: Arc<EnforcementAdapter>,
    presenter: Arc<dyn SelectionPresenter>,
    model: Arc<PolicyModel>,
    platform: Arc<dyn PlatformInfo>,
    slot: SelectionSlot,
    /// 域名屏蔽挂载的默认浏览器
    default_browser: ApplicationToken,
}

impl RestrictionHandler {
    pub fn new(
        gateway: Arc<AuthorizationGateway>,
        enforcement: Arc<EnforcementAdapter>,
        presenter: Arc<dyn SelectionPresenter>,
        model: Arc<PolicyModel>,
        platform: Arc<dyn PlatformInfo>,
        default_browser: ApplicationToken,
    ) -> Self {
        Self {
            gateway,
            enforcement,
            presenter,
            model,
            platform,
            slot: SelectionSlot::new(),
            default_browser,
        }
    }

    /// 是否有选择流程正在进行
    pub fn selection_pending(&self) -> bool {
        self.slot.is_busy()
    }
}

#[async_trait]
impl CommandHandler<BeginSelectionCommand> for RestrictionHandler {
    async fn handle(&self, command: BeginSelectionCommand) -> AppResult<Option<EncodedPolicy>> {
        let _guard = self.slot.try_acquire()?;

        self.gateway.ensure_approved(AuthorizationMode::Individual).await?;

        let request = PresentationRequest {
            purpose: command.purpose,
            initial_selection: self.model.get_selection().await,
            apply_locally: command.apply_locally,
        };
        debug!(purpose = ?request.purpose, apply_locally = request.apply_locally, "Presenting picker");

        let selection = match self.presenter.present(request).await? {
            PickerOutcome::Completed(selection) => selection,
            PickerOutcome::Cancelled => {
                info!("Picker cancelled");
                return Ok(None);
            }
        };

        // 先编码，失败时不改变任何状态
        let encoded = SyncCodec::encode(&selection)?;

        if command.apply_locally {
            self.enforcement
                .apply_selection(&selection, &self.default_browser)
                .await?;
        } else {
            self.enforcement.record_selection(selection.clone()).await;
        }

        info!(
            applications = selection.application_tokens.len(),
            categories = selection.category_tokens.len(),
            domains = selection.web_domains.len(),
            apply_locally = command.apply_locally,
            "Selection completed"
        );
        Ok(Some(encoded))
    }
}

#[async_trait]
impl CommandHandler<RequestAuthorizationCommand> for RestrictionHandler {
    async fn handle(&self, command: RequestAuthorizationCommand) -> AppResult<bool> {
        self.gateway.ensure_approved(command.mode).await?;
        Ok(true)
    }
}

#[async_trait]
impl CommandHandler<ApplyRemotePolicyCommand> for RestrictionHandler {
    async fn handle(&self, command: ApplyRemotePolicyCommand) -> AppResult<ApplyOutcome> {
        self.gateway.ensure_approved(AuthorizationMode::Individual).await?;

        let selection = SyncCodec::decode(&command.encoded)?;
        let outcome = self
            .enforcement
            .apply_selection(&selection, &self.default_browser)
            .await?;

        info!(
            applications = outcome.state.shielded_applications.len(),
            domains = outcome.domains.applied,
            "Remote policy applied"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl CommandHandler<SetContentFilterCommand> for RestrictionHandler {
    async fn handle(&self, command: SetContentFilterCommand) -> AppResult<bool> {
        self.enforcement.set_content_filter(command.enabled).await?;
        Ok(true)
    }
}

#[async_trait]
impl CommandHandler<SetWebDomainRestrictionsCommand> for RestrictionHandler {
    async fn handle(&self, command: SetWebDomainRestrictionsCommand) -> AppResult<DomainShieldOutcome> {
        let parent = match command.browser_bundle_id.as_deref() {
            Some(bundle_id) if bundle_id.trim().is_empty() => {
                return Err(AppError::invalid_args("browserBundleId must not be empty"));
            }
            Some(bundle_id) => ApplicationToken::from_bundle_identifier(bundle_id),
            None => self.default_browser.clone(),
        };

        self.gateway.ensure_approved(AuthorizationMode::Individual).await?;

        self.enforcement.apply_domain_shield(&command.domains, &parent).await
    }
}

#[async_trait]
impl QueryHandler<BlockedAppCountQuery> for RestrictionHandler {
    async fn handle(&self, _query: BlockedAppCountQuery) -> AppResult<usize> {
        self.enforcement.current_shielded_app_count().await
    }
}

#[async_trait]
impl QueryHandler<ContentFilterStatusQuery> for RestrictionHandler {
    async fn handle(&self, _query: ContentFilterStatusQuery) -> AppResult<bool> {
        self.enforcement.is_content_filter_enabled()
    }
}

#[async_trait]
impl QueryHandler<PlatformVersionQuery> for RestrictionHandler {
    async fn handle(&self, _query: PlatformVersionQuery) -> AppResult<String> {
        Ok(self.platform.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorizationStatus, Selection, SelectionPurpose, ShieldPolicy};
    use crate::infrastructure::memory::{
        InMemoryEnforcementStore, RequestBehavior, ScriptedAuthorizationCenter, ScriptedPresenter,
        StaticPlatform,
    };

    struct Fixture {
        handler: RestrictionHandler,
        store: Arc<InMemoryEnforcementStore>,
        center: Arc<ScriptedAuthorizationCenter>,
        presenter: Arc<ScriptedPresenter>,
        model: Arc<PolicyModel>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEnforcementStore::new());
        let center = Arc::new(ScriptedAuthorizationCenter::approved());
        let presenter = Arc::new(ScriptedPresenter::new());
        let model = Arc::new(PolicyModel::new());
        let enforcement = Arc::new(EnforcementAdapter::new(store.clone(), model.clone()));

        let handler = RestrictionHandler::new(
            Arc::new(AuthorizationGateway::new(center.clone())),
            enforcement,
            presenter.clone(),
            model.clone(),
            Arc::new(StaticPlatform::ios("17.2")),
            ApplicationToken::from_bundle_identifier("com.apple.mobilesafari"),
        );

        Fixture {
            handler,
            store,
            center,
            presenter,
            model,
        }
    }

    fn begin(apply_locally: bool) -> BeginSelectionCommand {
        BeginSelectionCommand {
            purpose: SelectionPurpose::Discourage,
            apply_locally,
        }
    }

    #[tokio::test]
    async fn test_completed_selection_is_applied_and_encoded() {
        let f = fixture();
        let selection = Selection::new()
            .with_applications(["com.x.a"])
            .with_web_domains(["youtube.com"]);
        f.presenter.push_outcome(PickerOutcome::Completed(selection.clone()));

        let encoded = CommandHandler::handle(&f.handler, begin(true)).await.unwrap().unwrap();

        assert_eq!(SyncCodec::decode(&encoded).unwrap(), selection);
        assert_eq!(f.model.get_selection().await, selection);
        let snapshot = f.store.snapshot();
        assert_eq!(snapshot.applications.len(), 2);
        assert_eq!(snapshot.web_domains.len(), 1);
        assert!(!f.handler.selection_pending());
    }

    #[tokio::test]
    async fn test_selection_without_local_apply_only_updates_model() {
        let f = fixture();
        let selection = Selection::new().with_applications(["com.x.a"]);
        f.presenter.push_outcome(PickerOutcome::Completed(selection.clone()));

        let encoded = CommandHandler::handle(&f.handler, begin(false)).await.unwrap();

        assert!(encoded.is_some());
        assert_eq!(f.model.get_selection().await, selection);
        assert_eq!(f.store.push_count(), 0);
    }

    #[tokio::test]
    async fn test_picker_sees_current_selection_and_cancel_changes_nothing() {
        let f = fixture();
        let current = Selection::new().with_categories(["games"]);
        f.model.set_selection(current.clone()).await;
        f.presenter.push_outcome(PickerOutcome::Cancelled);

        assert_eq!(CommandHandler::handle(&f.handler, begin(true)).await.unwrap(), None);

        let presented = f.presenter.presentations();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].initial_selection, current);
        assert_eq!(f.model.get_selection().await, current);
        assert_eq!(f.store.push_count(), 0);
    }

    #[tokio::test]
    async fn test_denied_selection_never_presents() {
        let f = fixture();
        f.center.set_status(AuthorizationMode::Individual, AuthorizationStatus::Denied);
        f.center.set_behavior(RequestBehavior::Deny);

        let err = CommandHandler::handle(&f.handler, begin(true)).await.unwrap_err();

        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert!(f.presenter.presentations().is_empty());
        assert!(!f.handler.selection_pending());
    }

    #[tokio::test]
    async fn test_remote_policy_decode_failure_keeps_state() {
        let f = fixture();
        let err = CommandHandler::handle(
            &f.handler,
            ApplyRemotePolicyCommand {
                encoded: EncodedPolicy::new("{\"version\": 9}"),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "DECODING_ERROR");
        assert_eq!(f.store.push_count(), 0);
        assert_eq!(f.model.get_selection().await, Selection::new());
    }

    #[tokio::test]
    async fn test_domain_restrictions_use_requested_browser() {
        let f = fixture();
        let outcome = CommandHandler::handle(
            &f.handler,
            SetWebDomainRestrictionsCommand {
                domains: vec!["Example.COM.".to_string(), "bad domain".to_string()],
                browser_bundle_id: Some("org.mozilla.ios.Firefox".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.rejected, vec!["bad domain".to_string()]);

        let snapshot = f.store.snapshot();
        assert!(snapshot
            .applications
            .contains(&ApplicationToken::new("org.mozilla.ios.Firefox")));
        assert_eq!(snapshot.categories, ShieldPolicy::None);
        assert!(f.model.get_selection().await.web_domains.contains("example.com"));
    }

    #[tokio::test]
    async fn test_blank_browser_override_is_rejected() {
        let f = fixture();
        for blank in ["", "  "] {
            let err = CommandHandler::handle(
                &f.handler,
                SetWebDomainRestrictionsCommand {
                    domains: vec!["youtube.com".to_string()],
                    browser_bundle_id: Some(blank.to_string()),
                },
            )
            .await
            .unwrap_err();
            assert_eq!(err.code(), "INVALID_ARGS");
        }

        assert_eq!(f.store.push_count(), 0);
        assert_eq!(f.center.request_count(), 0);
        assert!(f.model.get_selection().await.web_domains.is_empty());
    }
}
