//! 命令调度器
//!
//! 先做平台能力检查，再把宿主的方法调用解析为命令或查询，经过日志中间件交给处理器，
//! 最终转换为唯一的 [`MethodResponse`]

use std::sync::Arc;
use std::time::Instant;

use limiter_config::AppConfig;
use limiter_cqrs_core::{
    Command, CommandHandler, CommandMiddleware, LoggingMiddleware, Query, QueryHandler,
    QueryMiddleware,
};
use limiter_errors::{AppError, AppResult};
use limiter_telemetry::{METRIC_INVOCATIONS_TOTAL, METRIC_INVOCATION_DURATION_MS};
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use super::method::{Method, MethodCall, MethodResponse};
use super::reply::ReplySink;
use crate::application::{
    ApplyRemotePolicyCommand, AuthorizationGateway, BeginSelectionCommand, BlockedAppCountQuery,
    CapabilityGate, ContentFilterStatusQuery, EncodedPolicy, EnforcementAdapter,
    PlatformVersionQuery, RequestAuthorizationCommand, RestrictionHandler, SetContentFilterCommand,
    SetWebDomainRestrictionsCommand,
};
use crate::domain::{
    ApplicationToken, AuthorizationCenter, AuthorizationMode, EnforcementState, EnforcementStore,
    PlatformInfo, PlatformVersion, PolicyModel, SelectionPresenter, SelectionPurpose,
};

/// 宿主提供的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub authorization: Arc<dyn AuthorizationCenter>,
    pub store: Arc<dyn EnforcementStore>,
    pub presenter: Arc<dyn SelectionPresenter>,
    pub platform: Arc<dyn PlatformInfo>,
}

/// 命令调度器
pub struct CommandDispatcher {
    handler: RestrictionHandler,
    capability: CapabilityGate,
    logging: LoggingMiddleware,
    model: Arc<PolicyModel>,
    enforcement: Arc<EnforcementAdapter>,
}

impl CommandDispatcher {
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> AppResult<Self> {
        let minimum: PlatformVersion = config.platform.minimum_version.parse().map_err(|e| {
            AppError::internal(format!("Invalid platform.minimum_version: {}", e))
        })?;

        let browser = config.enforcement.browser_bundle_id.trim();
        if browser.is_empty() {
            return Err(AppError::internal("enforcement.browser_bundle_id must not be empty"));
        }

        let model = Arc::new(PolicyModel::new());
        let enforcement = Arc::new(EnforcementAdapter::new(collaborators.store, model.clone()));
        let gateway = Arc::new(AuthorizationGateway::new(collaborators.authorization));

        let handler = RestrictionHandler::new(
            gateway,
            enforcement.clone(),
            collaborators.presenter,
            model.clone(),
            collaborators.platform.clone(),
            ApplicationToken::from_bundle_identifier(browser),
        );

        info!(
            minimum_version = %minimum,
            browser_bundle_id = browser,
            platform = %collaborators.platform.description(),
            "Command dispatcher ready"
        );

        Ok(Self {
            handler,
            capability: CapabilityGate::new(collaborators.platform, minimum),
            logging: LoggingMiddleware,
            model,
            enforcement,
        })
    }

    /// 进程内的策略模型
    pub fn policy_model(&self) -> Arc<PolicyModel> {
        self.model.clone()
    }

    /// 当前执行状态镜像
    pub async fn enforcement_state(&self) -> EnforcementState {
        self.enforcement.current_state().await
    }

    /// 在独立任务中执行调用，结果通过 sink 回传
    ///
    /// 调用方不再等待时任务仍会完成，已开始的推送不会被中断
    pub fn handle(self: &Arc<Self>, call: MethodCall, reply: ReplySink) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let response = dispatcher.invoke(call).await;
            reply.send(response);
        });
    }

    /// 执行一次调用并返回结果
    pub async fn invoke(&self, call: MethodCall) -> MethodResponse {
        let Some(method) = Method::parse(&call.method) else {
            info!(method = %call.method, "Method not implemented");
            counter!(METRIC_INVOCATIONS_TOTAL, "method" => "unknown", "outcome" => "not_implemented")
                .increment(1);
            return MethodResponse::NotImplemented;
        };

        let invocation_id = Uuid::now_v7();
        let span = info_span!("invocation", %invocation_id, method = method.as_str());
        let started = Instant::now();

        let response = match self.route(method, &call).instrument(span.clone()).await {
            Ok(value) => MethodResponse::Success { value },
            Err(e) => {
                span.in_scope(|| warn!(code = e.code(), retryable = e.is_retryable(), "{}", e));
                MethodResponse::from(e)
            }
        };

        histogram!(METRIC_INVOCATION_DURATION_MS, "method" => method.as_str())
            .record(started.elapsed().as_secs_f64() * 1000.0);
        counter!(METRIC_INVOCATIONS_TOTAL, "method" => method.as_str(), "outcome" => response.outcome())
            .increment(1);

        response
    }

    async fn route(&self, method: Method, call: &MethodCall) -> AppResult<Value> {
        // 先于参数解析
        if method.requires_capability() {
            self.capability.check()?;
        }

        match method {
            Method::GetPlatformVersion => self.query(PlatformVersionQuery).await.map(Value::from),
            Method::HandleAppSelection => {
                let command = BeginSelectionCommand {
                    purpose: SelectionPurpose::Discourage,
                    apply_locally: call.bool_or("applyLocally", true),
                };
                let encoded = self.command(command).await?;
                Ok(encoded.map_or(Value::Null, |e| Value::String(e.into_string())))
            }
            Method::GetBlockedAppCount => self.query(BlockedAppCountQuery).await.map(Value::from),
            Method::RequestPermission => self
                .command(RequestAuthorizationCommand {
                    mode: AuthorizationMode::Individual,
                })
                .await
                .map(Value::Bool),
            Method::RequestChildDeviceAuthorization => self
                .command(RequestAuthorizationCommand {
                    mode: AuthorizationMode::ChildSupervised,
                })
                .await
                .map(Value::Bool),
            Method::IsAutomaticWebFilterEnabled => {
                self.query(ContentFilterStatusQuery).await.map(Value::Bool)
            }
            Method::SetAutomaticWebFilter => self
                .command(SetContentFilterCommand {
                    enabled: call.bool_or("enabled", true),
                })
                .await
                .map(Value::Bool),
            Method::DisableAutomaticWebFilter => self
                .command(SetContentFilterCommand { enabled: false })
                .await
                .map(Value::Bool),
            Method::ApplyRemoteSettings => {
                let encoded = EncodedPolicy::new(call.required_string("jsonString")?);
                self.command(ApplyRemotePolicyCommand { encoded }).await?;
                Ok(Value::Bool(true))
            }
            Method::SetWebDomainRestrictions => {
                let command = SetWebDomainRestrictionsCommand {
                    domains: call.string_list("domains")?,
                    browser_bundle_id: call.optional_string("browserBundleId")?,
                };
                let outcome = self.command(command).await?;
                Ok(serde_json::to_value(outcome)?)
            }
        }
    }

    async fn command<C>(&self, command: C) -> AppResult<C::Result>
    where
        C: Command + Clone,
        C::Result: Sync,
        RestrictionHandler: CommandHandler<C>,
    {
        CommandMiddleware::before(&self.logging, &command).await?;

        let result = CommandHandler::handle(&self.handler, command.clone()).await;

        CommandMiddleware::after(&self.logging, &command, &result).await;
        result
    }

    async fn query<Q>(&self, query: Q) -> AppResult<Q::Result>
    where
        Q: Query + Clone,
        Q::Result: Sync,
        RestrictionHandler: QueryHandler<Q>,
    {
        QueryMiddleware::before(&self.logging, &query).await?;

        let result = QueryHandler::handle(&self.handler, query.clone()).await;

        QueryMiddleware::after(&self.logging, &query, &result).await;
        result
    }
}
