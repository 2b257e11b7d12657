//! 边界方法调用与响应

use limiter_errors::{AppError, ErrorPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LimiterError;

/// 宿主发来的一次方法调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    pub fn with_arguments(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name).filter(|v| !v.is_null())
    }

    /// 布尔参数，缺失或类型不符时使用默认值
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.argument(name).and_then(Value::as_bool).unwrap_or(default)
    }

    /// 必填字符串参数
    pub fn required_string(&self, name: &'static str) -> Result<String, LimiterError> {
        match self.argument(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(LimiterError::InvalidArgument {
                name,
                reason: format!("expected a string, got {}", kind_of(other)),
            }),
            None => Err(LimiterError::MissingArgument(name)),
        }
    }

    /// 可选字符串参数
    pub fn optional_string(&self, name: &'static str) -> Result<Option<String>, LimiterError> {
        match self.argument(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(LimiterError::InvalidArgument {
                name,
                reason: format!("expected a string, got {}", kind_of(other)),
            }),
        }
    }

    /// 必填字符串列表参数
    pub fn string_list(&self, name: &'static str) -> Result<Vec<String>, LimiterError> {
        let items = match self.argument(name) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(LimiterError::InvalidArgument {
                    name,
                    reason: format!("expected a list of strings, got {}", kind_of(other)),
                });
            }
            None => return Err(LimiterError::MissingArgument(name)),
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(LimiterError::InvalidArgument {
                    name,
                    reason: format!("expected a list of strings, found {}", kind_of(other)),
                }),
            })
            .collect()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// 支持的边界方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetPlatformVersion,
    HandleAppSelection,
    GetBlockedAppCount,
    RequestPermission,
    RequestChildDeviceAuthorization,
    IsAutomaticWebFilterEnabled,
    SetAutomaticWebFilter,
    DisableAutomaticWebFilter,
    ApplyRemoteSettings,
    SetWebDomainRestrictions,
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::GetPlatformVersion,
        Method::HandleAppSelection,
        Method::GetBlockedAppCount,
        Method::RequestPermission,
        Method::RequestChildDeviceAuthorization,
        Method::IsAutomaticWebFilterEnabled,
        Method::SetAutomaticWebFilter,
        Method::DisableAutomaticWebFilter,
        Method::ApplyRemoteSettings,
        Method::SetWebDomainRestrictions,
    ];

    /// 按方法名解析，未知方法返回 None
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// 是否需要平台能力检查，只有版本查询例外
    pub fn requires_capability(&self) -> bool {
        !matches!(self, Method::GetPlatformVersion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetPlatformVersion => "getPlatformVersion",
            Method::HandleAppSelection => "handleAppSelection",
            Method::GetBlockedAppCount => "getBlockedAppCount",
            Method::RequestPermission => "requestPermission",
            Method::RequestChildDeviceAuthorization => "requestChildDeviceAuthorization",
            Method::IsAutomaticWebFilterEnabled => "isAutomaticWebFilterEnabled",
            Method::SetAutomaticWebFilter => "setAutomaticWebFilter",
            Method::DisableAutomaticWebFilter => "disableAutomaticWebFilter",
            Method::ApplyRemoteSettings => "applyRemoteSettings",
            Method::SetWebDomainRestrictions => "setWebDomainRestrictions",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次调用的唯一结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { value: Value },
    Error(ErrorPayload),
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResponse::Success { value: value.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// 成功时的返回值
    pub fn value(&self) -> Option<&Value> {
        match self {
            MethodResponse::Success { value } => Some(value),
            _ => None,
        }
    }

    /// 失败时的错误码
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error(payload) => Some(payload.code.as_str()),
            _ => None,
        }
    }

    /// 指标标签
    pub fn outcome(&self) -> &'static str {
        match self {
            MethodResponse::Success { .. } => "success",
            MethodResponse::Error(_) => "error",
            MethodResponse::NotImplemented => "not_implemented",
        }
    }
}

impl From<AppError> for MethodResponse {
    fn from(error: AppError) -> Self {
        MethodResponse::Error(error.to_error_payload())
    }
}
