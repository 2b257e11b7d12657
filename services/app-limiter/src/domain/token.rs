//! 平台令牌值对象
//!
//! 应用与分类令牌由平台签发，内容不透明，核心层只做相等比较，不解析其含义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 令牌能否被编码：非空且不含控制字符
pub fn is_representable(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_control)
}

/// 应用令牌
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
#[serde(transparent)]
pub struct ApplicationToken(String);

impl ApplicationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 由 bundle id 构造（用于域名屏蔽所依附的浏览器）
    pub fn from_bundle_identifier(bundle_id: &str) -> Self {
        Self(bundle_id.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 应用分类令牌
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
#[serde(transparent)]
pub struct CategoryToken(String);

impl CategoryToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 域名屏蔽令牌
///
/// 只能通过 [`WebDomainToken::parse`] 构造，内部保存规范化后的主机名
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct WebDomainToken(String);

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

impl WebDomainToken {
    /// 将域名字符串转换为令牌，无法转换时返回 `None`
    ///
    /// 规范化：去除首尾空白、转小写、去掉一个结尾的点
    pub fn parse(domain: &str) -> Option<Self> {
        let trimmed = domain.trim();
        let normalized = trimmed
            .strip_suffix('.')
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        if normalized.is_empty() || normalized.len() > MAX_DOMAIN_LEN {
            return None;
        }

        let labels_ok = normalized.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= MAX_LABEL_LEN
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        });

        labels_ok.then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
