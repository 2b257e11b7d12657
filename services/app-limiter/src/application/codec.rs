//! 策略同步编解码
//!
//! 控制端与被控端之间唯一约定的数据通道。负载为带版本号的 JSON 文本，
//! 字段名稳定，未知字段被忽略以便向前兼容

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use limiter_errors::AppResult;
use serde::{Deserialize, Serialize};

use crate::domain::token::is_representable;
use crate::domain::{ApplicationToken, CategoryToken, Selection};
use crate::error::LimiterError;

/// 当前编码版本
pub const CODEC_VERSION: u32 = 1;

/// 编码后的策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPolicy(String);

impl EncodedPolicy {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for EncodedPolicy {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl std::fmt::Display for EncodedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 只读取版本号，用于在完整解析前拒绝不兼容的负载
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// 传输格式
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyEnvelope {
    version: u32,
    application_tokens: Vec<String>,
    category_tokens: Vec<String>,
    web_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encoded_at: Option<DateTime<Utc>>,
}

fn check_token(kind: &'static str, value: &str) -> Result<(), LimiterError> {
    if !is_representable(value) {
        return Err(LimiterError::UnrepresentableToken {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// 编解码器
pub struct SyncCodec;

impl SyncCodec {
    /// 编码选择，包含无法表示的令牌时返回 EncodingError
    pub fn encode(selection: &Selection) -> AppResult<EncodedPolicy> {
        Self::envelope_from(selection)
            .and_then(|envelope| serde_json::to_string(&envelope).map_err(LimiterError::from))
            .map(EncodedPolicy)
            .map_err(LimiterError::into_encoding)
    }

    /// 解码负载，格式错误或版本不兼容时返回 DecodingError，从不退化为空选择
    pub fn decode(encoded: &EncodedPolicy) -> AppResult<Selection> {
        Self::selection_from(encoded.as_str()).map_err(LimiterError::into_decoding)
    }

    fn envelope_from(selection: &Selection) -> Result<PolicyEnvelope, LimiterError> {
        for token in &selection.application_tokens {
            check_token("application", token.as_str())?;
        }
        for token in &selection.category_tokens {
            check_token("category", token.as_str())?;
        }
        for domain in &selection.web_domains {
            check_token("web domain", domain)?;
        }

        Ok(PolicyEnvelope {
            version: CODEC_VERSION,
            application_tokens: selection
                .application_tokens
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            category_tokens: selection
                .category_tokens
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            web_domains: selection.web_domains.iter().cloned().collect(),
            encoded_at: Some(Utc::now()),
        })
    }

    fn selection_from(payload: &str) -> Result<Selection, LimiterError> {
        let probe: VersionProbe = serde_json::from_str(payload)?;
        if probe.version != CODEC_VERSION {
            return Err(LimiterError::UnsupportedVersion {
                found: probe.version,
                expected: CODEC_VERSION,
            });
        }

        let envelope: PolicyEnvelope = serde_json::from_str(payload)?;

        let mut application_tokens = BTreeSet::new();
        for token in envelope.application_tokens {
            check_token("application", &token)?;
            application_tokens.insert(ApplicationToken::new(token));
        }
        let mut category_tokens = BTreeSet::new();
        for token in envelope.category_tokens {
            check_token("category", &token)?;
            category_tokens.insert(CategoryToken::new(token));
        }
        let mut web_domains = BTreeSet::new();
        for domain in envelope.web_domains {
            check_token("web domain", &domain)?;
            web_domains.insert(domain);
        }

        Ok(Selection {
            application_tokens,
            category_tokens,
            web_domains,
        })
    }
}
