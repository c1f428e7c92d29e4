//! 어드바이저리 피드 어댑터
//!
//! [`AdvisoryFeed`]는 제품 키워드로 CVE 레코드를 조회하는 추상화이며,
//! [`NvdFeed`]는 NVD REST API 2.0 구현체입니다. 엔진과 테스트는
//! trait 객체를 통해 피드를 교체할 수 있습니다.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use cvewatch_core::pipeline::BoxFuture;
use cvewatch_core::types::Advisory;

use crate::config::WatcherConfig;
use crate::error::WatcherError;

/// 어드바이저리 피드 추상화
///
/// 구현체는 키워드당 최대 `limit`건의 레코드를 반환합니다.
/// 반환 에러는 호출 측에서 해당 제품 범위로 격리됩니다.
pub trait AdvisoryFeed: Send + Sync {
    /// 키워드에 해당하는 최신 어드바이저리를 조회합니다.
    fn fetch<'a>(
        &'a self,
        keyword: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<Advisory>, WatcherError>>;
}

// --- NVD 응답 형식 ---
// 필요한 필드만 디코딩하고 나머지는 무시합니다.

#[derive(Debug, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
struct NvdVulnerability {
    cve: NvdCve,
}

#[derive(Debug, Deserialize)]
struct NvdCve {
    id: Option<String>,
    #[serde(default)]
    published: String,
    #[serde(default)]
    descriptions: Vec<NvdDescription>,
}

#[derive(Debug, Deserialize)]
struct NvdDescription {
    #[serde(default)]
    value: String,
}

impl NvdCve {
    fn into_advisory(self) -> Advisory {
        let summary = self
            .descriptions
            .into_iter()
            .next()
            .map(|d| d.value)
            .unwrap_or_default();
        Advisory {
            id: self.id,
            published: self.published,
            summary,
        }
    }
}

/// NVD REST API 2.0 피드
pub struct NvdFeed {
    client: reqwest::Client,
    base_url: String,
}

impl NvdFeed {
    /// 설정의 피드 접속 정보로 피드를 생성합니다.
    pub fn new(config: &WatcherConfig) -> Result<Self, WatcherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.feed_timeout_secs))
            .build()
            .map_err(|e| WatcherError::Feed {
                keyword: String::new(),
                reason: format!("http client build failed: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.feed_base_url.clone(),
        })
    }
}

impl AdvisoryFeed for NvdFeed {
    fn fetch<'a>(
        &'a self,
        keyword: &'a str,
        limit: u32,
    ) -> BoxFuture<'a, Result<Vec<Advisory>, WatcherError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("keywordSearch", keyword),
                    ("resultsPerPage", &limit.to_string()),
                ])
                .send()
                .await
                .map_err(|e| WatcherError::Feed {
                    keyword: keyword.to_owned(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(WatcherError::FeedStatus {
                    keyword: keyword.to_owned(),
                    status: status.as_u16(),
                });
            }

            let body: NvdResponse =
                response.json().await.map_err(|e| WatcherError::FeedDecode {
                    keyword: keyword.to_owned(),
                    reason: e.to_string(),
                })?;

            let advisories: Vec<Advisory> = body
                .vulnerabilities
                .into_iter()
                .map(|v| v.cve.into_advisory())
                .collect();
            debug!(keyword = %keyword, count = advisories.len(), "feed fetch complete");
            Ok(advisories)
        })
    }
}
