//! 가입/인증 엔드포인트용 IP별 요청 제한.
//!
//! 클라이언트 IP마다 token bucket 하나를 둡니다. 버킷 용량은 초당 보충량(최소 1)에
//! 버스트 허용량을 더한 값이며, 토큰이 없으면 429와 `Retry-After`를 반환합니다.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use tokio::sync::Mutex;
use user_core::RateLimitSettings;

use crate::error::ApiErrorResponse;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 보충되는 요청 수
    pub requests_per_minute: u32,
    /// 순간적으로 추가 허용되는 요청 수
    pub burst_size: u32,
    /// 이 시간 동안 사용되지 않은 버킷은 정리 대상
    pub cleanup_interval: Duration,
    /// `X-Forwarded-For` / `X-Real-IP`를 신뢰할지 여부
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_size: 10,
            cleanup_interval: Duration::from_secs(300),
            trust_proxy_headers: false,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            requests_per_minute: settings.requests_per_minute,
            burst_size: settings.burst_size,
            trust_proxy_headers: settings.trust_proxy_headers,
            ..Default::default()
        }
    }
}

impl RateLimitConfig {
    /// 버스트 없는 설정.
    pub fn strict(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: 0,
            ..Default::default()
        }
    }

    fn refill_per_sec(&self) -> f64 {
        f64::from(self.requests_per_minute) / 60.0
    }

    fn capacity(&self) -> f64 {
        self.refill_per_sec().max(1.0) + f64::from(self.burst_size)
    }
}

#[derive(Debug)]
struct Bucket {
    available: f64,
    updated_at: Instant,
}

impl Bucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            available: config.capacity(),
            updated_at: now,
        }
    }

    /// 토큰 하나를 꺼냅니다. 부족하면 다음 토큰까지 기다릴 시간을 돌려줍니다.
    fn take(&mut self, config: &RateLimitConfig, now: Instant) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.updated_at).as_secs_f64();
        let rate = config.refill_per_sec();
        self.available = (self.available + elapsed * rate).min(config.capacity());
        self.updated_at = now;

        if self.available >= 1.0 {
            self.available -= 1.0;
            return Ok(());
        }
        if rate <= 0.0 {
            return Err(Duration::from_secs(60));
        }
        Err(Duration::from_secs_f64((1.0 - self.available) / rate))
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// 재시도까지 대기 시간 (초, 최소 1)
        retry_after: u64,
    },
}

/// IP별 token bucket 집합.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| Bucket::full(&self.config, now));

        match bucket.take(&self.config, now) {
            Ok(()) => RateLimitResult::Allowed,
            Err(wait) => RateLimitResult::Limited {
                retry_after: wait.as_secs_f64().ceil().max(1.0) as u64,
            },
        }
    }

    /// `cleanup_interval` 이상 사용되지 않은 버킷을 제거합니다.
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let interval = self.config.cleanup_interval;
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.updated_at) < interval);

        let removed = before - buckets.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = buckets.len(), "Rate limit buckets cleaned up");
        }
    }

    /// 현재 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.lock().await.len()
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.config.cleanup_interval
    }
}

/// 미들웨어 상태. 복제해도 같은 버킷 집합을 공유합니다.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limiter: Arc<RateLimiter>,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(config)),
        }
    }

    /// 주기적 정리 태스크용.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// 요청 제한 미들웨어.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, state.limiter.config.trust_proxy_headers);

    let retry_after = match state.limiter.check(ip).await {
        RateLimitResult::Allowed => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            return next.run(request).await;
        }
        RateLimitResult::Limited { retry_after } => retry_after,
    };

    counter!("rate_limit_requests_total", "status" => "limited").increment(1);
    tracing::warn!(
        client_ip = %ip,
        path = %request.uri().path(),
        retry_after,
        "Rate limit exceeded"
    );

    let body = ApiErrorResponse::with_details(
        "RATE_LIMITED",
        "요청이 너무 많습니다. 잠시 후 다시 시도하세요.",
        serde_json::json!({ "retry_after": retry_after }),
    );
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

/// 요청의 클라이언트 IP.
///
/// 프록시 헤더는 `trust_proxy_headers`가 켜진 경우에만 읽습니다. 그 외에는 소켓 주소,
/// 소켓 주소도 없으면(테스트 등) loopback을 사용합니다.
fn client_ip(request: &Request, trust_proxy_headers: bool) -> IpAddr {
    let from_proxy = trust_proxy_headers
        .then(|| {
            header_ip(request.headers(), "x-forwarded-for")
                .or_else(|| header_ip(request.headers(), "x-real-ip"))
        })
        .flatten();

    from_proxy
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// 헤더 값의 첫 번째 항목(쉼표 구분)을 IP로 파싱.
fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}
