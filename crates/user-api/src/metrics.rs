//! Prometheus 메트릭.
//!
//! | 이름 | 종류 | 라벨 |
//! |---|---|---|
//! | `http_requests_total` | counter | method, path |
//! | `http_responses_total` | counter | method, path, status |
//! | `http_request_duration_seconds` | histogram | method, path |
//! | `auth_attempts_total` | counter | operation, outcome |
//! | `rate_limit_requests_total` | counter | status |
//!
//! `path` 라벨은 라우트 템플릿이거나 [`UNMATCHED_PATH`]입니다. 요청 경로 원문(이메일 포함)은
//! 라벨에 들어가지 않습니다.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const HTTP_REQUESTS: &str = "http_requests_total";
const HTTP_RESPONSES: &str = "http_responses_total";
const HTTP_DURATION: &str = "http_request_duration_seconds";
const AUTH_ATTEMPTS: &str = "auth_attempts_total";

/// 어떤 라우트에도 매칭되지 않은 요청의 `path` 라벨.
pub const UNMATCHED_PATH: &str = "unmatched";

/// 해시 검증이 포함된 요청(수십~수백 ms)을 구분할 수 있는 버킷.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// 전역 레코더를 설치하고 `/metrics` 렌더링용 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(HTTP_DURATION.to_string()), DURATION_BUCKETS)?
        .install_recorder()?;

    describe_counter!(HTTP_REQUESTS, "HTTP requests received");
    describe_counter!(HTTP_RESPONSES, "HTTP responses sent");
    describe_histogram!(HTTP_DURATION, Unit::Seconds, "HTTP request latency");
    describe_counter!(AUTH_ATTEMPTS, "Registration and authentication outcomes");

    Ok(handle)
}

pub fn record_http_request(method: &str, path: &str) {
    counter!(HTTP_REQUESTS, "method" => method.to_owned(), "path" => path.to_owned()).increment(1);
}

pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        HTTP_RESPONSES,
        "method" => method.to_owned(),
        "path" => path.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_http_duration(method: &str, path: &str, seconds: f64) {
    histogram!(HTTP_DURATION, "method" => method.to_owned(), "path" => path.to_owned())
        .record(seconds);
}

/// 가입/인증 결과 카운터.
///
/// * `operation` - `register` | `authenticate`
/// * `outcome` - `success` | `conflict` | `invalid_credentials` | `validation_error` | `error`
pub fn record_auth_attempt(operation: &'static str, outcome: &'static str) {
    counter!(AUTH_ATTEMPTS, "operation" => operation, "outcome" => outcome).increment(1);
}
