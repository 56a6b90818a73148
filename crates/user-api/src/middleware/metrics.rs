//! HTTP 요청 metrics middleware.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{
    record_http_duration, record_http_request, record_http_response, UNMATCHED_PATH,
};

/// 요청 수, 응답 상태, 처리 시간을 기록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = route_label(&request);

    record_http_request(method.as_str(), &path);
    let response = next.run(request).await;

    record_http_response(method.as_str(), &path, response.status().as_u16());
    record_http_duration(method.as_str(), &path, started.elapsed().as_secs_f64());
    response
}

/// `path` 라벨 값.
///
/// 매칭된 라우트 템플릿(`/api/v1/users/lookup/{email}`)을 사용합니다. 매칭되지 않은
/// 요청은 경로와 무관하게 [`UNMATCHED_PATH`] 하나로 묶여 시계열 수가 늘어나지 않습니다.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_PATH, |matched| matched.as_str())
        .to_owned()
}
