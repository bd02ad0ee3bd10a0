use apikit::api::problem::{Problem, APPLICATION_PROBLEM_JSON};
use apikit::api::ProblemResponse;
use axum::http::{header, HeaderMap, HeaderName, Request};
use axum::response::IntoResponse;
use axum::{body::Body, middleware::Next, response::Response};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::field::Empty;

const UNKNOWN: &str = "n/a";
/// Problem bodies larger than this are passed through untouched.
const MAX_PROBLEM_BYTES: usize = 64 * 1024;

/// Request id as seen by handlers (`Extension<XRequestId>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

fn request_id_of(headers: &HeaderMap) -> &str {
    headers
        .get(header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or(UNKNOWN)
}

/// `x-request-id` generator: 21-char nanoid.
#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Copy the request id into extensions and the current span.
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = request_id_of(req.headers()).to_owned();
    tracing::Span::current().record("request_id", tracing::field::display(&rid));
    req.extensions_mut().insert(XRequestId(rid));
    next.run(req).await
}

/// Fill `request_id` on `application/problem+json` responses that lack one.
pub async fn stamp_problem_request_id(req: Request<Body>, next: Next) -> Response {
    let rid = request_id_of(req.headers()).to_owned();
    let response = next.run(req).await;

    let is_problem = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(APPLICATION_PROBLEM_JSON));
    if !is_problem || rid == UNKNOWN {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_PROBLEM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "problem body not readable, dropping it");
            return Response::from_parts(parts, Body::empty());
        }
    };
    match serde_json::from_slice::<Problem>(&bytes) {
        Ok(problem) if problem.request_id.is_none() => {
            let mut stamped = ProblemResponse(problem.with_request_id(rid)).into_response();
            for (name, value) in parts.headers.iter() {
                if name != header::CONTENT_LENGTH && !stamped.headers().contains_key(name) {
                    stamped.headers_mut().insert(name.clone(), value.clone());
                }
            }
            stamped
        }
        _ => Response::from_parts(parts, Body::from(bytes)),
    }
}

#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    use tower_http::trace::TraceLayer;

    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            path = %req.uri().path(),
            version = ?req.version(),
            request_id = %request_id_of(req.headers()),
            status = Empty,
            latency_ms = Empty
        )
    })
}
