use actix_web::{web, HttpResponse};
use log::info;
use serde_json::Value;

use super::proxy_models::{with_cors, ListProblemsRequest, ProblemRequest, ProxyError, ProxyErrorBody};
use crate::squidler::{ProblemAction, ProblemQuery, SquidlerClient};

fn relay_ok(data: Value) -> HttpResponse {
    with_cors(&mut HttpResponse::Ok()).json(data)
}

// CORS preflight
pub async fn preflight() -> HttpResponse {
    with_cors(&mut HttpResponse::NoContent()).finish()
}

pub async fn method_not_allowed() -> HttpResponse {
    with_cors(&mut HttpResponse::MethodNotAllowed()).json(ProxyErrorBody {
        error: "Method not allowed".into(),
        details: None,
    })
}

pub async fn get_problems(
    client: web::Data<SquidlerClient>,
    body: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    info!("get-squidler-problems: Request received");
    let upstream = client.authorized()?;

    let request: ListProblemsRequest = serde_json::from_slice(&body)?;
    let query = ProblemQuery::try_from(request)?;
    info!(
        "get-squidler-problems: limit={} offset={} suiteType={:?}",
        query.limit, query.offset, query.suite_type
    );

    let data = upstream.list_problems(&query).await?;
    info!(
        "get-squidler-problems: Successfully fetched problems, totalProblems={}",
        data.get("totalProblems").unwrap_or(&Value::Null)
    );

    Ok(relay_ok(data))
}

pub async fn dismiss_problem(
    client: web::Data<SquidlerClient>,
    body: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    change_problem(&client, &body, ProblemAction::Dismiss).await
}

pub async fn resolve_problem(
    client: web::Data<SquidlerClient>,
    body: web::Bytes,
) -> Result<HttpResponse, ProxyError> {
    change_problem(&client, &body, ProblemAction::Resolve).await
}

async fn change_problem(
    client: &SquidlerClient,
    body: &[u8],
    action: ProblemAction,
) -> Result<HttpResponse, ProxyError> {
    info!("{:?} problem: Request received", action);
    let upstream = client.authorized()?;

    let request: ProblemRequest = serde_json::from_slice(body)?;
    let problem_id = request.problem_id()?;
    info!("{:?} problem: problemId={}", action, problem_id);

    let data = upstream.update_problem(action, &problem_id).await?;
    info!("{:?} problem: Success for problemId={}", action, problem_id);

    Ok(relay_ok(data))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::routes::routes::squidler_configure;

    macro_rules! proxy_app {
        ($client:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($client))
                    .configure(squidler_configure),
            )
            .await
        };
    }

    fn cors_origin(resp: &actix_web::dev::ServiceResponse) -> Option<&str> {
        resp.headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|v| v.to_str().ok())
    }

    #[actix_web::test]
    async fn list_uses_defaults_for_empty_body() {
        let server = MockServer::start().await;
        let upstream = json!({ "siteId": "s1", "totalProblems": 0, "problems": [] });
        Mock::given(method("GET"))
            .and(path("/api/problems"))
            .and(query_param("limit", "50"))
            .and(query_param("offset", "0"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/get-squidler-problems")
            .set_payload("{}")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(cors_origin(&resp), Some("*"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, upstream);

        let received = server.received_requests().await.unwrap();
        assert!(!received[0].url.query().unwrap_or_default().contains("suiteType"));
    }

    #[actix_web::test]
    async fn list_forwards_suite_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/problems"))
            .and(query_param("limit", "5"))
            .and(query_param("offset", "10"))
            .and(query_param("suiteType", "Accessibility"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "problems": [] })))
            .expect(1)
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/get-squidler-problems")
            .set_json(json!({ "limit": 5, "offset": 10, "suiteType": "Accessibility" }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn list_forwards_string_paging_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/problems"))
            .and(query_param("limit", "10"))
            .and(query_param("offset", "-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "problems": [] })))
            .expect(1)
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/get-squidler-problems")
            .set_json(json!({ "limit": "10", "offset": -1 }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn list_failure_reports_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/problems"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/get-squidler-problems")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(cors_origin(&resp), Some("*"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Failed to fetch problems from Squidler", "details": "bad key" })
        );
    }

    #[actix_web::test]
    async fn dismiss_without_problem_id_is_rejected() {
        let app = proxy_app!(SquidlerClient::new("http://127.0.0.1:9", Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/dismiss-squidler-problem")
            .set_payload("{}")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "problemId is required" }));
    }

    #[actix_web::test]
    async fn upstream_failure_status_and_text_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/problems/p-1/dismiss"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream is down"))
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/dismiss-squidler-problem")
            .set_json(json!({ "problemId": "p-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(cors_origin(&resp), Some("*"));
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Failed to dismiss problem", "details": "upstream is down" })
        );
    }

    #[actix_web::test]
    async fn resolve_posts_problem_id_upstream() {
        let server = MockServer::start().await;
        let upstream = json!({ "status": "resolved", "problemId": "p-9" });
        Mock::given(method("POST"))
            .and(path("/api/problems/p-9/resolve"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({ "problemId": "p-9" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;
        let app = proxy_app!(SquidlerClient::new(server.uri(), Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/resolve-squidler-problem")
            .set_json(json!({ "problemId": "p-9" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, upstream);
    }

    #[actix_web::test]
    async fn missing_api_key_is_a_configuration_error() {
        let app = proxy_app!(SquidlerClient::new("http://127.0.0.1:9", None));

        let req = test::TestRequest::post()
            .uri("/functions/v1/resolve-squidler-problem")
            .set_json(json!({ "problemId": "p-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Squidler API key not configured" }));
    }

    #[actix_web::test]
    async fn invalid_json_is_an_unexpected_error() {
        let app = proxy_app!(SquidlerClient::new("http://127.0.0.1:9", Some("test-key".into())));

        let req = test::TestRequest::post()
            .uri("/functions/v1/get-squidler-problems")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ProxyErrorBody = test::read_body_json(resp).await;
        assert!(!body.error.is_empty());
        assert!(body.details.is_none());
    }

    #[actix_web::test]
    async fn preflight_and_other_methods() {
        let app = proxy_app!(SquidlerClient::new("http://127.0.0.1:9", None));

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/functions/v1/get-squidler-problems")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(cors_origin(&resp), Some("*"));
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Headers").unwrap(),
            "authorization, x-client-info, apikey, content-type"
        );
        assert!(test::read_body(resp).await.is_empty());

        let req = test::TestRequest::get()
            .uri("/functions/v1/dismiss-squidler-problem")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(cors_origin(&resp), Some("*"));
    }
}
