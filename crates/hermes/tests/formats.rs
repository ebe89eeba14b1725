//! Request readers and response writers plugged into pipelines.

mod common;

use bytes::Bytes;
use common::CapturingLogger;
use hermes::extract::{ResponseBody, FORM_CONTENT_TYPE};
use hermes::prelude::*;
use hermes_test::TestClient;
use http::request::Parts;
use http::Response;
use http_body_util::Full;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Login {
    username: String,
    remember: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Session {
    user: String,
    ttl: u32,
}

async fn login(_: RequestContext, req: Login) -> Result<Session, BoxError> {
    if req.username.is_empty() {
        return Err("username is required".into());
    }
    Ok(Session {
        user: req.username,
        ttl: if req.remember { 86_400 } else { 3_600 },
    })
}

#[tokio::test]
async fn test_form_in_form_out() {
    let handler = Pipeline::action(login).with([
        options::request_reader(RequestReader::form()),
        options::response_writer(ResponseWriter::form()),
    ]);

    let response = TestClient::new(handler)
        .post("/login")
        .form(&[("username", "alice"), ("remember", "true")])
        .send()
        .await;

    response
        .assert_status(StatusCode::OK)
        .assert_content_type(FORM_CONTENT_TYPE)
        .assert_body_eq("user=alice&ttl=86400");
    assert_eq!(
        response.form::<Session>().unwrap(),
        Session {
            user: "alice".to_string(),
            ttl: 86_400,
        }
    );
}

#[tokio::test]
async fn test_form_decode_failure() {
    let handler = Pipeline::action(login).with([options::request_reader(RequestReader::form())]);

    let response = TestClient::new(handler)
        .post("/login")
        .form(&[("username", "alice"), ("remember", "maybe")])
        .send()
        .await;

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("failed to read request: ");
}

#[tokio::test]
async fn test_form_with_reader() {
    let reader = RequestReader::form_with(|pairs: &[(String, String)]| {
        let tags: Vec<String> = pairs
            .iter()
            .filter(|(k, _)| k == "tag")
            .map(|(_, v)| v.clone())
            .collect();
        if tags.is_empty() {
            return Err("at least one tag is required");
        }
        Ok(tags)
    });
    let handler = Pipeline::action(|_: RequestContext, tags: Vec<String>| async move {
        Ok::<_, BoxError>(tags.join(","))
    })
    .with([options::request_reader(reader)]);
    let client = TestClient::new(handler);

    let ok = client.post("/tags").body("tag=a&tag=b&other=c").send().await;
    assert_eq!(ok.json::<String>().unwrap(), "a,b");

    let bad = client.post("/tags").body("other=c").send().await;
    bad.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        bad.json::<String>().unwrap(),
        "failed to read request: at least one tag is required"
    );
}

#[tokio::test]
async fn test_callback_reader_model_without_serde() {
    struct Tags(Vec<String>);

    let reader = RequestReader::form_with(|pairs: &[(String, String)]| {
        Ok::<_, BoxError>(Tags(pairs.iter().map(|(_, v)| v.clone()).collect()))
    });
    let handler = Pipeline::callback_action(|_: RequestContext, tags: Tags| async move {
        Ok::<_, BoxError>(tags.0.len())
    })
    .with([options::request_reader(reader)]);

    let response = TestClient::new(handler)
        .post("/tags")
        .body("tag=a&tag=b&tag=c")
        .send()
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<usize>().unwrap(), 3);
}

#[tokio::test]
async fn test_form_with_writer() {
    let writer = ResponseWriter::form_with(|payload: &Payload| -> Result<_, BoxError> {
        let session = payload
            .downcast_ref::<Session>()
            .ok_or("unexpected payload")?;
        Ok(vec![
            ("ttl".to_string(), session.ttl.to_string()),
            ("user".to_string(), session.user.clone()),
        ])
    });
    let handler = Pipeline::action(login).with([options::response_writer(writer)]);

    let response = TestClient::new(handler)
        .post("/login")
        .json(&serde_json::json!({ "username": "bob", "remember": false }))
        .send()
        .await;

    response.assert_body_eq("ttl=3600&user=bob");
}

#[tokio::test]
async fn test_custom_reader() {
    let reader = RequestReader::custom(|parts: &Parts, body: &Bytes| {
        let lang = hermes::core::from_headers(parts, "content-language");
        std::str::from_utf8(body).map(|text| format!("{lang}:{text}"))
    });
    let handler = Pipeline::action(|_: RequestContext, text: String| async move {
        Ok::<_, BoxError>(text)
    })
    .with([options::request_reader(reader)]);
    let client = TestClient::new(handler);

    let response = client
        .post("/echo")
        .header("content-language", "en")
        .body("plain text")
        .send()
        .await;
    assert_eq!(response.json::<String>().unwrap(), "en:plain text");

    let invalid = client.post("/echo").body(vec![0xff, 0xfe]).send().await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_no_content_writer() {
    let logger = CapturingLogger::default();
    let handler = Pipeline::action(login).with([
        options::success_code(StatusCode::CREATED),
        options::response_writer(ResponseWriter::no_content()),
        options::error_logger(logger.clone()),
    ]);
    let client = TestClient::new(handler);

    let ok = client
        .post("/login")
        .json(&serde_json::json!({ "username": "carol", "remember": true }))
        .send()
        .await;
    ok.assert_status(StatusCode::NO_CONTENT).assert_empty();
    assert!(ok.content_type().is_none());

    let failed = client
        .post("/login")
        .json(&serde_json::json!({ "username": "", "remember": true }))
        .send()
        .await;
    failed.assert_status(StatusCode::NO_CONTENT).assert_empty();
    assert_eq!(logger.messages(), ["request failed"]);
    assert_eq!(logger.entries()[0].field("status"), Some("500"));
}

#[tokio::test]
async fn test_custom_writer() {
    let writer = ResponseWriter::custom(
        |ctx: &RequestContext, _: &dyn ErrorLogger, status: StatusCode, payload: &Payload| {
            let body = payload.to_json_vec().unwrap_or_default();
            Response::builder()
                .status(status)
                .header("x-request-id", ctx.request_id().to_string())
                .header("content-type", "application/vnd.session+json")
                .body(Full::new(Bytes::from(body)))
                .unwrap_or_else(|_| Response::new(ResponseBody::default()))
        },
    );
    let handler = Pipeline::action(login).with([options::response_writer(writer)]);

    let response = TestClient::new(handler)
        .post("/login")
        .header("x-request-id", "01890a5d-ac96-774b-bcce-b302099a8057")
        .json(&serde_json::json!({ "username": "dave", "remember": false }))
        .send()
        .await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-request-id", "01890a5d-ac96-774b-bcce-b302099a8057")
        .assert_content_type("application/vnd.session+json");
    assert_eq!(response.json::<Session>().unwrap().user, "dave");
}

#[tokio::test]
async fn test_body_limit() {
    let logger = CapturingLogger::default();
    let handler = Pipeline::action(|_: RequestContext, text: String| async move {
        Ok::<_, BoxError>(text.len())
    })
    .with([options::max_body_size(16), options::error_logger(logger.clone())]);
    let client = TestClient::new(handler);

    let small = client.post("/").json(&"short").send().await;
    assert_eq!(small.json::<usize>().unwrap(), 5);

    let large = client.post("/").json(&"x".repeat(64)).send().await;
    large.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        large.json::<String>().unwrap(),
        "failed to read request: payload too large: body exceeds 16 bytes"
    );
    assert_eq!(logger.messages(), ["failed to read request content"]);
}
