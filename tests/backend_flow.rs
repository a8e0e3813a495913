//! End-to-end stage flows against a mocked backend

use bugpatch::api::{ApiError, BackendClient};
use bugpatch::model::{AnalysisTool, SolutionId};
use bugpatch::session::Session;
use bugpatch::workflow::intake::{self, IntakeError};
use bugpatch::workflow::{apply, commit, dispatch, validate, viewer};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::time::Duration;

const REPO: &str = "https://github.com/acme/widgets";

const FILE_BODY: &str = r#"{
    "success": true,
    "filename": "src/Main.java",
    "content": "```java\nclass Main {\n  String name;\n  int size() { return name.length(); }\n}\n```",
    "analysis_tool": "SpotBugs",
    "num_bugs": 2,
    "bugs": [
        {"file": "Main.java", "line": 4, "type": "NP_NULL_ON_SOME_PATH", "category": "CORRECTNESS",
         "description": "Possible null dereference", "code_snippet": "return name.length();"},
        {"file": "Main.java", "line": 2, "type": "UWF_UNWRITTEN_FIELD", "category": "CORRECTNESS",
         "description": "Field never written", "code_snippet": "String name;"}
    ],
    "metrics": [{"class": "Main", "wmc": 1, "cbo": 0, "loc": 5}]
}"#;

fn client(server: &ServerGuard) -> BackendClient {
    BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

async fn analyzed_session(server: &mut ServerGuard, client: &BackendClient) -> Session {
    let analyze = server
        .mock("POST", "/analyze")
        .match_body(Matcher::UrlEncoded("repo_url".into(), REPO.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Analysis complete"}"#)
        .create_async()
        .await;
    let files = server
        .mock("GET", "/files")
        .match_query(Matcher::UrlEncoded("repo_name".into(), "acme/widgets".into()))
        .with_status(200)
        .with_body(r#"{"files": ["src/Main.java", "src/Util.java"]}"#)
        .create_async()
        .await;

    let mut session = Session::new(AnalysisTool::Spotbugs);
    let repo = intake::prepare(REPO).unwrap();
    let outcome = intake::run(client, repo).await.unwrap();
    intake::record(&mut session, &outcome);

    analyze.assert_async().await;
    files.assert_async().await;
    session
}

async fn viewed_session(server: &mut ServerGuard, client: &BackendClient) -> Session {
    let mut session = analyzed_session(server, client).await;
    let _mock = server
        .mock("POST", "/file_content")
        .match_body(Matcher::PartialJson(json!({"filename": "src/Main.java", "tool": "spotbugs"})))
        .with_status(200)
        .with_body(FILE_BODY)
        .create_async()
        .await;

    session.select_file("src/Main.java");
    let request = viewer::prepare(&session).unwrap();
    let view = viewer::run(client, request).await.unwrap();
    assert!(viewer::record(&mut session, view));
    session
}

async fn dispatched_session(server: &mut ServerGuard, client: &BackendClient) -> (Session, SolutionId) {
    let mut session = viewed_session(server, client).await;
    let _mock = server
        .mock("POST", "/send_to_llm")
        .with_status(200)
        .with_body(
            json!({"solutions": [
                {"solution": "return name == null ? 0 : name.length();", "explanation": "Guard null", "rating": 9},
                {"solution": "return Objects.toString(name, \"\").length();", "explanation": "Default", "rating": 7}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let bug_id = session.bugs()[1].id;
    let request = dispatch::prepare(&session, bug_id).unwrap();
    let outcome = dispatch::run(client, request).await.unwrap();
    assert!(dispatch::record(&mut session, outcome));
    let id = session.dispatch.as_ref().unwrap().boxes[0].id;
    (session, id)
}

#[tokio::test]
async fn test_invalid_url_sends_nothing() {
    let mut server = Server::new_async().await;
    let analyze = server.mock("POST", "/analyze").expect(0).create_async().await;

    let err = intake::prepare("https://gitlab.com/acme/widgets").unwrap_err();
    assert!(matches!(err, IntakeError::InvalidUrl));
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_stale_clone_is_blocking() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let _mock = server
        .mock("POST", "/analyze")
        .with_status(500)
        .with_body(r#"{"error": "Failed to clear previous cloned repo folder: permission denied"}"#)
        .create_async()
        .await;
    let files = server.mock("GET", "/files").expect(0).create_async().await;

    let err = intake::run(&client, intake::prepare(REPO).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, IntakeError::StaleClone(_)));
    assert_eq!(err.presentation(), bugpatch::workflow::Presentation::Blocking);
    files.assert_async().await;
}

#[tokio::test]
async fn test_file_view_sorts_bugs_and_strips_fences() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let session = viewed_session(&mut server, &client).await;

    let lines: Vec<u32> = session.bugs().iter().map(|b| b.bug.line).collect();
    assert_eq!(lines, vec![2, 4]);
    assert_eq!(session.bug_count(), 2);

    let viewed = session.viewed().unwrap();
    assert!(viewed.content.starts_with("class Main {"));
    assert!(!viewed.content.contains("```"));
    assert_eq!(bugpatch::view::code_lines(&viewed.content).len(), 4);
    assert!(viewed.ck_metrics.is_some());
}

#[tokio::test]
async fn test_view_error_is_reported_verbatim() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let mut session = analyzed_session(&mut server, &client).await;
    let _mock = server
        .mock("POST", "/file_content")
        .with_status(404)
        .with_body(r#"{"error": "File not found"}"#)
        .create_async()
        .await;

    session.select_file("src/Gone.java");
    let err = viewer::run(&client, viewer::prepare(&session).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "File not found");
}

#[tokio::test]
async fn test_java_version_error_is_flagged() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let mut session = analyzed_session(&mut server, &client).await;
    let _mock = server
        .mock("POST", "/file_content")
        .with_status(500)
        .with_body(r#"{"success": false, "error": "SpotBugs: Unsupported class file major version 65"}"#)
        .create_async()
        .await;

    session.select_file("src/Main.java");
    let err = viewer::run(&client, viewer::prepare(&session).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, viewer::ViewerError::JavaMismatch(_)));
    assert!(session.viewed().is_none());
}

#[tokio::test]
async fn test_dispatch_numbers_boxes() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (session, _) = dispatched_session(&mut server, &client).await;

    let dispatch = session.dispatch.as_ref().unwrap();
    let numbers: Vec<u32> = dispatch.boxes.iter().map(|b| b.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(dispatch.boxes[0].rating, Some(9));
    assert_eq!(dispatch.boxes[0].original_snippet, "return name.length();");
}

#[tokio::test]
async fn test_dispatch_reuses_cached_content() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let session = viewed_session(&mut server, &client).await;

    let refetch = server
        .mock("POST", "/file_content")
        .expect(0)
        .create_async()
        .await;
    let llm = server
        .mock("POST", "/send_to_llm")
        .match_body(Matcher::PartialJson(json!({
            "file_name": "src/Main.java",
            "file_content": "class Main {\n  String name;\n  int size() { return name.length(); }\n}"
        })))
        .with_status(200)
        .with_body(r#"{"solutions": [{"solution": "x", "explanation": "y"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let bug_id = session.bugs()[0].id;
    let request = dispatch::prepare(&session, bug_id).unwrap();
    let outcome = dispatch::run(&client, request).await.unwrap();
    assert_eq!(outcome.solutions.len(), 1);
    refetch.assert_async().await;
    llm.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_refetches_when_content_not_cached() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let mut session = viewed_session(&mut server, &client).await;
    // Selection moved on without viewing the new file
    session.select_file("src/Util.java");

    let refetch = server
        .mock("POST", "/file_content")
        .match_body(Matcher::Json(json!({"filename": "src/Util.java"})))
        .with_status(200)
        .with_body(r#"{"success": true, "content": "```java\nclass Util {}\n```\n"}"#)
        .expect(1)
        .create_async()
        .await;
    let llm = server
        .mock("POST", "/send_to_llm")
        .match_body(Matcher::PartialJson(json!({
            "file_name": "src/Util.java",
            "file_content": "class Util {}",
            "bug": {"type": "UWF_UNWRITTEN_FIELD", "line": 2}
        })))
        .with_status(200)
        .with_body(r#"{"solutions": [{"solution": "x", "explanation": "y"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let bug_id = session.bugs()[0].id;
    let request = dispatch::prepare(&session, bug_id).unwrap();
    assert!(request.cached_content.is_none());
    let outcome = dispatch::run(&client, request).await.unwrap();
    assert_eq!(outcome.filename, "src/Util.java");
    refetch.assert_async().await;
    llm.assert_async().await;
}

#[tokio::test]
async fn test_blank_feedback_sends_nothing() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;
    let update = server.mock("POST", "/update_solution").expect(0).create_async().await;

    session.solution_box_mut(id).unwrap().feedback = "   ".into();
    let err = dispatch::prepare_feedback(&session, id).unwrap_err();
    assert_eq!(err.user_message(), "Please provide feedback before submitting.");
    update.assert_async().await;
}

#[tokio::test]
async fn test_feedback_round_keeps_previous_text() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;
    let update = server
        .mock("POST", "/update_solution")
        .match_body(Matcher::PartialJson(json!({
            "user_feedback": "use Optional",
            "solution_number": 1,
            "bug_line": 4
        })))
        .with_status(200)
        .with_body(r#"{"updated_solution": "return Optional.ofNullable(name).map(String::length).orElse(0);"}"#)
        .create_async()
        .await;

    session.solution_box_mut(id).unwrap().feedback = " use Optional ".into();
    let request = dispatch::prepare_feedback(&session, id).unwrap();
    let updated = dispatch::run_feedback(&client, request).await.unwrap();
    assert!(dispatch::record_feedback(&mut session, id, updated));

    let b = session.solution_box(id).unwrap();
    assert!(b.solution.starts_with("return Optional"));
    assert_eq!(
        b.previous_solution.as_deref(),
        Some("return name == null ? 0 : name.length();")
    );
    assert!(b.feedback.is_empty());
    update.assert_async().await;
}

#[tokio::test]
async fn test_apply_then_validate_removes_bug() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;

    // Fresh copy used to check the replace target
    let refetch = server
        .mock("POST", "/file_content")
        .match_body(Matcher::Json(json!({"filename": "src/Main.java", "tool": "spotbugs"})))
        .with_status(200)
        .with_body(FILE_BODY)
        .expect(1)
        .create_async()
        .await;
    let apply_mock = server
        .mock("POST", "/apply_solution")
        .match_body(Matcher::PartialJson(json!({
            "file_path": "cloned_repo/src/Main.java",
            "code_snippet": "return name.length();",
            "solution_number": 1
        })))
        .with_status(200)
        .with_body(
            json!({
                "message": "Solution applied successfully",
                "full_solution": "```java\nclass Main {\n  String name;\n  int size() { return name == null ? 0 : name.length(); }\n}\n```",
                "metrics": {"improvements": {"wmc": {"before": 1, "after": 2, "delta": 1}}}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let request = apply::prepare(&session, id, "cloned_repo/", true).unwrap();
    let outcome = apply::run(&client, request).await.unwrap();
    assert_eq!(outcome.replaced, apply::CandidateSource::OriginalSnippet);
    assert!(apply::record(&mut session, outcome));
    refetch.assert_async().await;
    apply_mock.assert_async().await;

    let patched = session.patched.as_ref().unwrap();
    assert_eq!(bugpatch::view::code_lines(&patched.text).len(), 4);
    let rows = bugpatch::view::metrics_rows(patched.metrics.as_ref().unwrap());
    assert_eq!(rows[0].name, "WMC");
    assert_eq!(rows[0].change, "↑ 1");

    let validate_mock = server
        .mock("POST", "/validate_patch")
        .match_body(Matcher::PartialJson(json!({
            "filename": "src/Main.java",
            "bug_line": 4,
            "bug_type": "NP_NULL_ON_SOME_PATH",
            "tool": "spotbugs"
        })))
        .with_status(200)
        .with_body(r#"{"bug_fixed": true, "message": "Target bug was successfully fixed", "other_bugs": []}"#)
        .create_async()
        .await;

    let bug_id = session.dispatch.as_ref().unwrap().bug_id;
    let verdict = validate::run(&client, validate::prepare(&session, bug_id).unwrap())
        .await
        .unwrap();
    assert!(verdict.bug_fixed);
    validate::record(&mut session, &verdict);
    assert_eq!(session.bug_count(), 1);
    assert_eq!(session.bugs().len(), 1);
    validate_mock.assert_async().await;
}

#[tokio::test]
async fn test_still_present_verdict_is_not_an_error() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;
    let _mock = server
        .mock("POST", "/apply_solution")
        .with_status(200)
        .with_body(r#"{"corrected_code": "class Main {}"}"#)
        .create_async()
        .await;
    let request = apply::prepare(&session, id, "cloned_repo/", false).unwrap();
    let outcome = apply::run(&client, request).await.unwrap();
    apply::record(&mut session, outcome);

    let _mock = server
        .mock("POST", "/validate_patch")
        .with_status(422)
        .with_body(r#"{"bug_fixed": false, "message": "Target bug still exists", "other_bugs": [{"type": "X"}]}"#)
        .create_async()
        .await;

    let bug_id = session.dispatch.as_ref().unwrap().bug_id;
    let verdict = validate::run(&client, validate::prepare(&session, bug_id).unwrap())
        .await
        .unwrap();
    assert!(!verdict.bug_fixed);
    assert_eq!(verdict.message, "Target bug still exists");
    validate::record(&mut session, &verdict);
    assert_eq!(session.bug_count(), 2);
}

#[tokio::test]
async fn test_validate_strips_leading_line_numbers() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;
    let _mock = server
        .mock("POST", "/apply_solution")
        .with_status(200)
        .with_body(r#"{"full_solution": "12345package acme;\nclass Main {}"}"#)
        .create_async()
        .await;
    let outcome = apply::run(&client, apply::prepare(&session, id, "cloned_repo/", false).unwrap())
        .await
        .unwrap();
    apply::record(&mut session, outcome);

    let validate_mock = server
        .mock("POST", "/validate_patch")
        .match_body(Matcher::PartialJson(json!({"patched_code": "package acme;\nclass Main {}"})))
        .with_status(200)
        .with_body(r#"{"bug_fixed": true, "message": "ok"}"#)
        .create_async()
        .await;
    let bug_id = session.dispatch.as_ref().unwrap().bug_id;
    validate::run(&client, validate::prepare(&session, bug_id).unwrap())
        .await
        .unwrap();
    validate_mock.assert_async().await;
}

#[tokio::test]
async fn test_apply_refuses_when_target_moved() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let (mut session, id) = dispatched_session(&mut server, &client).await;

    // The file changed on the backend since it was viewed
    let _mock = server
        .mock("POST", "/file_content")
        .match_body(Matcher::Json(json!({"filename": "src/Main.java", "tool": "spotbugs"})))
        .with_status(200)
        .with_body(r#"{"success": true, "content": "class Main { int size() { return 0; } }"}"#)
        .create_async()
        .await;
    let apply_mock = server.mock("POST", "/apply_solution").expect(0).create_async().await;

    let request = apply::prepare(&session, id, "cloned_repo/", true).unwrap();
    let err = apply::run(&client, request).await.unwrap_err();
    assert!(matches!(err, apply::ApplyError::TargetMismatch));
    apply::record_failure(&mut session, id, &err);
    assert!(session.apply_failed);
    assert!(session.patched.is_none());
    apply_mock.assert_async().await;
}

#[tokio::test]
async fn test_commit_resets_session() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let mut session = analyzed_session(&mut server, &client).await;
    let commit_mock = server
        .mock("POST", "/commit_changes")
        .match_body(Matcher::Json(json!({
            "commit_message": "Automated bug fixes applied",
            "repo_url": REPO
        })))
        .with_status(200)
        .with_body(r#"{"success": true, "message": "Changes committed and pushed"}"#)
        .create_async()
        .await;

    let request = commit::prepare(&session, "", commit::DEFAULT_MESSAGE, "");
    let message = commit::run(&client, request).await.unwrap();
    assert_eq!(message, "Changes committed and pushed");
    commit::record(&mut session);
    assert!(session.repo.is_none());
    assert!(session.files.is_empty());
    commit_mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_commit_keeps_session() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let session = analyzed_session(&mut server, &client).await;
    let _mock = server
        .mock("POST", "/commit_changes")
        .with_status(500)
        .with_body(r#"{"success": false, "message": "Authentication failed"}"#)
        .create_async()
        .await;

    let err = commit::run(&client, commit::prepare(&session, "Fix", commit::DEFAULT_MESSAGE, ""))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Commit failed: Authentication failed");
    assert!(session.repo.is_some());
}

#[tokio::test]
async fn test_undecodable_reply_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let client = client(&server);
    let _mock = server
        .mock("GET", "/files")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = client.list_files("acme/widgets").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { status: 502, .. }));
}
