use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use triviabox::api;
use triviabox::state::AppState;
use triviabox::types::{AdvanceOutcome, ROUND_SECONDS};

const BANK_TEXT: &str = "\
Question: What is the capital of France?
1) Berlin
2) Paris
3) Madrid
4) Rome
Answer: 2

Question: Which planet is closest to the sun?
1) Venus
2) Mercury
3) Mars
4) Earth
Answer: 2

Question: How many legs does a spider have?
1) Six
2) Ten
3) Eight
4) Four
Answer: 3
";

fn app(state: Arc<AppState>) -> axum::Router {
    api::router(state)
}

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &axum::Router, uri: &str) -> serde_json::Value {
    let (status, body) = get(router, uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn get_text(router: &axum::Router, uri: &str) -> String {
    let (status, body) = get(router, uri).await;
    assert_eq!(status, StatusCode::OK);
    String::from_utf8(body).unwrap()
}

async fn upload(router: &axum::Router, file_name: &str, content: &str) -> serde_json::Value {
    let boundary = "triviabox-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// End-to-end moderator and player flow over the HTTP surface.
#[tokio::test]
async fn test_full_quiz_flow() {
    let state = Arc::new(AppState::new());
    let router = app(state.clone());

    // 1. Nothing loaded yet.
    let current = get_json(&router, "/current").await;
    assert_eq!(current["questionIndex"], -1);
    assert!(current["question"].is_null());

    let next = get_json(&router, "/next").await;
    assert_eq!(next["message"], "No questions loaded or generated.");

    // 2. Upload a bank.
    let loaded = upload(&router, "quiz.txt", BANK_TEXT).await;
    assert_eq!(loaded["loaded"], true);
    assert_eq!(loaded["count"], 3);
    assert_eq!(state.bank_size().await, 3);

    // 3. First round opens.
    let next = get_json(&router, "/next").await;
    assert_eq!(next["questionIndex"], 0);
    assert_eq!(next["question"], "What is the capital of France?");
    assert_eq!(next["options"][1], "Paris");
    assert_eq!(next["time"], ROUND_SECONDS);

    let key = get_json(&router, "/answerkey").await;
    assert_eq!(key["correct"], 2);
    assert_eq!(key["text"], "Paris");

    // 4. Players answer.
    assert_eq!(
        get_text(&router, "/answer?player=alice&choice=2").await,
        "correct"
    );
    assert_eq!(
        get_text(&router, "/answer?player=bob&choice=4").await,
        "wrong"
    );

    let scores = get_json(&router, "/scores").await;
    assert_eq!(scores["alice"], 1);
    assert_eq!(scores["bob"], 0);

    // 5. Walk the rest of the bank.
    let next = get_json(&router, "/next").await;
    assert_eq!(next["questionIndex"], 1);
    assert_eq!(
        get_text(&router, "/answer?player=bob&choice=2").await,
        "correct"
    );

    let next = get_json(&router, "/next").await;
    assert_eq!(next["questionIndex"], 2);

    let next = get_json(&router, "/next").await;
    assert_eq!(next["message"], "No more questions!");

    // Exhausted: no selected question any more.
    assert_eq!(
        get_text(&router, "/answer?player=alice&choice=1").await,
        "no_question"
    );
    let key = get_json(&router, "/answerkey").await;
    assert_eq!(key["message"], "No active question.");

    // 6. Reset keeps the bank but wipes everything else.
    assert_eq!(get_text(&router, "/reset").await, "Game reset.");

    let scores = get_json(&router, "/scores").await;
    assert_eq!(scores, serde_json::json!({}));

    let next = get_json(&router, "/next").await;
    assert_eq!(next["questionIndex"], 0);
}

/// The single-question walkthrough: load, advance, key, score.
#[tokio::test]
async fn test_single_question_walkthrough() {
    let state = AppState::new();
    state
        .load_bank("Question: Q1\nA) A\nB) B\nAnswer: 1")
        .await
        .unwrap();

    match state.advance().await {
        AdvanceOutcome::Opened(snap) => {
            assert_eq!(snap.question_index, 0);
            assert_eq!(snap.question, "Q1");
            assert_eq!(snap.options, vec!["A", "B"]);
            assert_eq!(snap.time, 15);
        }
        other => panic!("expected Opened, got {other:?}"),
    }

    let key = state.answer_key().await.unwrap();
    assert_eq!(key.correct, 1);
    assert_eq!(key.text, "A");

    assert_eq!(
        state.submit_answer("p1", Some(1)).await.as_wire(),
        "correct"
    );

    let expected: HashMap<String, u32> = HashMap::from([("p1".to_string(), 1)]);
    assert_eq!(state.get_scores().await, expected);
}

#[tokio::test]
async fn test_answer_rejection_codes_over_http() {
    let state = Arc::new(AppState::new());
    let router = app(state.clone());

    // Missing and blank player first, regardless of everything else.
    assert_eq!(get_text(&router, "/answer?choice=1").await, "no_player");
    assert_eq!(
        get_text(&router, "/answer?player=%20%20&choice=1").await,
        "no_player"
    );

    // Player present but nothing selected.
    assert_eq!(
        get_text(&router, "/answer?player=alice&choice=1").await,
        "no_question"
    );

    state.load_bank(BANK_TEXT).await.unwrap();
    state.advance().await;

    // Out-of-protocol and unparseable choices.
    assert_eq!(
        get_text(&router, "/answer?player=alice&choice=5").await,
        "invalid_choice"
    );
    assert_eq!(
        get_text(&router, "/answer?player=alice&choice=abc").await,
        "invalid_choice"
    );
    assert_eq!(
        get_text(&router, "/answer?player=alice").await,
        "invalid_choice"
    );
}

#[tokio::test]
async fn test_bad_upload_preserves_loaded_game() {
    let state = Arc::new(AppState::new());
    let router = app(state.clone());

    upload(&router, "quiz.txt", BANK_TEXT).await;
    get_json(&router, "/next").await;

    // A document with no recognizable questions is rejected...
    let reply = upload(&router, "notes.txt", "shopping list: eggs, milk").await;
    assert_eq!(reply["loaded"], false);
    assert!(reply["error"].as_str().unwrap().contains("no recognizable"));

    // ...and the running game is untouched.
    let current = get_json(&router, "/current").await;
    assert_eq!(current["questionIndex"], 0);
    assert_eq!(current["question"], "What is the capital of France?");
}

#[tokio::test]
async fn test_unsupported_upload_type_is_a_structured_error() {
    let router = app(Arc::new(AppState::new()));

    let reply = upload(&router, "quiz.docx", "PK fake zip bytes").await;
    assert_eq!(reply["loaded"], false);
    assert!(reply["error"].as_str().unwrap().contains("docx"));
}

#[tokio::test]
async fn test_upload_without_file_field_is_a_structured_error() {
    let router = app(Arc::new(AppState::new()));

    let boundary = "triviabox-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
         not a file\r\n\
         --{boundary}--\r\n"
    );

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["loaded"], false);
    assert!(reply["error"].as_str().unwrap().contains("no file field"));
}

#[tokio::test]
async fn test_generate_without_backend_reports_error() {
    let router = app(Arc::new(AppState::new()));

    let reply = get_json(&router, "/generate?subject=history").await;
    assert_eq!(reply["generated"], false);
    assert!(reply["error"]
        .as_str()
        .unwrap()
        .contains("no generation backend"));
}

#[tokio::test]
async fn test_current_reflects_latest_round_without_side_effects() {
    let state = Arc::new(AppState::new());
    let router = app(state.clone());

    upload(&router, "quiz.txt", BANK_TEXT).await;
    get_json(&router, "/next").await;
    get_json(&router, "/next").await;

    let first = get_json(&router, "/current").await;
    assert_eq!(first["questionIndex"], 1);
    assert_eq!(first["question"], "Which planet is closest to the sun?");

    // Polling does not move anything.
    for _ in 0..3 {
        assert_eq!(get_json(&router, "/current").await, first);
    }
}
