//! Integration tests for the attachment layer: subjects, documents, todos,
//! and the AI stubs behind their access checks.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn subject_names_are_unique_per_semester_case_insensitively() {
    let app = TestApp::spawn().await;
    let (token_a, _user_a) = app.signup("alice", "alice@example.com").await;
    let (token_b, user_b) = app.signup("bob", "bob@example.com").await;

    let (classroom_id, semester_id, join_code) = app.create_classroom(&token_a, "CS101").await;
    app.join_and_approve(classroom_id, &join_code, &token_b, user_b, &token_a)
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/subject/create",
            Some(&token_a),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "name": "Algorithms",
                "code": "CS-301",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // Different case, same semester: conflict.
    let (status, body) = app
        .request(
            "POST",
            "/api/subject/create",
            Some(&token_a),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "name": "algorithms",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // A plain member cannot create subjects.
    let (status, _body) = app
        .request(
            "POST",
            "/api/subject/create",
            Some(&token_b),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "name": "Databases",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A fresh semester gets its own namespace.
    let (status, body) = app
        .request(
            "POST",
            "/api/semester/create",
            Some(&token_a),
            Some(serde_json::json!({"classroom_id": classroom_id, "name": "Semester 2"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let semester2 = body["semester"]["id"].as_str().unwrap().to_string();

    let (status, _body) = app
        .request(
            "POST",
            "/api/subject/create",
            Some(&token_a),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester2,
                "name": "Algorithms",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    app.teardown().await;
}

#[tokio::test]
async fn subjects_list_oldest_first() {
    let app = TestApp::spawn().await;
    let (token_a, _user_a) = app.signup("alice", "alice@example.com").await;
    let (classroom_id, semester_id, _join_code) = app.create_classroom(&token_a, "CS101").await;

    for name in ["Algorithms", "Databases", "Networks"] {
        let (status, _body) = app
            .request(
                "POST",
                "/api/subject/create",
                Some(&token_a),
                Some(serde_json::json!({
                    "classroom_id": classroom_id,
                    "semester_id": semester_id,
                    "name": name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/subject/semester/{semester_id}/list"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Algorithms", "Databases", "Networks"]);

    app.teardown().await;
}

#[tokio::test]
async fn document_upload_gates_and_deletion_rights() {
    let app = TestApp::spawn().await;
    let (token_a, _user_a) = app.signup("alice", "alice@example.com").await;
    let (token_b, user_b) = app.signup("bob", "bob@example.com").await;
    let (token_c, _user_c) = app.signup("carol", "carol@example.com").await;

    let (classroom_id, semester_id, join_code) = app.create_classroom(&token_a, "CS101").await;
    app.join_and_approve(classroom_id, &join_code, &token_b, user_b, &token_a)
        .await;

    // Member B uploads; non-member C cannot.
    let upload = |filename: &str| {
        serde_json::json!({
            "classroom_id": classroom_id,
            "semester_id": semester_id,
            "filename": filename,
            "doc_type": "note",
            "size_bytes": 2048,
        })
    };

    let (status, body) = app
        .request(
            "POST",
            "/api/document/upload",
            Some(&token_b),
            Some(upload("lecture1.pdf")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let doc_by_b = body["document"]["id"].as_str().unwrap().to_string();
    assert!(
        body["document"]["storage_ref"]
            .as_str()
            .unwrap()
            .ends_with("lecture1.pdf")
    );

    let (status, _body) = app
        .request(
            "POST",
            "/api/document/upload",
            Some(&token_c),
            Some(upload("intruder.pdf")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Disallowed extension and oversize are rejected up front.
    let (status, _body) = app
        .request(
            "POST",
            "/api/document/upload",
            Some(&token_b),
            Some(upload("script.exe")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _body) = app
        .request(
            "POST",
            "/api/document/upload",
            Some(&token_b),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "filename": "huge.pdf",
                "size_bytes": 11 * 1024 * 1024,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // AI flag toggle is CR-only.
    let (status, _body) = app
        .request(
            "PATCH",
            &format!("/api/document/{doc_by_b}/toggle-ai"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/document/{doc_by_b}/toggle-ai"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["use_for_ai"], true);

    // CR A may delete B's document even without owning it.
    let (status, _body) = app
        .request(
            "DELETE",
            &format!("/api/document/{doc_by_b}"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.teardown().await;
}

#[tokio::test]
async fn todos_toggle_for_members_and_delete_for_owner_or_cr() {
    let app = TestApp::spawn().await;
    let (token_a, _user_a) = app.signup("alice", "alice@example.com").await;
    let (token_b, user_b) = app.signup("bob", "bob@example.com").await;

    let (classroom_id, semester_id, join_code) = app.create_classroom(&token_a, "CS101").await;
    app.join_and_approve(classroom_id, &join_code, &token_b, user_b, &token_a)
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/todo/create",
            Some(&token_b),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "text": "Revise chapter 4",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let todo_id = body["todo"]["id"].as_str().unwrap().to_string();

    // Any member can toggle, both directions.
    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/todo/{todo_id}/toggle"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/todo/{todo_id}/toggle"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);

    // CR A may delete B's todo.
    let (status, _body) = app
        .request(
            "DELETE",
            &format!("/api/todo/{todo_id}"),
            Some(&token_a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/todo/semester/{semester_id}/list"),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["todos"].as_array().unwrap().is_empty());

    app.teardown().await;
}

#[tokio::test]
async fn ai_stubs_answer_members_only() {
    let app = TestApp::spawn().await;
    let (token_a, _user_a) = app.signup("alice", "alice@example.com").await;
    let (token_c, _user_c) = app.signup("carol", "carol@example.com").await;

    let (classroom_id, semester_id, _join_code) = app.create_classroom(&token_a, "CS101").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/document/upload",
            Some(&token_a),
            Some(serde_json::json!({
                "classroom_id": classroom_id,
                "semester_id": semester_id,
                "filename": "lecture1.pdf",
                "size_bytes": 1024,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let document_id = body["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "POST",
            "/api/ai/summary",
            Some(&token_a),
            Some(serde_json::json!({
                "document_id": document_id,
                "semester_id": semester_id,
                "summary_type": "bullet-points",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["type"], "bullet-points");
    assert!(body["summary"].as_str().unwrap().contains("lecture1.pdf"));

    // Non-members get a 403, not canned content.
    let (status, _body) = app
        .request(
            "POST",
            "/api/ai/summary",
            Some(&token_c),
            Some(serde_json::json!({
                "document_id": document_id,
                "semester_id": semester_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            "POST",
            "/api/ai/flashcards",
            Some(&token_a),
            Some(serde_json::json!({
                "document_id": document_id,
                "semester_id": semester_id,
                "count": 3,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flashcards"].as_array().unwrap().len(), 3);

    app.teardown().await;
}
