//! Notes REST API.
//!
//! Plain CRUD over the `notes` table plus snapshot export/import. Every
//! failure answers `{"error": "..."}` with a matching status code.

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use sticky_types::snapshot::{self, SnapshotError};
use sticky_types::{ErrorBody, ImportMode, NewNote, Note, NotePatch};

use crate::AppState;

/// Snapshots can be much larger than a single note body.
const IMPORT_LIMIT_BYTES: usize = 4 * 1024 * 1024;

fn bad_request(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody::new(msg))
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(format!("Note not found: {}", id)))
}

fn internal_error(action: &str, e: rusqlite::Error) -> HttpResponse {
    log::error!("[NOTES] Failed to {}: {}", action, e);
    HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"))
}

/// Malformed JSON bodies get the same error shape as everything else.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = bad_request(format!("Invalid JSON body: {}", err));
    actix_web::error::InternalError::from_response(err, response).into()
}

/// Ids are integer row ids; anything else cannot exist.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

async fn list_notes(data: web::Data<AppState>) -> impl Responder {
    match data.db.list_notes() {
        Ok(notes) => HttpResponse::Ok().json(notes),
        Err(e) => internal_error("list notes", e),
    }
}

async fn create_note(data: web::Data<AppState>, body: web::Json<NewNote>) -> impl Responder {
    let Some(text) = body.normalized_text() else {
        return bad_request("Note text cannot be empty");
    };

    match data.db.create_note(&text, body.due_date, body.reminder_time) {
        Ok(note) => HttpResponse::Created().json(note),
        Err(e) => internal_error("create note", e),
    }
}

async fn update_note(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NotePatch>,
) -> impl Responder {
    let raw_id = path.into_inner();
    let Some(id) = parse_id(&raw_id) else {
        return not_found(&raw_id);
    };

    let patch = body.into_inner();
    if let Err(msg) = patch.normalized_text() {
        return bad_request(msg);
    }

    match data.db.update_note(id, &patch) {
        Ok(Some(note)) => {
            log::debug!("[NOTES] Updated note {}", id);
            HttpResponse::Ok().json(note)
        }
        Ok(None) => not_found(&raw_id),
        Err(e) => internal_error("update note", e),
    }
}

async fn delete_note(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let raw_id = path.into_inner();
    let Some(id) = parse_id(&raw_id) else {
        return not_found(&raw_id);
    };

    match data.db.delete_note(id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(&raw_id),
        Err(e) => internal_error("delete note", e),
    }
}

/// Pretty JSON array offered as a dated download.
async fn export_notes(data: web::Data<AppState>) -> impl Responder {
    let notes = match data.db.list_notes() {
        Ok(notes) => notes,
        Err(e) => return internal_error("export notes", e),
    };

    let body = match snapshot::render_snapshot(&notes) {
        Ok(body) => body,
        Err(e) => {
            log::error!("[NOTES] Failed to render snapshot: {}", e);
            return HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"));
        }
    };

    let file_name = snapshot::export_file_name(chrono::Local::now().date_naive());
    HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        ))
        .body(body)
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    mode: Option<String>,
}

async fn import_notes(
    data: web::Data<AppState>,
    query: web::Query<ImportQuery>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let mode = match query.mode.as_deref() {
        Some(raw) => match raw.parse::<ImportMode>() {
            Ok(mode) => mode,
            Err(msg) => return bad_request(msg),
        },
        None => ImportMode::default(),
    };

    let notes = match snapshot::validate_snapshot(body.into_inner()) {
        Ok(notes) => notes,
        Err(e) => return bad_request(format!("Invalid import file: {}", e)),
    };

    let mut rows: Vec<(i64, &Note)> = Vec::with_capacity(notes.len());
    for (index, note) in notes.iter().enumerate() {
        match note.id.as_int() {
            Some(id) => rows.push((id, note)),
            None => {
                let err = SnapshotError::InvalidEntry {
                    index,
                    reason: "id must be an integer".to_string(),
                };
                return bad_request(format!("Invalid import file: {}", err));
            }
        }
    }

    match data.db.import_notes(&rows, mode) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => internal_error("import notes", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .app_data(
                web::JsonConfig::default()
                    .limit(IMPORT_LIMIT_BYTES)
                    .error_handler(json_error),
            )
            .service(
                web::resource("")
                    .route(web::get().to(list_notes))
                    .route(web::post().to(create_note)),
            )
            // Fixed paths before the `{id}` catch-all
            .route("/export", web::get().to(export_notes))
            .route("/import", web::post().to(import_notes))
            .service(
                web::resource("/{id}")
                    .route(web::put().to(update_note))
                    .route(web::delete().to(delete_note)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use sticky_types::ImportSummary;

    macro_rules! app {
        () => {
            test::init_service(App::new().app_data(state()).configure(config)).await
        };
    }

    macro_rules! create {
        ($app:expr, $text:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/notes")
                .set_json(json!({ "text": $text }))
                .to_request();
            let note: Note = test::call_and_read_body_json(&$app, req).await;
            note
        }};
    }

    #[actix_web::test]
    async fn test_create_then_list() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/notes")
            .set_json(json!({ "text": "  buy milk  ", "dueDate": "2025-01-10" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Note = test::read_body_json(resp).await;
        assert_eq!(created.text, "buy milk");
        assert!(!created.pinned);

        let req = test::TestRequest::get().uri("/api/notes").to_request();
        let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes, vec![created]);
    }

    #[actix_web::test]
    async fn test_create_rejects_blank_text() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/notes")
            .set_json(json!({ "text": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("empty"));

        let req = test::TestRequest::get().uri("/api/notes").to_request();
        let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
        assert!(notes.is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_body_gets_error_json() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/notes")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_partial_update_keeps_other_fields() {
        let app = app!();
        let note = create!(app, "orig");

        let req = test::TestRequest::put()
            .uri(&format!("/api/notes/{}", note.id))
            .set_json(json!({ "pinned": true }))
            .to_request();
        let pinned: Note = test::call_and_read_body_json(&app, req).await;
        assert!(pinned.pinned);
        assert_eq!(pinned.text, "orig");

        let req = test::TestRequest::put()
            .uri(&format!("/api/notes/{}", note.id))
            .set_json(json!({ "text": "x" }))
            .to_request();
        let updated: Note = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.text, "x");
        assert!(updated.pinned);
        assert_eq!(updated.created_at, note.created_at);
    }

    #[actix_web::test]
    async fn test_update_errors() {
        let app = app!();
        let note = create!(app, "keep");

        let req = test::TestRequest::put()
            .uri(&format!("/api/notes/{}", note.id))
            .set_json(json!({ "text": "" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        for uri in ["/api/notes/999", "/api/notes/abc"] {
            let req = test::TestRequest::put()
                .uri(uri)
                .set_json(json!({ "text": "x" }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_delete_twice() {
        let app = app!();
        let note = create!(app, "bye");
        let uri = format!("/api/notes/{}", note.id);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_export_is_dated_download() {
        let app = app!();
        create!(app, "exported");

        let req = test::TestRequest::get().uri("/api/notes/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("sticky-notes-"));

        let body = test::read_body(resp).await;
        let notes = snapshot::parse_snapshot(std::str::from_utf8(&body).unwrap()).unwrap();
        assert_eq!(notes[0].text, "exported");
    }

    #[actix_web::test]
    async fn test_import_merge_and_replace() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/notes/import?mode=replace")
            .set_json(json!([{ "id": 5, "text": "old" }]))
            .to_request();
        let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.total, 1);

        let req = test::TestRequest::post()
            .uri("/api/notes/import")
            .set_json(json!([{ "id": 5, "text": "hi" }, { "id": 6, "text": "new" }]))
            .to_request();
        let summary: ImportSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary, ImportSummary { added: 1, skipped: 1, total: 2 });

        let req = test::TestRequest::get().uri("/api/notes").to_request();
        let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes[0].text, "old");
    }

    #[actix_web::test]
    async fn test_import_rejects_bad_input() {
        let app = app!();
        create!(app, "survivor");

        let bad = [
            ("/api/notes/import", json!({ "id": 1, "text": "not an array" })),
            ("/api/notes/import", json!([{ "id": "abc", "text": "string id" }])),
            ("/api/notes/import", json!([{ "id": 1 }])),
            ("/api/notes/import?mode=upsert", json!([])),
        ];
        for (uri, body) in bad {
            let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::get().uri("/api/notes").to_request();
        let notes: Vec<Note> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes.len(), 1);
    }

    #[actix_web::test]
    async fn test_remote_store_against_real_server() {
        use actix_web::HttpServer;
        use sticky_board::{NoteError, NoteStore, RemoteNoteStore};
        use sticky_types::NoteId;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let data = state();
        let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(config))
            .workers(1)
            .listen(listener)
            .unwrap()
            .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let store = RemoteNoteStore::new(&format!("http://{}/", addr));

        let created = store.create(NewNote::text("  round trip  ")).await.unwrap();
        assert_eq!(created.text, "round trip");

        store.update(&created.id, NotePatch::pinned(true)).await.unwrap();
        let updated = store.update(&created.id, NotePatch::text("x")).await.unwrap();
        assert!(updated.pinned);
        assert_eq!(updated.created_at, created.created_at);

        // The server, not the client, rejects this one.
        let string_ids = store
            .import_all(r#"[{"id": "abc", "text": "string ids stay local"}]"#, ImportMode::Merge)
            .await;
        assert!(matches!(string_ids, Err(NoteError::Validation(_))));

        let summary = store
            .import_all(
                &format!(r#"[{{"id": {}, "text": "clash"}}, {{"id": 900, "text": "new"}}]"#, created.id),
                ImportMode::Merge,
            )
            .await
            .unwrap();
        assert_eq!(summary, ImportSummary { added: 1, skipped: 1, total: 2 });

        let exported = snapshot::parse_snapshot(&store.export_all().await.unwrap()).unwrap();
        assert_eq!(exported.len(), 2);

        store.delete(&created.id).await.unwrap();
        assert!(matches!(store.delete(&created.id).await, Err(NoteError::NotFound(_))));
        assert!(matches!(
            store.update(&NoteId::Int(123_456), NotePatch::text("x")).await,
            Err(NoteError::NotFound(_))
        ));

        let notes = store.list().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, NoteId::Int(900));

        handle.stop(true).await;
    }
}
