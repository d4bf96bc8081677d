use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
}

/// Liveness plus a cheap query so a broken database shows up here.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    match state.db.list_notes() {
        Ok(notes) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "version": VERSION,
            "notes": notes.len(),
            "front_end": state.config.public_dir.is_some()
        })),
        Err(e) => {
            log::error!("[HEALTH] Database check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unavailable",
                "version": VERSION,
                "error": "Database unavailable"
            }))
        }
    }
}

async fn get_version() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "version": VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_reports_ok() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .configure(config_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["notes"], 0);
    }
}
