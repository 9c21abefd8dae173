use actix_web::HttpResponse;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// GET /api/auth/health
pub async fn auth_health() -> HttpResponse {
    HttpResponse::Ok().body("Auth service is healthy!")
}
