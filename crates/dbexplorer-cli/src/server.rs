//! HTTP front end: maps method and path onto `dispatch`.
//!
//! | method | path            | operation   |
//! |--------|-----------------|-------------|
//! | GET    | `/`             | list tables |
//! | GET    | `/{table}`      | list rows (`?limit=&offset=`) |
//! | PUT    | `/{table}`      | create      |
//! | GET    | `/{table}/{id}` | get         |
//! | POST   | `/{table}/{id}` | update      |
//! | DELETE | `/{table}/{id}` | delete      |
//!
//! Everything else answers 501.

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use dbexplorer::dispatch::{dispatch, error_json, Request, UNSUPPORTED_MESSAGE};
use dbexplorer::{ErrorKind, ExplorerError, QueryEngine};
use tracing::{debug, info};

/// Run the server until it is stopped (Ctrl-C).
pub async fn serve(
    engine: QueryEngine,
    bind_addr: &str,
    workers: Option<usize>,
) -> Result<(), ExplorerError> {
    let data = web::Data::new(engine);

    let mut server =
        HttpServer::new(move || App::new().app_data(data.clone()).default_service(web::to(handle)))
            .bind(bind_addr)?;
    if let Some(n) = workers {
        server = server.workers(n);
    }

    info!("Listening on http://{}", bind_addr);
    server.run().await?;
    info!("Server stopped");
    Ok(())
}

async fn handle(req: HttpRequest, body: web::Bytes, engine: web::Data<QueryEngine>) -> HttpResponse {
    let response = respond(&req, &body, &engine).await;
    info!(
        method = %req.method(),
        path = %req.path(),
        status = response.status().as_u16(),
        "request"
    );
    response
}

async fn respond(req: &HttpRequest, body: &[u8], engine: &QueryEngine) -> HttpResponse {
    let Some(request) = Request::route(req.method().as_str(), req.path()) else {
        return HttpResponse::build(StatusCode::NOT_IMPLEMENTED)
            .json(error_json(UNSUPPORTED_MESSAGE));
    };

    let request = match request
        .with_query_string(req.query_string())
        .with_body_bytes(body)
    {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match dispatch(engine, &request).await {
        Ok(response) => HttpResponse::Ok().json(response.to_json()),
        Err(e) => {
            debug!("{:?} failed: {}", request.operation, e);
            error_response(&e)
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &ExplorerError) -> HttpResponse {
    HttpResponse::build(status_for(err.kind())).json(error_json(err))
}
