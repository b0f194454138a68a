//! HTTP response handlers.

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::log;

const PLAIN: &str = "text/plain; charset=utf-8";

/// Respond with a redirect to `location`.
pub fn respond_redirect(request: Request, location: &str, status: u16) -> Result<()> {
    // Location comes from document content; reject header-invalid values
    // instead of panicking on them.
    let Ok(header) = Header::from_bytes("Location", location.as_bytes()) else {
        log!("serve"; "invalid redirect target {:?}", location);
        return respond_not_found(request);
    };

    let response = Response::from_string(format!("Redirecting to {location}\n"))
        .with_status_code(StatusCode(status))
        .with_header(header)
        .with_header(make_header("Content-Type", PLAIN));
    request.respond(response)?;
    Ok(())
}

/// Respond with a plain-text 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found\n")
        .with_status_code(StatusCode(404))
        .with_header(make_header("Content-Type", PLAIN));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let response = Response::from_string("503 Service Unavailable\n")
        .with_status_code(StatusCode(503))
        .with_header(make_header("Content-Type", PLAIN));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
