//! services/api/src/bin/openapi.rs
//!
//! Writes the planner's OpenAPI document so the web client can generate its API
//! bindings without a running server.
//!
//! Usage: `openapi [OUTPUT]`; OUTPUT defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let document = ApiDoc::openapi();
    std::fs::write(&output, document.to_pretty_json()?)?;
    println!(
        "Wrote {} paths to {}",
        document.paths.paths.len(),
        output.display()
    );
    Ok(())
}
