//! services/api/src/bin/openapi.rs
//!
//! Dumps the goals API document as pretty JSON, for client generation.
//!
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`, `-` for stdout).

use api_lib::web::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api = ApiDoc::openapi();
    let document = api.to_pretty_json()?;

    match std::env::args().nth(1).as_deref() {
        Some("-") => println!("{}", document),
        target => {
            let path = PathBuf::from(target.unwrap_or("openapi.json"));
            std::fs::write(&path, document)?;
            eprintln!(
                "Wrote {} goal API paths to {}",
                api.paths.paths.len(),
                path.display()
            );
        }
    }
    Ok(())
}
