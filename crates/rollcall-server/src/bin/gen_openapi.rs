//! Writes the OpenAPI specification to a file.
//!
//! Used by client code generation:
//!
//! ```bash
//! cargo run --package rollcall-server --bin gen-openapi -- openapi.json
//! ```

#![forbid(unsafe_code)]

use std::path::PathBuf;

use rollcall_server::api::get_openapi_json;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("openapi.json"), PathBuf::from);

    let spec = get_openapi_json();
    std::fs::write(&path, spec)?;

    println!("OpenAPI spec written to {}", path.display());
    Ok(())
}
