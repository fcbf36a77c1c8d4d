//! curl wiring for elasticsearch objects
//!
//! Elasticsearch has no interactive shell; `connect` reports cluster
//! health and `apply` posts ndjson to the bulk endpoint. The image's
//! entrypoint is curl itself, so the args below are curl flags.

use std::path::Path;

use anyhow::Result;
use dbctl_types::Credentials;

use crate::docker::{ClientInvocation, absolute};

const BODY_MOUNT: &str = "/tmp/apply.ndjson";

fn base(image: &str, creds: &Credentials, local_port: u16, path: &str) -> ClientInvocation {
    let mut inv = ClientInvocation::new(image).arg("-s");
    if let (Some(username), Some(password)) = (&creds.username, &creds.password) {
        inv = inv
            .arg("--user")
            .arg(format!("{}:{}", username, password));
    }
    inv.arg(format!("http://127.0.0.1:{}{}", local_port, path))
}

/// Print cluster health over the tunnel
pub fn connect(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    base(image, creds, local_port, "/_cluster/health?pretty")
}

/// Post a literal ndjson body to the bulk endpoint
pub fn apply_command(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    body: &str,
) -> ClientInvocation {
    base(image, creds, local_port, "/_bulk")
        .arg("-H")
        .arg("Content-Type: application/x-ndjson")
        .arg("--data-binary")
        .arg(body)
}

/// Post a local ndjson file to the bulk endpoint
pub fn apply_file(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    file: &Path,
) -> Result<ClientInvocation> {
    let file = absolute(file)?;
    Ok(base(image, creds, local_port, "/_bulk")
        .mount(file, BODY_MOUNT)
        .arg("-H")
        .arg("Content-Type: application/x-ndjson")
        .arg("--data-binary")
        .arg(format!("@{}", BODY_MOUNT)))
}
