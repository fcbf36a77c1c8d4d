//! mongo shell wiring for mongodb objects

use std::path::Path;

use anyhow::Result;
use dbctl_types::Credentials;

use crate::docker::{ClientInvocation, absolute};

const SCRIPT_MOUNT: &str = "/tmp/apply.js";

fn base(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    let mut inv = ClientInvocation::new(image)
        .arg("mongo")
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(local_port.to_string());
    if let (Some(username), Some(password)) = (&creds.username, &creds.password) {
        inv = inv
            .arg("-u")
            .arg(username)
            .arg("-p")
            .arg(password)
            .arg("--authenticationDatabase")
            .arg("admin");
    }
    inv
}

/// Interactive mongo shell over the tunnel
pub fn connect(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    base(image, creds, local_port).tty(true)
}

/// Evaluate a single shell expression, optionally against a database
pub fn apply_command(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    dbname: Option<&str>,
    command: &str,
) -> ClientInvocation {
    let mut inv = base(image, creds, local_port).arg("--eval").arg(command);
    if let Some(dbname) = dbname {
        inv = inv.arg(dbname);
    }
    inv
}

/// Execute a local shell script file
pub fn apply_file(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    dbname: Option<&str>,
    file: &Path,
) -> Result<ClientInvocation> {
    let file = absolute(file)?;
    let mut inv = base(image, creds, local_port).mount(file, SCRIPT_MOUNT);
    if let Some(dbname) = dbname {
        inv = inv.arg(dbname);
    }
    Ok(inv.arg(SCRIPT_MOUNT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        }
    }

    #[test]
    fn test_connect_authenticates_against_admin() {
        let inv = connect("mongo:4.2", &creds(), 27018);
        let args = inv.args.join(" ");
        assert!(args.contains("-u admin -p hunter2 --authenticationDatabase admin"));
        assert!(inv.tty);
    }

    #[test]
    fn test_connect_without_credentials() {
        let inv = connect("mongo:4.2", &Credentials::default(), 27018);
        assert!(!inv.args.contains(&"-u".to_string()));
    }

    #[test]
    fn test_apply_command_eval() {
        let inv = apply_command("mongo:4.2", &creds(), 27018, Some("app"), "db.stats()");
        let args = inv.args.join(" ");
        assert!(args.ends_with("--eval db.stats() app"));
    }
}
