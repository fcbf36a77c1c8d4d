//! psql wiring for postgres objects

use std::path::Path;

use anyhow::Result;
use dbctl_types::Credentials;

use crate::docker::{ClientInvocation, absolute};

const SQL_MOUNT: &str = "/tmp/apply.sql";

fn base(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    let mut inv = ClientInvocation::new(image)
        .arg("psql")
        .arg("--host=127.0.0.1")
        .arg(format!("--port={}", local_port))
        .arg(format!("--username={}", creds.username_or("postgres")));
    if let Some(password) = &creds.password {
        inv = inv.env("PGPASSWORD", password);
    }
    inv
}

/// Interactive psql session over the tunnel
pub fn connect(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    base(image, creds, local_port).tty(true)
}

/// Run a single SQL command against a logical database
pub fn apply_command(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    dbname: &str,
    command: &str,
) -> ClientInvocation {
    base(image, creds, local_port)
        .arg(format!("--dbname={}", dbname))
        .arg(format!("--command={}", command))
}

/// Execute a local SQL file
pub fn apply_file(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    dbname: &str,
    file: &Path,
) -> Result<ClientInvocation> {
    let file = absolute(file)?;
    Ok(base(image, creds, local_port)
        .arg(format!("--dbname={}", dbname))
        .mount(file, SQL_MOUNT)
        .arg(format!("--file={}", SQL_MOUNT)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            username: Some("postgres".to_string()),
            password: Some("hunter2".to_string()),
        }
    }

    #[test]
    fn test_connect_is_interactive() {
        let inv = connect("postgres:11.1-alpine", &creds(), 54321);
        assert!(inv.tty);
        assert!(inv.args.contains(&"--port=54321".to_string()));
        assert!(inv.args.contains(&"--username=postgres".to_string()));
        assert_eq!(
            inv.env,
            vec![("PGPASSWORD".to_string(), "hunter2".to_string())]
        );
    }

    #[test]
    fn test_apply_command() {
        let inv = apply_command("postgres:11.1-alpine", &creds(), 54321, "app", "SELECT 1");
        assert!(!inv.tty);
        assert!(inv.args.contains(&"--dbname=app".to_string()));
        assert!(inv.args.contains(&"--command=SELECT 1".to_string()));
    }

    #[test]
    fn test_username_falls_back_to_postgres() {
        let inv = connect("postgres:11.1-alpine", &Credentials::default(), 54321);
        assert!(inv.args.contains(&"--username=postgres".to_string()));
        assert!(inv.env.is_empty());
    }
}
