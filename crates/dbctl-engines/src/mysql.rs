//! mysql client wiring for mysql objects

use std::path::Path;

use anyhow::Result;
use dbctl_types::Credentials;

use crate::docker::{ClientInvocation, absolute};

const SQL_MOUNT: &str = "/tmp/apply.sql";

fn base(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    let mut inv = ClientInvocation::new(image)
        .arg("mysql")
        .arg("--host=127.0.0.1")
        .arg(format!("--port={}", local_port))
        .arg(format!("--user={}", creds.username_or("root")));
    if let Some(password) = &creds.password {
        inv = inv.env("MYSQL_PWD", password);
    }
    inv
}

/// Interactive mysql session over the tunnel
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
        .arg(format!("--execute={}", command))
        .arg(dbname)
}

/// Execute a local SQL file
///
/// The file is mounted into the client container and sourced, so no
/// mysql binary is needed on the host.
pub fn apply_file(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    dbname: &str,
    file: &Path,
) -> Result<ClientInvocation> {
    let file = absolute(file)?;
    Ok(base(image, creds, local_port)
        .mount(file, SQL_MOUNT)
        .arg(format!("--execute=source {}", SQL_MOUNT))
        .arg(dbname))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_defaults_to_root() {
        let inv = connect("mysql:8.0", &Credentials::default(), 33061);
        assert!(inv.tty);
        assert!(inv.args.contains(&"--user=root".to_string()));
    }

    #[test]
    fn test_password_goes_through_env() {
        let creds = Credentials {
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };
        let inv = connect("mysql:8.0", &creds, 33061);
        assert_eq!(
            inv.env,
            vec![("MYSQL_PWD".to_string(), "hunter2".to_string())]
        );
        assert!(inv.args.contains(&"--user=admin".to_string()));
    }

    #[test]
    fn test_apply_command_targets_dbname() {
        let inv = apply_command(
            "mysql:8.0",
            &Credentials::default(),
            33061,
            "app",
            "SHOW TABLES",
        );
        assert_eq!(inv.args.last().map(String::as_str), Some("app"));
        assert!(inv.args.contains(&"--execute=SHOW TABLES".to_string()));
    }
}
