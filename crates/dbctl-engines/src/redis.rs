//! redis-cli wiring for redis objects

use std::path::Path;

use anyhow::Result;
use dbctl_types::Credentials;

use crate::docker::{ClientInvocation, StdinSource};

fn base(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    let mut inv = ClientInvocation::new(image)
        .arg("redis-cli")
        .arg("-h")
        .arg("127.0.0.1")
        .arg("-p")
        .arg(local_port.to_string());
    if let Some(password) = &creds.password {
        inv = inv.arg("-a").arg(password);
    }
    inv
}

/// Interactive redis-cli session over the tunnel
pub fn connect(image: &str, creds: &Credentials, local_port: u16) -> ClientInvocation {
    base(image, creds, local_port).tty(true)
}

/// Run a single command, split into redis-cli arguments
pub fn apply_command(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    command: &str,
) -> ClientInvocation {
    let mut inv = base(image, creds, local_port);
    for word in command.split_whitespace() {
        inv = inv.arg(word);
    }
    inv
}

/// Pipe a file of commands to redis-cli on stdin
pub fn apply_file(
    image: &str,
    creds: &Credentials,
    local_port: u16,
    file: &Path,
) -> Result<ClientInvocation> {
    let file = crate::docker::absolute(file)?;
    Ok(base(image, creds, local_port).stdin(StdinSource::File(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_with_password() {
        let creds = Credentials {
            username: None,
            password: Some("hunter2".to_string()),
        };
        let inv = connect("redis:6.2-alpine", &creds, 63791);
        let args = inv.args.join(" ");
        assert!(args.contains("-a hunter2"));
        assert!(inv.tty);
    }

    #[test]
    fn test_apply_command_splits_words() {
        let inv = apply_command(
            "redis:6.2-alpine",
            &Credentials::default(),
            63791,
            "SET greeting hello",
        );
        let n = inv.args.len();
        assert_eq!(inv.args[n - 3..], ["SET", "greeting", "hello"]);
    }
}
