//! telnet/nc wiring for memcached objects
//!
//! The operator deploys memcached without an auth secret, so no
//! credentials are involved.

use std::path::Path;

use anyhow::Result;

use crate::docker::{ClientInvocation, StdinSource, absolute};

/// Interactive telnet session against the memcached text protocol
pub fn connect(image: &str, local_port: u16) -> ClientInvocation {
    ClientInvocation::new(image)
        .arg("telnet")
        .arg("127.0.0.1")
        .arg(local_port.to_string())
        .tty(true)
}

fn nc(image: &str, local_port: u16) -> ClientInvocation {
    ClientInvocation::new(image)
        .arg("nc")
        .arg("127.0.0.1")
        .arg(local_port.to_string())
}

/// Pipe literal protocol text to the server
pub fn apply_command(image: &str, local_port: u16, command: &str) -> ClientInvocation {
    nc(image, local_port).stdin(StdinSource::Text(command.to_string()))
}

/// Pipe a file of protocol text to the server
pub fn apply_file(image: &str, local_port: u16, file: &Path) -> Result<ClientInvocation> {
    let file = absolute(file)?;
    Ok(nc(image, local_port).stdin(StdinSource::File(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_uses_telnet() {
        let inv = connect("busybox:1.36", 11212);
        assert_eq!(inv.args, ["telnet", "127.0.0.1", "11212"]);
        assert!(inv.tty);
    }

    #[test]
    fn test_apply_command_pipes_stdin() {
        let inv = apply_command("busybox:1.36", 11212, "stats");
        assert_eq!(inv.args, ["nc", "127.0.0.1", "11212"]);
        assert_eq!(inv.stdin, StdinSource::Text("stats".to_string()));
        assert!(!inv.tty);
    }
}
