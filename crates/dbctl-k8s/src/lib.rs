//! Kubernetes access for dbctl
//!
//! This crate provides cluster access for resolving database pods and
//! auth secrets, and the local port-forward tunnel used to reach them.

mod client;
mod secret;
mod tunnel;

pub use client::{KubeClient, pod_phase};
pub use secret::{decode_credentials, secret_value};
pub use tunnel::Tunnel;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("failed to infer cluster config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("pod {name} does not exist in namespace {namespace}")]
    PodNotFound { name: String, namespace: String },

    #[error("secret {name} does not exist in namespace {namespace}")]
    SecretNotFound { name: String, namespace: String },

    #[error("secret {secret} has no data")]
    EmptySecret { secret: String },

    #[error("key {key:?} not found in secret {secret}")]
    MissingSecretKey { secret: String, key: String },

    #[error("key {key:?} in secret {secret} is not valid UTF-8")]
    InvalidSecretValue { secret: String, key: String },

    #[error("no port-forward stream for port {port}")]
    MissingForwardStream { port: u16 },

    #[error("tunnel i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
