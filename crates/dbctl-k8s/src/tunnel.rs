//! Local port-forward tunnel
//!
//! Binds an ephemeral port on 127.0.0.1 and forwards every accepted TCP
//! connection to a port inside a cluster pod over the Kubernetes
//! port-forward API.

use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{Error, Result};

/// A forwarded local TCP port mapping to a port inside a cluster pod
pub struct Tunnel {
    local_port: u16,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Tunnel {
    /// Bind a local port and start forwarding connections to the pod
    pub async fn open(
        client: kube::Client,
        namespace: &str,
        pod_name: &str,
        pod_port: u16,
    ) -> Result<Self> {
        let pods: Api<Pod> = Api::namespaced(client, namespace);

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let local_port = listener.local_addr()?.port();

        let cancel = CancellationToken::new();
        let accept_cancel = cancel.clone();
        let pod_name = pod_name.to_string();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = accept_cancel.cancelled() => break,

                    accepted = listener.accept() => {
                        let (conn, peer) = match accepted {
                            Ok(conn) => conn,
                            Err(err) => {
                                warn!("tunnel accept failed: {}", err);
                                break;
                            }
                        };
                        debug!("forwarding {} to {}:{}", peer, pod_name, pod_port);

                        let pods = pods.clone();
                        let pod_name = pod_name.clone();
                        let conn_cancel = accept_cancel.clone();
                        tokio::spawn(async move {
                            tokio::select! {
                                _ = conn_cancel.cancelled() => {}
                                result = forward_connection(pods, &pod_name, pod_port, conn) => {
                                    if let Err(err) = result {
                                        warn!("connection to {}:{} dropped: {}", pod_name, pod_port, err);
                                    }
                                }
                            }
                        });
                    }
                }
            }
        });

        Ok(Self {
            local_port,
            cancel,
            task,
        })
    }

    /// Local port the tunnel listens on
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Stop accepting connections and tear down in-flight forwards
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for Tunnel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pipe one accepted connection through its own port-forward stream
async fn forward_connection(
    pods: Api<Pod>,
    pod_name: &str,
    port: u16,
    mut conn: TcpStream,
) -> Result<()> {
    let mut forwarder = pods.portforward(pod_name, &[port]).await?;
    let mut upstream = forwarder
        .take_stream(port)
        .ok_or(Error::MissingForwardStream { port })?;

    tokio::io::copy_bidirectional(&mut conn, &mut upstream).await?;

    drop(upstream);
    if let Err(err) = forwarder.join().await {
        debug!("port-forward for {}:{} ended with: {}", pod_name, port, err);
    }
    Ok(())
}
