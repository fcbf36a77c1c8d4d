use k8s_openapi::api::core::v1::{Pod, Secret};
use kube::Api;
use kube::config::KubeConfigOptions;

use crate::{Error, Result};

/// Kubernetes client wrapper
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    /// Create a client for the current context, or a named one.
    ///
    /// Without a context name the config is inferred the usual way
    /// (in-cluster env first, then the default kubeconfig).
    pub async fn new(context: Option<&str>) -> Result<Self> {
        let config = match context {
            Some(name) => {
                kube::Config::from_kubeconfig(&KubeConfigOptions {
                    context: Some(name.to_string()),
                    ..Default::default()
                })
                .await?
            }
            None => kube::Config::infer().await?,
        };

        let client = kube::Client::try_from(config)?;
        Ok(Self { client })
    }

    /// Raw kube client, for the tunnel
    pub fn inner(&self) -> &kube::Client {
        &self.client
    }

    /// Fetch a pod by name, mapping NotFound to a named error
    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        match pods.get(name).await {
            Ok(pod) => Ok(pod),
            Err(kube::Error::Api(err)) if err.code == 404 => Err(Error::PodNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a secret by name, mapping NotFound to a named error
    pub async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match secrets.get(name).await {
            Ok(secret) => Ok(secret),
            Err(kube::Error::Api(err)) if err.code == 404 => Err(Error::SecretNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

/// Phase reported by the pod's status, if any
pub fn pod_phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref()?.phase.as_deref()
}
