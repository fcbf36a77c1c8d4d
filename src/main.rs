use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use dbctl_engines::ClientInvocation;
use dbctl_k8s::{KubeClient, Tunnel, decode_credentials, pod_phase};
use dbctl_types::{AuthScheme, Credentials, DbTarget, Engine};

mod config;
use config::AppConfig;

/// dbctl - connect to and operate operator-managed database pods
#[derive(Parser, Debug)]
#[command(name = "dbctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kubeconfig context to use (defaults to the current context)
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: EngineCommand,
}

#[derive(Subcommand, Debug)]
enum EngineCommand {
    /// Operate postgres objects
    Postgres {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate mysql objects
    Mysql {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate mongodb objects
    Mongodb {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate redis objects
    Redis {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate elasticsearch objects
    Elasticsearch {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate memcached objects
    Memcached {
        #[command(subcommand)]
        action: Action,
    },
}

impl EngineCommand {
    fn into_parts(self) -> (Engine, Action) {
        match self {
            Self::Postgres { action } => (Engine::Postgres, action),
            Self::Mysql { action } => (Engine::MySql, action),
            Self::Mongodb { action } => (Engine::MongoDb, action),
            Self::Redis { action } => (Engine::Redis, action),
            Self::Elasticsearch { action } => (Engine::Elasticsearch, action),
            Self::Memcached { action } => (Engine::Memcached, action),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Open an interactive client session against the object's primary pod
    Connect(ConnectArgs),
    /// Apply commands from a file or the command line to the primary pod
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Name of the database object
    #[arg(value_name = "NAME")]
    name: String,

    /// Namespace of the object
    #[arg(short = 'n', long)]
    namespace: Option<String>,

    /// Name of a user-created secret holding the object's credentials
    #[arg(long = "customsecret", value_name = "SECRET")]
    custom_secret: Option<String>,

    /// Username to connect as, overriding the secret
    #[arg(short = 'u', long)]
    username: Option<String>,
}

#[derive(Args, Debug)]
struct ConnectArgs {
    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Path to a file of commands to execute
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Command text to execute
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Logical database to run against
    #[arg(short = 'd', long)]
    dbname: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let (engine, action) = cli.command.into_parts();

    let (target_args, apply) = match &action {
        Action::Connect(args) => (&args.target, None),
        Action::Apply(args) => (&args.target, Some(args)),
    };

    if let Some(apply) = apply {
        if apply.file.is_none() && apply.command.is_none() {
            anyhow::bail!("use --file or --command to apply commands to a {engine} object");
        }
    }

    let namespace = target_args
        .namespace
        .clone()
        .or_else(|| config.namespace.clone())
        .unwrap_or_else(|| {
            warn!("no namespace given, using \"default\"; pick one with -n <namespace>");
            "default".to_string()
        });

    let target = DbTarget::new(&target_args.name, &namespace);
    let pod_name = target.pod_name();

    let kube = KubeClient::new(cli.context.as_deref()).await?;

    let pod = kube.get_pod(&namespace, &pod_name).await?;
    match pod_phase(&pod) {
        Some("Running") => {}
        phase => warn!(
            "pod {} is not running (phase: {})",
            pod_name,
            phase.unwrap_or("unknown")
        ),
    }

    let mut creds = match engine.auth_scheme() {
        AuthScheme::None => Credentials::default(),
        scheme => {
            let secret_name = target.secret_name(target_args.custom_secret.as_deref());
            let secret = kube.get_secret(&namespace, &secret_name).await?;
            decode_credentials(&secret, scheme)?
        }
    };
    if let Some(username) = &target_args.username {
        creds.username = Some(username.clone());
    }

    let pod_port = engine.default_port();
    let mut tunnel = Tunnel::open(kube.inner().clone(), &namespace, &pod_name, pod_port).await?;
    info!(
        "forwarding 127.0.0.1:{} to {}/{} port {}",
        tunnel.local_port(),
        namespace,
        pod_name,
        pod_port
    );

    let image = config.image_for(engine);
    let invocations = build_invocations(engine, &action, &image, &creds, tunnel.local_port())?;

    let mut result = Ok(());
    for invocation in invocations {
        result = invocation.run(config.docker_bin()).await;
        if result.is_err() {
            break;
        }
    }

    tunnel.close();
    result
}

/// Client processes to run for the requested action, in order
fn build_invocations(
    engine: Engine,
    action: &Action,
    image: &str,
    creds: &Credentials,
    local_port: u16,
) -> Result<Vec<ClientInvocation>> {
    use dbctl_engines::{elasticsearch, memcached, mongodb, mysql, postgres, redis};

    let mut invocations = Vec::new();
    match action {
        Action::Connect(_) => {
            invocations.push(match engine {
                Engine::Postgres => postgres::connect(image, creds, local_port),
                Engine::MySql => mysql::connect(image, creds, local_port),
                Engine::MongoDb => mongodb::connect(image, creds, local_port),
                Engine::Redis => redis::connect(image, creds, local_port),
                Engine::Elasticsearch => elasticsearch::connect(image, creds, local_port),
                Engine::Memcached => memcached::connect(image, local_port),
            });
        }
        Action::Apply(args) => {
            let dbname = args.dbname.as_deref();

            if let Some(command) = &args.command {
                info!("applying command to {}", engine);
                invocations.push(match engine {
                    Engine::Postgres => postgres::apply_command(
                        image,
                        creds,
                        local_port,
                        dbname.unwrap_or("postgres"),
                        command,
                    ),
                    Engine::MySql => mysql::apply_command(
                        image,
                        creds,
                        local_port,
                        dbname.unwrap_or("mysql"),
                        command,
                    ),
                    Engine::MongoDb => {
                        mongodb::apply_command(image, creds, local_port, dbname, command)
                    }
                    Engine::Redis => redis::apply_command(image, creds, local_port, command),
                    Engine::Elasticsearch => {
                        elasticsearch::apply_command(image, creds, local_port, command)
                    }
                    Engine::Memcached => memcached::apply_command(image, local_port, command),
                });
            }

            if let Some(file) = &args.file {
                info!("applying {} to {}", file.display(), engine);
                invocations.push(match engine {
                    Engine::Postgres => postgres::apply_file(
                        image,
                        creds,
                        local_port,
                        dbname.unwrap_or("postgres"),
                        file,
                    )?,
                    Engine::MySql => mysql::apply_file(
                        image,
                        creds,
                        local_port,
                        dbname.unwrap_or("mysql"),
                        file,
                    )?,
                    Engine::MongoDb => mongodb::apply_file(image, creds, local_port, dbname, file)?,
                    Engine::Redis => redis::apply_file(image, creds, local_port, file)?,
                    Engine::Elasticsearch => {
                        elasticsearch::apply_file(image, creds, local_port, file)?
                    }
                    Engine::Memcached => memcached::apply_file(image, local_port, file)?,
                });
            }
        }
    }
    Ok(invocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_connect() {
        let cli = Cli::try_parse_from([
            "dbctl",
            "postgres",
            "connect",
            "quick-postgres",
            "-n",
            "demo",
        ])
        .unwrap();
        let (engine, action) = cli.command.into_parts();
        assert_eq!(engine, Engine::Postgres);
        match action {
            Action::Connect(args) => {
                assert_eq!(args.target.name, "quick-postgres");
                assert_eq!(args.target.namespace.as_deref(), Some("demo"));
            }
            Action::Apply(_) => panic!("expected connect"),
        }
    }

    #[test]
    fn test_parse_apply_flags() {
        let cli = Cli::try_parse_from([
            "dbctl",
            "mysql",
            "apply",
            "quick-mysql",
            "-c",
            "SHOW TABLES",
            "-d",
            "app",
            "--customsecret",
            "my-secret",
        ])
        .unwrap();
        let (engine, action) = cli.command.into_parts();
        assert_eq!(engine, Engine::MySql);
        match action {
            Action::Apply(args) => {
                assert_eq!(args.command.as_deref(), Some("SHOW TABLES"));
                assert_eq!(args.dbname.as_deref(), Some("app"));
                assert_eq!(args.target.custom_secret.as_deref(), Some("my-secret"));
                assert_eq!(args.file, None);
            }
            Action::Connect(_) => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_global_context() {
        let cli = Cli::try_parse_from([
            "dbctl",
            "redis",
            "connect",
            "quick-redis",
            "--context",
            "staging",
        ])
        .unwrap();
        assert_eq!(cli.context.as_deref(), Some("staging"));
    }

    #[test]
    fn test_apply_runs_command_before_file() {
        let action = Action::Apply(ApplyArgs {
            target: TargetArgs {
                name: "quick-memcached".to_string(),
                namespace: None,
                custom_secret: None,
                username: None,
            },
            // memcached apply_file only canonicalizes, so any existing path works
            file: Some(PathBuf::from("/")),
            command: Some("stats".to_string()),
            dbname: None,
        });
        let invocations = build_invocations(
            Engine::Memcached,
            &action,
            "busybox:1.36",
            &Credentials::default(),
            11212,
        )
        .unwrap();
        assert_eq!(invocations.len(), 2);
        assert_eq!(
            invocations[0].stdin,
            dbctl_engines::StdinSource::Text("stats".to_string())
        );
    }
}
