//! Shared types for dbctl
//!
//! This crate contains data structures used across multiple dbctl crates.

use std::fmt;

// ============================================================================
// Engines
// ============================================================================

/// Database engines managed by the operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    Postgres,
    MySql,
    MongoDb,
    Redis,
    Elasticsearch,
    Memcached,
}

impl Engine {
    /// Name used in the CLI and as the image-override key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::MongoDb => "mongodb",
            Self::Redis => "redis",
            Self::Elasticsearch => "elasticsearch",
            Self::Memcached => "memcached",
        }
    }

    /// Port the database listens on inside its pod
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::MySql => 3306,
            Self::MongoDb => 27017,
            Self::Redis => 6379,
            Self::Elasticsearch => 9200,
            Self::Memcached => 11211,
        }
    }

    /// Image carrying the engine's client binary
    pub fn default_image(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres:11.1-alpine",
            Self::MySql => "mysql:8.0",
            Self::MongoDb => "mongo:4.2",
            Self::Redis => "redis:6.2-alpine",
            Self::Elasticsearch => "curlimages/curl:8.5.0",
            Self::Memcached => "busybox:1.36",
        }
    }

    /// How the operator stores this engine's credentials in the auth secret
    pub fn auth_scheme(&self) -> AuthScheme {
        match self {
            Self::Postgres => AuthScheme::UserPassword {
                user_key: "POSTGRES_USER",
                password_key: "POSTGRES_PASSWORD",
            },
            Self::MySql | Self::MongoDb => AuthScheme::UserPassword {
                user_key: "username",
                password_key: "password",
            },
            Self::Elasticsearch => AuthScheme::UserPassword {
                user_key: "ADMIN_USERNAME",
                password_key: "ADMIN_PASSWORD",
            },
            Self::Redis => AuthScheme::PasswordOnly {
                password_key: "password",
            },
            Self::Memcached => AuthScheme::None,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential layout inside an engine's auth secret
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    /// Separate username and password entries
    UserPassword {
        user_key: &'static str,
        password_key: &'static str,
    },
    /// Password entry only
    PasswordOnly { password_key: &'static str },
    /// No auth secret at all
    None,
}

// ============================================================================
// Targets
// ============================================================================

/// A database object managed by the operator
#[derive(Clone, Debug)]
pub struct DbTarget {
    pub name: String,
    pub namespace: String,
}

impl DbTarget {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// The operator runs the primary at ordinal 0 of the object's stateful set
    pub fn pod_name(&self) -> String {
        format!("{}-0", self.name)
    }

    /// Auth secret name, `<name>-auth` unless the user supplied their own
    pub fn secret_name(&self, custom: Option<&str>) -> String {
        match custom {
            Some(name) => name.to_string(),
            None => format!("{}-auth", self.name),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Credentials decoded from the auth secret
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Username with an engine-specific fallback
    pub fn username_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.username.as_deref().unwrap_or(default)
    }
}
