//! Auth secret decoding

use dbctl_types::{AuthScheme, Credentials};
use k8s_openapi::api::core::v1::Secret;

use crate::{Error, Result};

/// Extract a key from a secret's data as a UTF-8 string
pub fn secret_value(secret: &Secret, key: &str) -> Result<String> {
    let secret_name = secret.metadata.name.clone().unwrap_or_default();

    let data = secret.data.as_ref().ok_or_else(|| Error::EmptySecret {
        secret: secret_name.clone(),
    })?;

    let value = data.get(key).ok_or_else(|| Error::MissingSecretKey {
        secret: secret_name.clone(),
        key: key.to_string(),
    })?;

    String::from_utf8(value.0.clone()).map_err(|_| Error::InvalidSecretValue {
        secret: secret_name,
        key: key.to_string(),
    })
}

/// Build credentials from a secret per the engine's auth scheme
pub fn decode_credentials(secret: &Secret, scheme: AuthScheme) -> Result<Credentials> {
    match scheme {
        AuthScheme::UserPassword {
            user_key,
            password_key,
        } => Ok(Credentials {
            username: Some(secret_value(secret, user_key)?),
            password: Some(secret_value(secret, password_key)?),
        }),
        AuthScheme::PasswordOnly { password_key } => Ok(Credentials {
            username: None,
            password: Some(secret_value(secret, password_key)?),
        }),
        AuthScheme::None => Ok(Credentials::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn secret_with(entries: &[(&str, &[u8])]) -> Secret {
        let mut data = BTreeMap::new();
        for (key, value) in entries {
            data.insert(key.to_string(), ByteString(value.to_vec()));
        }
        let mut secret = Secret::default();
        secret.metadata.name = Some("quick-postgres-auth".to_string());
        secret.data = Some(data);
        secret
    }

    #[test]
    fn test_secret_value() {
        let secret = secret_with(&[("POSTGRES_USER", b"postgres")]);
        assert_eq!(secret_value(&secret, "POSTGRES_USER").unwrap(), "postgres");
    }

    #[test]
    fn test_missing_key() {
        let secret = secret_with(&[("POSTGRES_USER", b"postgres")]);
        let err = secret_value(&secret, "POSTGRES_PASSWORD").unwrap_err();
        assert!(matches!(err, Error::MissingSecretKey { .. }));
    }

    #[test]
    fn test_invalid_utf8() {
        let secret = secret_with(&[("password", &[0xff, 0xfe])]);
        let err = secret_value(&secret, "password").unwrap_err();
        assert!(matches!(err, Error::InvalidSecretValue { .. }));
    }

    #[test]
    fn test_decode_user_password() {
        let secret = secret_with(&[("username", b"root"), ("password", b"hunter2")]);
        let creds = decode_credentials(
            &secret,
            AuthScheme::UserPassword {
                user_key: "username",
                password_key: "password",
            },
        )
        .unwrap();
        assert_eq!(creds.username.as_deref(), Some("root"));
        assert_eq!(creds.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_decode_password_only() {
        let secret = secret_with(&[("password", b"hunter2")]);
        let creds = decode_credentials(
            &secret,
            AuthScheme::PasswordOnly {
                password_key: "password",
            },
        )
        .unwrap();
        assert_eq!(creds.username, None);
        assert_eq!(creds.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_decode_authless() {
        let secret = secret_with(&[]);
        let creds = decode_credentials(&secret, AuthScheme::None).unwrap();
        assert_eq!(creds, Credentials::default());
    }
}
