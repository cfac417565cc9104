//! Bearer credential sources.
//!
//! The credential is handed to [`ApiClient`](crate::client::ApiClient) at
//! construction. It is resolved again for every request, so a token file
//! rewritten by a login flow takes effect on the next call.

use std::path::PathBuf;

use secrecy::SecretString;
use tracing::warn;

/// Where the client reads its bearer token from.
#[derive(Clone, Default)]
pub enum CredentialSource {
    /// Send requests without an `Authorization` header.
    #[default]
    None,
    /// A fixed token.
    Static(SecretString),
    /// A token persisted in a file.
    ///
    /// A missing or blank file means no token.
    File(PathBuf),
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Static(_) => f.debug_tuple("Static").field(&"[REDACTED]").finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl CredentialSource {
    /// Resolve the current token, if any.
    ///
    /// Read failures other than a missing file are logged and treated as no
    /// token; the backend then answers with an authorization error.
    pub async fn resolve(&self) -> Option<SecretString> {
        match self {
            Self::None => None,
            Self::Static(token) => Some(token.clone()),
            Self::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(contents) => {
                    let token = contents.trim();
                    (!token.is_empty()).then(|| SecretString::from(token.to_string()))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read token file");
                    None
                }
            },
        }
    }
}
