//! Query outcomes and reload failures.

use thiserror::Error;

use crate::store::LoadError;

/// Whitelist check failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationDenied {
    /// The address is in neither whitelist.
    #[error("{user} from {address} not in white list: address not whitelisted")]
    UnknownAddress { address: String, user: String },

    /// The address is known but this user is not trusted from it.
    #[error("{user} from {address} not in white list: user not allowed from address")]
    UserNotAllowed { address: String, user: String },
}

impl AuthorizationDenied {
    /// Short machine-friendly reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownAddress { .. } => "address not whitelisted",
            Self::UserNotAllowed { .. } => "user not allowed from address",
        }
    }
}

/// Password check failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationDenied {
    #[error("{user}: user not recognized")]
    UnknownUser { user: String },

    #[error("{user}: no password configured for user")]
    PasswordNotSet { user: String },

    #[error("{user}: no password supplied")]
    PasswordNotSupplied { user: String },

    #[error("{user}: password incorrect")]
    PasswordIncorrect { user: String },
}

impl AuthenticationDenied {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownUser { .. } => "user not recognized",
            Self::PasswordNotSet { .. } => "no password configured for user",
            Self::PasswordNotSupplied { .. } => "no password supplied",
            Self::PasswordIncorrect { .. } => "password incorrect",
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Self::UnknownUser { user }
            | Self::PasswordNotSet { user }
            | Self::PasswordNotSupplied { user }
            | Self::PasswordIncorrect { user } => user,
        }
    }
}

/// The configured digest algorithm cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("digest algorithm {0:?} unavailable")]
pub struct DigestUnavailable(pub String);

/// One or more datasets of a policy failed to reload.
///
/// The affected snapshots were left untouched.
#[derive(Debug, Error)]
#[error("Reload failed: {}", join_failures(.failures))]
pub struct ReloadError {
    pub failures: Vec<LoadError>,
}

fn join_failures(failures: &[LoadError]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<LoadError> for ReloadError {
    fn from(err: LoadError) -> Self {
        Self { failures: vec![err] }
    }
}

impl ReloadError {
    /// `Ok(())` when `failures` is empty.
    pub fn check(failures: Vec<LoadError>) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self { failures })
        }
    }
}
