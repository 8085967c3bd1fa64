//! provides error types related to wallet actions.

use serde::Deserialize;
use serde::Serialize;
use strum::Display;
use strum::EnumIter;

use crate::models::passphrase_policy::PassphraseRuleKind;
use crate::provider::ProviderError;

/// the wallet manager operation an error arose in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Generate,
    ImportSeedPhrase,
    EncryptWallet,
    DecryptWallet,
    SignMessage,
    RecoverSigner,
    IsSigner,
    SignTransaction,
}

/// Stable classification of a [`WalletError`].
///
/// Match on this rather than on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[non_exhaustive]
pub enum WalletErrorKind {
    InvalidPassphrase,
    EmptyEncryptedWallet,
    EmptyPassphrase,
    EmptyMessage,
    EmptySignature,
    EmptyCandidateSigner,
    EmptySeedPhrase,
    InvalidSeedPhrase,
    DecryptionFailed,
    SigningFailed,
    ProviderFailure,
}

/// enumerates possible wallet errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    #[error("{operation}: passphrase is too weak. {policy}")]
    InvalidPassphrase {
        operation: Operation,
        unmet: Vec<PassphraseRuleKind>,

        /// every rule of the policy, as shown to users
        policy: String,
    },

    #[error("{operation}: encrypted wallet is empty")]
    EmptyEncryptedWallet { operation: Operation },

    #[error("{operation}: passphrase is empty")]
    EmptyPassphrase { operation: Operation },

    #[error("{operation}: message is empty")]
    EmptyMessage { operation: Operation },

    #[error("{operation}: signature is empty")]
    EmptySignature { operation: Operation },

    #[error("{operation}: candidate signer is empty")]
    EmptyCandidateSigner { operation: Operation },

    #[error("{operation}: seed phrase is empty")]
    EmptySeedPhrase { operation: Operation },

    #[error("{operation}: seed phrase is invalid")]
    InvalidSeedPhrase {
        operation: Operation,
        #[source]
        source: ProviderError,
    },

    #[error("{operation}: wallet could not be decrypted")]
    DecryptionFailed {
        operation: Operation,
        #[source]
        source: ProviderError,
    },

    #[error("{operation}: signing failed")]
    SigningFailed {
        operation: Operation,
        #[source]
        source: ProviderError,
    },

    #[error("{operation}: identity provider failed")]
    ProviderFailure {
        operation: Operation,
        #[source]
        source: ProviderError,
    },
}

impl WalletError {
    pub fn kind(&self) -> WalletErrorKind {
        match self {
            Self::InvalidPassphrase { .. } => WalletErrorKind::InvalidPassphrase,
            Self::EmptyEncryptedWallet { .. } => WalletErrorKind::EmptyEncryptedWallet,
            Self::EmptyPassphrase { .. } => WalletErrorKind::EmptyPassphrase,
            Self::EmptyMessage { .. } => WalletErrorKind::EmptyMessage,
            Self::EmptySignature { .. } => WalletErrorKind::EmptySignature,
            Self::EmptyCandidateSigner { .. } => WalletErrorKind::EmptyCandidateSigner,
            Self::EmptySeedPhrase { .. } => WalletErrorKind::EmptySeedPhrase,
            Self::InvalidSeedPhrase { .. } => WalletErrorKind::InvalidSeedPhrase,
            Self::DecryptionFailed { .. } => WalletErrorKind::DecryptionFailed,
            Self::SigningFailed { .. } => WalletErrorKind::SigningFailed,
            Self::ProviderFailure { .. } => WalletErrorKind::ProviderFailure,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::InvalidPassphrase { operation, .. }
            | Self::EmptyEncryptedWallet { operation }
            | Self::EmptyPassphrase { operation }
            | Self::EmptyMessage { operation }
            | Self::EmptySignature { operation }
            | Self::EmptyCandidateSigner { operation }
            | Self::EmptySeedPhrase { operation }
            | Self::InvalidSeedPhrase { operation, .. }
            | Self::DecryptionFailed { operation, .. }
            | Self::SigningFailed { operation, .. }
            | Self::ProviderFailure { operation, .. } => *operation,
        }
    }

    /// the provider error this error wraps, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::InvalidSeedPhrase { source, .. }
            | Self::DecryptionFailed { source, .. }
            | Self::SigningFailed { source, .. }
            | Self::ProviderFailure { source, .. } => Some(source),
            _ => None,
        }
    }

    /// the passphrase rules that were not met. empty unless the kind is
    /// [`WalletErrorKind::InvalidPassphrase`].
    pub fn unmet_rules(&self) -> &[PassphraseRuleKind] {
        match self {
            Self::InvalidPassphrase { unmet, .. } => unmet,
            _ => &[],
        }
    }
}
