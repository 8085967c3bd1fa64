use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

/// environment variable the passphrase is read from, unless
/// `--passphrase-file` is given
pub const PASSPHRASE_ENV_VAR: &str = "WALLETMAN_PASSPHRASE";

/// Decalarative specification of command-line arguments
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// Argon2id memory cost in KiB used when encrypting a wallet.
    ///
    /// Existing wallets remember the costs they were written with.
    #[clap(long, global = true)]
    pub kdf_memory_kib: Option<u32>,

    /// Argon2id number of passes used when encrypting a wallet.
    #[clap(long, global = true)]
    pub kdf_iterations: Option<u32>,

    /// Argon2id degree of parallelism used when encrypting a wallet.
    #[clap(long, global = true)]
    pub kdf_parallelism: Option<u32>,

    /// Read the wallet passphrase from this file instead of the
    /// `WALLETMAN_PASSPHRASE` environment variable.
    ///
    /// A single trailing newline is ignored.
    #[clap(long, global = true)]
    pub passphrase_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// generate a new key, save it encrypted and show its seed phrase
    Generate {
        /// where to write the encrypted wallet. must not exist.
        #[clap(long)]
        out: PathBuf,
    },

    /// import mnemonic seed phrase, read from standard input, and save the
    /// key encrypted
    ImportSeedPhrase {
        /// where to write the encrypted wallet. must not exist.
        #[clap(long)]
        out: PathBuf,
    },

    /// show address and public key of an encrypted wallet
    Show {
        #[clap(long)]
        wallet: PathBuf,
    },

    /// export mnemonic seed phrase of an encrypted wallet
    ExportSeedPhrase {
        #[clap(long)]
        wallet: PathBuf,
    },

    /// sign a message with the key of an encrypted wallet
    SignMessage {
        #[clap(long)]
        wallet: PathBuf,

        message: String,
    },

    /// sign a transaction given as a JSON file
    ///
    /// Prints the signed transaction, ready for broadcast, as `0x` hex.
    SignTransaction {
        #[clap(long)]
        wallet: PathBuf,

        /// JSON encoded transaction request
        #[clap(long)]
        tx: PathBuf,
    },

    /// print the address that signed a message
    RecoverSigner { message: String, signature: String },

    /// check whether a message was signed by an address
    Verify {
        message: String,
        signature: String,
        address: String,
    },

    /// print the rules a passphrase must satisfy
    PassphraseRules,
}
