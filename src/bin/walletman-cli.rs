use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use anyhow::bail;
use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;
use walletman::config_models::cli_args::Args;
use walletman::config_models::cli_args::Command;
use walletman::config_models::cli_args::PASSPHRASE_ENV_VAR;
use walletman::config_models::kdf_configuration::KdfConfiguration;
use walletman::models::passphrase_policy::GUIDANCE;
use walletman::EncryptedBlob;
use walletman::KeyHandle;
use walletman::PassphrasePolicy;
use walletman::Secp256k1Provider;
use walletman::SeedPhrase;
use walletman::Signature;
use walletman::SignerAddress;
use walletman::TransactionRequest;
use walletman::WalletManager;
use zeroize::Zeroizing;

/// number of words asked for when importing a seed phrase
const SEED_PHRASE_WORD_COUNT: usize = 12;

type Manager = WalletManager<Secp256k1Provider>;

pub fn main() -> Result<()> {
    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    tokio_runtime.block_on(async {
        let args = Args::parse();
        set_up_logger()?;

        let kdf = KdfConfiguration::default().absorb_options(&args);
        kdf.validate()?;
        let manager = WalletManager::new(Secp256k1Provider::new(kdf));

        run(&manager, &args).await
    })
}

fn set_up_logger() -> Result<()> {
    // Set up logger.
    // Configure logger to use ISO-8601, of which rfc3339 is a subset.
    // install global collector configured based on RUST_LOG env var.
    // Accepted `RUST_LOG` values are `trace`, `debug`, `info`, `warn`,
    // and `error`.
    let info_env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_timer(UtcTime::rfc_3339())
        .with_env_filter(info_env_filter)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

async fn run(manager: &Manager, args: &Args) -> Result<()> {
    match &args.command {
        Command::Generate { out } => {
            ensure_absent(out)?;
            let passphrase = read_passphrase(args)?;

            let handle = manager.generate().await?;
            let blob = manager.encrypt_wallet(&handle, &passphrase).await?;
            save_wallet(out, &blob)?;

            println!("New wallet generated.");
            println!("Wallet stored in: {}", out.display());
            println!("Address: {}", handle.address());
            println!();
            println!("Write down the seed phrase below. It restores the wallet if the file or its passphrase is lost.");
            if let Some(phrase) = handle.seed_phrase() {
                print_seed_phrase_dialog(phrase);
            }
        }
        Command::ImportSeedPhrase { out } => {
            ensure_absent(out)?;
            let passphrase = read_passphrase(args)?;

            println!("Importing seed phrase. Please enter words:");
            let phrase = enter_seed_phrase_dialog()?;
            let handle = manager.import_seed_phrase(&phrase).await?;
            let blob = manager.encrypt_wallet(&handle, &passphrase).await?;

            println!("Saving wallet to disk at {} ...", out.display());
            save_wallet(out, &blob)?;
            println!("Success.");
            println!("Address: {}", handle.address());
        }
        Command::Show { wallet } => {
            let handle = open_wallet(manager, args, wallet).await?;
            print!("{}", show_report(&handle));
        }
        Command::ExportSeedPhrase { wallet } => {
            let handle = open_wallet(manager, args, wallet).await?;
            let Some(phrase) = handle.seed_phrase() else {
                bail!(
                    "Wallet {} was saved without a seed phrase; there is nothing to export.",
                    wallet.display()
                );
            };
            println!("Seed phrase for {}.", handle.address());
            println!("Read from file `{}`.", wallet.display());
            print_seed_phrase_dialog(phrase);
        }
        Command::SignMessage { wallet, message } => {
            let handle = open_wallet(manager, args, wallet).await?;
            let signature = manager.sign_message(&handle, message).await?;
            println!("{signature}");
        }
        Command::SignTransaction { wallet, tx } => {
            let json = fs::read_to_string(tx)
                .with_context(|| format!("Failed to read transaction file {}", tx.display()))?;
            let transaction: TransactionRequest = serde_json::from_str(&json)
                .with_context(|| format!("Could not parse transaction in {}", tx.display()))?;

            let handle = open_wallet(manager, args, wallet).await?;
            let signed = manager.sign_transaction(&handle, &transaction).await?;
            println!("{signed}");
        }
        Command::RecoverSigner { message, signature } => {
            let signature = Signature::new(signature.as_str());
            let address = manager.recover_signer(message, &signature).await?;
            println!("{address}");
        }
        Command::Verify {
            message,
            signature,
            address,
        } => {
            let signature = Signature::new(signature.as_str());
            let address = SignerAddress::new(address.as_str());
            if !manager.is_signer(message, &signature, &address).await? {
                bail!("{address} did not sign this message");
            }
            println!("{address} signed this message");
        }
        Command::PassphraseRules => {
            println!("A wallet passphrase must:");
            for description in PassphrasePolicy::descriptions() {
                println!(" - {description}");
            }
            println!();
            println!("{GUIDANCE}");
        }
    }

    Ok(())
}

/// the passphrase from `--passphrase-file`, or else from the environment
fn read_passphrase(args: &Args) -> Result<Zeroizing<String>> {
    let Some(path) = &args.passphrase_file else {
        return std::env::var(PASSPHRASE_ENV_VAR).map(Zeroizing::new).with_context(|| {
            format!("No passphrase given. Set {PASSPHRASE_ENV_VAR} or pass --passphrase-file.")
        });
    };

    let content = Zeroizing::new(
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read passphrase file {}", path.display()))?,
    );
    let passphrase = content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content.as_str());
    Ok(Zeroizing::new(passphrase.to_string()))
}

async fn open_wallet(manager: &Manager, args: &Args, wallet: &Path) -> Result<KeyHandle> {
    let blob = fs::read_to_string(wallet)
        .with_context(|| format!("Failed to read wallet file {}", wallet.display()))?;
    let passphrase = read_passphrase(args)?;

    Ok(manager
        .decrypt_wallet(&EncryptedBlob::new(blob), &passphrase)
        .await?)
}

fn ensure_absent(path: &Path) -> Result<()> {
    ensure!(
        !path.exists(),
        "Cannot write wallet; {} already exists. Move it to another location or choose another path.",
        path.display(),
    );
    Ok(())
}

#[cfg(unix)]
fn save_wallet(path: &Path, blob: &EncryptedBlob) -> Result<()> {
    // owner read/write only
    use std::os::unix::prelude::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("Could not create wallet file {}", path.display()))?;
    file.write_all(blob.as_str().as_bytes())
        .context("Failed to write wallet file to disk")
}

#[cfg(not(unix))]
fn save_wallet(path: &Path, blob: &EncryptedBlob) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("Could not create wallet file {}", path.display()))?;
    file.write_all(blob.as_str().as_bytes())
        .context("Failed to write wallet file to disk")
}

fn enter_seed_phrase_dialog() -> Result<SeedPhrase> {
    let wordlist = bip39::Language::English.wordlist();
    let mut phrase: Zeroizing<Vec<String>> = Zeroizing::new(vec![]);
    while phrase.len() < SEED_PHRASE_WORD_COUNT {
        print!("{}. ", phrase.len() + 1);
        io::stdout().flush()?;

        let mut buffer = Zeroizing::new(String::new());
        if io::stdin().read_line(&mut buffer)? == 0 {
            bail!(
                "Input ended after {} of {SEED_PHRASE_WORD_COUNT} words.",
                phrase.len()
            );
        }

        // several words on one line are accepted too
        for word in buffer.split_whitespace() {
            if wordlist.get_words_by_prefix("").contains(&word) {
                phrase.push(word.to_string());
            } else {
                println!("Did not recognize word \"{word}\"; please try again.");
                break;
            }
        }
    }
    phrase.truncate(SEED_PHRASE_WORD_COUNT);

    Ok(SeedPhrase::from_words(&phrase))
}

/// what `show` prints for an opened wallet
fn show_report(handle: &KeyHandle) -> String {
    format!(
        "Address: {}\nPublic key: {}\n",
        handle.address(),
        handle.public_key_hex()
    )
}

fn print_seed_phrase_dialog(phrase: &SeedPhrase) {
    for (i, word) in phrase.words().enumerate() {
        println!("{}. {word}", i + 1);
    }
}
