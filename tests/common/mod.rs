pub mod logging;

use walletman::config_models::kdf_configuration::KdfConfiguration;
use walletman::Secp256k1Provider;
use walletman::WalletManager;

pub const PASSPHRASE: &str = "Staple-Battery-Horse-42";

/// a manager whose keystores are cheap to open
pub fn light_manager() -> WalletManager<Secp256k1Provider> {
    WalletManager::new(Secp256k1Provider::new(KdfConfiguration::new(8, 1, 1)))
}
