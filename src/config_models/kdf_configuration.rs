use anyhow::ensure;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use super::cli_args;

/// smallest memory cost, in KiB, argon2 accepts per lane
pub const MIN_M_COST_PER_LANE: u32 = 8;

/// 256 MiB
pub const MAX_M_COST: u32 = 256 * 1024;

pub const MAX_T_COST: u32 = 4;

pub const MAX_P_COST: u32 = 4;

/// Argon2id cost parameters used when a key is encrypted into a keystore.
///
/// Keystores record the parameters they were written with, so changing these
/// never affects decryption of existing keystores. Decryption does check the
/// recorded parameters against the same bounds as [`Self::validate`], so one
/// decryption costs at most [`MAX_M_COST`] KiB of memory and [`MAX_T_COST`]
/// passes over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfConfiguration {
    /// memory cost in KiB
    pub m_cost: u32,

    /// number of passes
    pub t_cost: u32,

    /// degree of parallelism
    pub p_cost: u32,
}

impl Default for KdfConfiguration {
    fn default() -> Self {
        Self {
            m_cost: 65_536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfConfiguration {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// Self-consuming constructor-helper for [`KdfConfiguration`].
    ///
    /// Overrides the defaults with whichever costs were given on the command
    /// line.
    pub fn absorb_options(mut self, cli_args: &cli_args::Args) -> Self {
        if let Some(m_cost) = cli_args.kdf_memory_kib {
            info!("KDF memory cost set to {m_cost} KiB by `--kdf-memory-kib`.");
            self.m_cost = m_cost;
        }
        if let Some(t_cost) = cli_args.kdf_iterations {
            self.t_cost = t_cost;
        }
        if let Some(p_cost) = cli_args.kdf_parallelism {
            self.p_cost = p_cost;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (1..=MAX_P_COST).contains(&self.p_cost),
            "KDF parallelism must be between 1 and {MAX_P_COST}, got {}",
            self.p_cost
        );
        ensure!(
            (1..=MAX_T_COST).contains(&self.t_cost),
            "KDF iterations must be between 1 and {MAX_T_COST}, got {}",
            self.t_cost
        );
        let min_m_cost = MIN_M_COST_PER_LANE * self.p_cost;
        ensure!(
            (min_m_cost..=MAX_M_COST).contains(&self.m_cost),
            "KDF memory cost must be between {min_m_cost} and {MAX_M_COST} KiB, got {}",
            self.m_cost
        );
        Ok(())
    }
}
