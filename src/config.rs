// Network parameters and node configuration.
//
// Compile-time defaults with BASTILLE_* environment overrides; there is no
// config-file layer.

use std::path::PathBuf;

use crate::consensus::pow::MaxTarget;

/// Standard protocol port
pub const P2P_PORT: u16 = 17_890;

/// Maximum number of peers to connect to
pub const MAX_PEERS: usize = 12;

/// Maximum wire frame size (2 MB)
pub const MAX_FRAME_BYTES: usize = 2 * 1024 * 1024;

/// Bind address for P2P — set BASTILLE_P2P_BIND=127.0.0.1 to disable
/// external connections.
pub const P2P_BIND_ADDRESS_DEFAULT: &str = "0.0.0.0";

pub const PROTOCOL_VERSION: u32 = 1;
pub const USER_AGENT: &str = concat!("/bastille:", env!("CARGO_PKG_VERSION"), "/");

/// Data directory name
pub const DATA_DIR: &str = ".bastille";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Address prefix; every account address starts with it.
    pub fn prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "1789",
            Network::Testnet => "f789",
        }
    }

    /// Handshake magic; networks never interconnect.
    pub fn magic(self) -> &'static [u8] {
        match self {
            Network::Mainnet => b"BASTILLE_MAIN_1789",
            Network::Testnet => b"BASTILLE_TEST_F789",
        }
    }

    /// Coinbase maturity window in blocks.
    pub fn maturity_window(self) -> u64 {
        match self {
            Network::Mainnet => 89,
            Network::Testnet => 5,
        }
    }

    pub fn max_target(self) -> MaxTarget {
        match self {
            Network::Mainnet => MaxTarget::Production,
            Network::Testnet => MaxTarget::Testing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub p2p_port: u16,
    pub p2p_bind: String,
    pub data_dir: PathBuf,
    pub bootstrap_peers: Vec<String>,
    pub max_peers: usize,
    pub max_frame_bytes: usize,
    pub handshake_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub ping_interval_ms: u64,
    pub pong_timeout_ms: u64,
    pub maintenance_interval_ms: u64,

    pub target_block_time_ms: u64,
    pub retarget_window: u64,
    pub maturity_window: u64,

    pub fee_per_byte: u64,
    pub min_fee: u64,
    pub max_mempool_size: usize,
    pub mempool_tx_ttl_ms: u64,
    pub mempool_cleanup_interval_ms: u64,

    pub max_orphans: usize,
    pub max_orphan_age_ms: u64,

    /// Fraction of collected fees withheld from the coinbase. Reserved
    /// knob; the protocol currently burns nothing.
    pub burn_fraction: f64,
    pub mining_enabled: bool,
    pub miner_tx_cap: usize,
}

impl Config {
    pub fn for_network(network: Network) -> Self {
        Config {
            network,
            p2p_port: P2P_PORT,
            p2p_bind: p2p_bind_address(),
            data_dir: default_data_dir(network),
            bootstrap_peers: Vec::new(),
            max_peers: MAX_PEERS,
            max_frame_bytes: MAX_FRAME_BYTES,
            handshake_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            ping_interval_ms: 30_000,
            pong_timeout_ms: 60_000,
            maintenance_interval_ms: 30_000,
            target_block_time_ms: 10_000,
            retarget_window: 10,
            maturity_window: network.maturity_window(),
            fee_per_byte: crate::primitives::transaction::DEFAULT_FEE_PER_BYTE,
            min_fee: crate::primitives::transaction::DEFAULT_MIN_FEE,
            max_mempool_size: 5000,
            mempool_tx_ttl_ms: 24 * 60 * 60 * 1000,
            mempool_cleanup_interval_ms: 60_000,
            max_orphans: 100,
            max_orphan_age_ms: 600_000,
            burn_fraction: 0.0,
            mining_enabled: false,
            miner_tx_cap: 100,
        }
    }

    pub fn mainnet() -> Self {
        Self::for_network(Network::Mainnet)
    }

    pub fn testnet() -> Self {
        Self::for_network(Network::Testnet)
    }

    /// Defaults plus environment overrides, for the daemon.
    pub fn from_env() -> Self {
        let network = match std::env::var("BASTILLE_NETWORK").as_deref() {
            Ok("testnet") => Network::Testnet,
            _ => Network::Mainnet,
        };
        let mut config = Self::for_network(network);
        if let Ok(p) = std::env::var("BASTILLE_P2P_PORT")
            && let Ok(port) = p.parse()
        {
            config.p2p_port = port;
        }
        if let Ok(dir) = std::env::var("BASTILLE_DATA_DIR")
            && !dir.trim().is_empty()
        {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(peers) = std::env::var("BASTILLE_BOOTSTRAP") {
            config.bootstrap_peers = peers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(v) = std::env::var("BASTILLE_MINE") {
            config.mining_enabled = matches!(v.as_str(), "1" | "true" | "yes");
        }
        config
    }

    pub fn prefix(&self) -> &'static str {
        self.network.prefix()
    }

    pub fn magic(&self) -> &'static [u8] {
        self.network.magic()
    }
}

pub fn p2p_bind_address() -> String {
    let v = std::env::var("BASTILLE_P2P_BIND").unwrap_or_else(|_| P2P_BIND_ADDRESS_DEFAULT.into());
    if v.trim().is_empty() { P2P_BIND_ADDRESS_DEFAULT.into() } else { v }
}

pub fn default_data_dir(network: Network) -> PathBuf {
    PathBuf::from(resolve_home_dir()).join(DATA_DIR).join(network.name())
}

fn resolve_home_dir() -> String {
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return home;
    }
    #[cfg(windows)]
    {
        if let Ok(home) = std::env::var("USERPROFILE") {
            if !home.trim().is_empty() {
                return home;
            }
        }
    }
    ".".to_string()
}
