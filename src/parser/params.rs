use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use log::info;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

/// Network magic of the Crown main network.
pub const MAINNET_MAGIC: u32 = 0xb8eb_b3df;
/// Network magic of the Crown test network.
pub const TESTNET_MAGIC: u32 = 0x0f18_0e06;

///
/// Network constants needed to decode blocks and render addresses.
///
/// Crown uses multi-byte address prefixes, which is why these are
/// byte slices rather than single version bytes.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub name: &'static str,
    pub net: u32,
    pub pubkey_hash_addr_id: &'static [u8],
    pub script_hash_addr_id: &'static [u8],
}

pub static MAIN_NET_PARAMS: ChainParams = ChainParams {
    name: "mainnet",
    net: MAINNET_MAGIC,
    pubkey_hash_addr_id: &[0x01, 0x75, 0x07],
    script_hash_addr_id: &[0x01, 0x74, 0xF1],
};

pub static TEST_NET_PARAMS: ChainParams = ChainParams {
    name: "testnet3",
    net: TESTNET_MAGIC,
    pubkey_hash_addr_id: &[0x01, 0x7A, 0xCD, 0x67],
    script_hash_addr_id: &[0x01, 0x7A, 0xCD, 0x51],
};

static GLOBAL_REGISTRY: Lazy<ParamsRegistry> = Lazy::new(ParamsRegistry::new);

///
/// Table of chain parameters keyed by network magic.
///
/// Several chain backends may share one process, each registering its
/// own networks. A magic can only belong to one parameter set.
///
#[derive(Debug, Default)]
pub struct ParamsRegistry {
    nets: Mutex<HashMap<u32, ChainParams>>,
}

impl ParamsRegistry {
    pub fn new() -> ParamsRegistry {
        ParamsRegistry {
            nets: Mutex::new(HashMap::new()),
        }
    }

    /// the process-wide registry
    pub fn global() -> &'static ParamsRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register one parameter set. Fails if its magic is already taken.
    pub fn register(&self, params: &ChainParams) -> OpResult<()> {
        let mut nets = self.lock()?;
        if let Some(existing) = nets.get(&params.net) {
            return Err(conflict(params, existing));
        }
        nets.insert(params.net, *params);
        Ok(())
    }

    ///
    /// Register a family of parameter sets under a single lock.
    ///
    /// Returns `Ok(false)` when all of them are already registered,
    /// `Ok(true)` when they were inserted by this call.
    /// A magic owned by different parameters is a `ParamsConflict`.
    ///
    pub fn register_once(&self, sets: &[&ChainParams]) -> OpResult<bool> {
        let mut nets = self.lock()?;
        let mut missing = Vec::with_capacity(sets.len());
        for params in sets {
            match nets.get(&params.net) {
                Some(existing) if existing == *params => {}
                Some(existing) => return Err(conflict(params, existing)),
                None => missing.push(**params),
            }
        }
        if missing.is_empty() {
            return Ok(false);
        }
        for params in missing {
            nets.insert(params.net, params);
        }
        Ok(true)
    }

    pub fn is_registered(&self, params: &ChainParams) -> bool {
        match self.nets.lock() {
            Ok(nets) => nets.contains_key(&params.net),
            Err(_) => false,
        }
    }

    pub fn get(&self, net: u32) -> Option<ChainParams> {
        self.nets.lock().ok()?.get(&net).copied()
    }

    pub fn len(&self) -> usize {
        self.nets.lock().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> OpResult<std::sync::MutexGuard<'_, HashMap<u32, ChainParams>>> {
        self.nets
            .lock()
            .map_err(|_| OpError::from("chain params registry poisoned"))
    }
}

fn conflict(params: &ChainParams, existing: &ChainParams) -> OpError {
    OpError::new(OpErrorKind::ParamsConflict).join_msg(&format!(
        "magic {:#010x} of {} already registered by {}",
        params.net, params.name, existing.name
    ))
}

///
/// Register Crown mainnet and testnet parameters.
///
/// Idempotent: concurrent and repeated calls observe "already registered"
/// and return `Ok`. A conflict with another chain is returned as
/// `ParamsConflict` and must abort startup.
///
pub fn register_params(registry: &ParamsRegistry) -> OpResult<()> {
    if registry.register_once(&[&MAIN_NET_PARAMS, &TEST_NET_PARAMS])? {
        info!(
            "registered chain params {} and {}",
            MAIN_NET_PARAMS.name, TEST_NET_PARAMS.name
        );
    }
    Ok(())
}

/// `"test"` selects the test network, anything else the main network.
pub fn select_params(chain: &str) -> &'static ChainParams {
    match chain {
        "test" => &TEST_NET_PARAMS,
        _ => &MAIN_NET_PARAMS,
    }
}

/// Ensure registration, then select by the chain name reported by the node.
pub fn chain_params(registry: &ParamsRegistry, chain: &str) -> OpResult<&'static ChainParams> {
    register_params(registry)?;
    Ok(select_params(chain))
}
