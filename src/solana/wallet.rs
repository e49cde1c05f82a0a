use anyhow::{Result, Context};
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::fs::File;
use std::io::Read;
use bs58;

/// Holds the keypair that owns positions and pays for transactions
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load a wallet from a keypair file (JSON byte array or base58 string)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(&path)
            .with_context(|| format!("Failed to open keypair file at {:?}", path.as_ref()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read keypair file at {:?}", path.as_ref()))?;

        Self::from_bytes(&bytes)
            .with_context(|| format!("Failed to parse keypair file at {:?}", path.as_ref()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        // Try to deserialize as a JSON string containing byte array
        if let Ok(keypair_bytes) = serde_json::from_slice::<Vec<u8>>(bytes) {
            if keypair_bytes.len() == 64 {
                return Ok(Self::from_keypair(Keypair::from_bytes(&keypair_bytes)?));
            }
        }

        // Try to deserialize as a base58 encoded keypair
        let bytes_str = String::from_utf8_lossy(bytes).trim().to_string();
        if let Ok(keypair_bytes) = bs58::decode(&bytes_str).into_vec() {
            if keypair_bytes.len() == 64 {
                return Ok(Self::from_keypair(Keypair::from_bytes(&keypair_bytes)?));
            }
        }

        Err(anyhow::anyhow!("Expected 64 keypair bytes as a JSON array or base58 string"))
    }

    /// Get the public key of the wallet
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Get the underlying keypair
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}
