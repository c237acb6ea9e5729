//! HD 密钥树与随机密钥对生成
//!
//! 每种曲线一个实现：
//! - secp256k1: BIP32 (coins-bip32)
//! - ed25519: SLIP-0010，只支持硬化派生

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use hmac::{Hmac, Mac};
use k256::ecdsa::SigningKey as K256SigningKey;
use rand::rngs::OsRng;
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::domain::chain_config::CurveType;
use crate::domain::derivation_path::DerivationPath;
use crate::domain::mnemonic::Seed;
use crate::error::{KeygenError, KeygenResult};

type HmacSha512 = Hmac<Sha512>;

/// secp256k1 密钥对
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: K256SigningKey,
}

impl Secp256k1KeyPair {
    pub fn from_signing_key(signing_key: K256SigningKey) -> Self {
        Self { signing_key }
    }

    pub fn from_secret_bytes(bytes: &[u8]) -> KeygenResult<Self> {
        let signing_key = K256SigningKey::from_slice(bytes)
            .map_err(|e| KeygenError::Derivation(format!("Invalid secp256k1 key: {}", e)))?;
        Ok(Self { signing_key })
    }

    /// 32 字节私钥标量
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    /// 33 字节压缩公钥
    pub fn compressed_public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// 65 字节未压缩公钥 (0x04 || X || Y)
    pub fn uncompressed_public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

/// ed25519 密钥对
#[derive(Clone)]
pub struct Ed25519KeyPair {
    signing_key: Ed25519SigningKey,
}

impl Ed25519KeyPair {
    pub fn from_signing_key(signing_key: Ed25519SigningKey) -> Self {
        Self { signing_key }
    }

    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(Ed25519SigningKey::from_bytes(bytes))
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// secret (32) || public (32)
    pub fn keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }
}

/// 派生或随机生成得到的密钥对，用完即弃
#[derive(Clone)]
pub enum KeyPair {
    Secp256k1(Secp256k1KeyPair),
    Ed25519(Ed25519KeyPair),
}

impl KeyPair {
    pub fn curve_type(&self) -> CurveType {
        match self {
            KeyPair::Secp256k1(_) => CurveType::Secp256k1,
            KeyPair::Ed25519(_) => CurveType::Ed25519,
        }
    }

    /// 公钥字节：secp256k1 为压缩格式，ed25519 为 32 字节原始公钥
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            KeyPair::Secp256k1(kp) => kp.compressed_public_key(),
            KeyPair::Ed25519(kp) => kp.public_key().to_vec(),
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve_type())
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// HD 密钥树
///
/// 相同的 (seed, path) 必然得到相同的密钥对
pub trait HdKeyTree: Send + Sync {
    fn curve_type(&self) -> CurveType;

    fn derive_child(&self, seed: &Seed, path: &DerivationPath) -> KeygenResult<KeyPair>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// secp256k1 (BIP32)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Secp256k1Tree;

impl Secp256k1Tree {
    pub fn derive(&self, seed: &Seed, path: &DerivationPath) -> KeygenResult<Secp256k1KeyPair> {
        use coins_bip32::prelude::*;

        let derivation_path = path
            .to_string()
            .parse::<coins_bip32::path::DerivationPath>()
            .map_err(|e| KeygenError::Derivation(format!("Invalid derivation path: {}", e)))?;

        let master_key = XPriv::root_from_seed(seed.as_bytes(), None)
            .map_err(|e| KeygenError::Derivation(format!("Failed to derive master key: {}", e)))?;

        let derived_key = master_key
            .derive_path(&derivation_path)
            .map_err(|e| KeygenError::Derivation(format!("Failed to derive {}: {}", path, e)))?;

        // XPriv 实现 AsRef<SigningKey>
        let signing_key: &K256SigningKey = derived_key.as_ref();
        Ok(Secp256k1KeyPair::from_signing_key(signing_key.clone()))
    }

    pub fn random(&self) -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_signing_key(K256SigningKey::random(&mut OsRng))
    }
}

impl HdKeyTree for Secp256k1Tree {
    fn curve_type(&self) -> CurveType {
        CurveType::Secp256k1
    }

    fn derive_child(&self, seed: &Seed, path: &DerivationPath) -> KeygenResult<KeyPair> {
        self.derive(seed, path).map(KeyPair::Secp256k1)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ed25519 (SLIP-0010)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Ed25519Tree;

impl Ed25519Tree {
    /// SLIP-0010 master key seed constant
    const MASTER_SECRET: &'static [u8] = b"ed25519 seed";

    pub fn derive(&self, seed: &Seed, path: &DerivationPath) -> KeygenResult<Ed25519KeyPair> {
        let secret = Self::derive_secret(seed.as_bytes(), path)?;
        Ok(Ed25519KeyPair::from_secret_bytes(&secret))
    }

    pub fn random(&self) -> Ed25519KeyPair {
        Ed25519KeyPair::from_signing_key(Ed25519SigningKey::generate(&mut OsRng))
    }

    /// I = HMAC-SHA512(Key = "ed25519 seed", Data = seed)，
    /// 之后每层 I = HMAC-SHA512(Key = chain_code, Data = 0x00 || key || ser32(index))
    fn derive_secret(seed: &[u8], path: &DerivationPath) -> KeygenResult<Zeroizing<[u8; 32]>> {
        if !path.is_fully_hardened() {
            return Err(KeygenError::Derivation(format!(
                "SLIP-0010 ed25519 requires all levels to be hardened: {}",
                path
            )));
        }

        let (mut key, mut chain_code) = Self::hmac_split(Self::MASTER_SECRET, &[seed])?;

        for segment in path.segments() {
            let index = segment.to_u32().to_be_bytes();
            let (child_key, child_chain) =
                Self::hmac_split(&chain_code, &[&[0x00u8][..], &key[..], &index[..]])?;
            key.zeroize();
            chain_code.zeroize();
            key = child_key;
            chain_code = child_chain;
        }

        chain_code.zeroize();
        Ok(Zeroizing::new(key))
    }

    fn hmac_split(mac_key: &[u8], data: &[&[u8]]) -> KeygenResult<([u8; 32], [u8; 32])> {
        let mut mac = HmacSha512::new_from_slice(mac_key)
            .map_err(|e| KeygenError::Derivation(format!("HMAC init failed: {}", e)))?;
        for chunk in data {
            mac.update(chunk);
        }

        let mut buf = [0u8; 64];
        buf.copy_from_slice(&mac.finalize().into_bytes());

        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        left.copy_from_slice(&buf[..32]);
        right.copy_from_slice(&buf[32..]);
        buf.zeroize();

        Ok((left, right))
    }
}

impl HdKeyTree for Ed25519Tree {
    fn curve_type(&self) -> CurveType {
        CurveType::Ed25519
    }

    fn derive_child(&self, seed: &Seed, path: &DerivationPath) -> KeygenResult<KeyPair> {
        self.derive(seed, path).map(KeyPair::Ed25519)
    }
}

/// 按曲线选择密钥树
pub struct KeyTreeFactory;

impl KeyTreeFactory {
    pub fn create(curve_type: CurveType) -> Box<dyn HdKeyTree> {
        match curve_type {
            CurveType::Secp256k1 => Box::new(Secp256k1Tree),
            CurveType::Ed25519 => Box::new(Ed25519Tree),
        }
    }

    /// 不经派生路径的独立随机密钥对
    pub fn random_keypair(curve_type: CurveType) -> KeyPair {
        match curve_type {
            CurveType::Secp256k1 => KeyPair::Secp256k1(Secp256k1Tree.random()),
            CurveType::Ed25519 => KeyPair::Ed25519(Ed25519Tree.random()),
        }
    }
}
