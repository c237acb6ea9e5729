//! 多链配置模块
//!
//! 定义支持的区块链、各链的地址格式以及每种格式的派生路径模板

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::derivation_path::{ChildIndex, DerivationPath};
use crate::error::{KeygenError, KeygenResult};

/// 加密曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 曲线 (Bitcoin, Ethereum)
    Secp256k1,
    /// ed25519 曲线 (Solana)
    Ed25519,
}

/// HD 派生标准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivationStandard {
    /// BIP44: m/44'/coin_type'/account'/change/index
    BIP44,
    /// BIP49: m/49'/coin_type'/account'/change/index (P2SH-wrapped segwit)
    BIP49,
    /// BIP84: m/84'/coin_type'/account'/change/index (native segwit)
    BIP84,
    /// BIP86: m/86'/coin_type'/account'/change/index (taproot)
    BIP86,
    /// SLIP-0010: m/44'/coin_type'/account'/change'，全部硬化
    SLIP0010,
}

impl DerivationStandard {
    pub fn purpose(&self) -> u32 {
        match self {
            DerivationStandard::BIP44 | DerivationStandard::SLIP0010 => 44,
            DerivationStandard::BIP49 => 49,
            DerivationStandard::BIP84 => 84,
            DerivationStandard::BIP86 => 86,
        }
    }
}

/// 私钥序列化格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKeyEncoding {
    /// Wallet Import Format (主网、压缩公钥)
    Wif,
    /// 0x 前缀小写十六进制
    Hex,
    /// Base58(secret || public)，Solana 钱包约定
    Base58,
}

/// 支持的链
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Bitcoin,
    Ethereum,
    Solana,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::Bitcoin, Chain::Ethereum, Chain::Solana];

    pub fn config(&self) -> &'static ChainConfig {
        match self {
            Chain::Bitcoin => &BITCOIN,
            Chain::Ethereum => &ETHEREUM,
            Chain::Solana => &SOLANA,
        }
    }

    /// 链的全部地址格式，顺序即输出顺序
    pub fn formats(&self) -> &'static [AddressFormat] {
        self.config().formats
    }

    pub fn curve_type(&self) -> CurveType {
        self.config().curve_type
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config().name)
    }
}

impl FromStr for Chain {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(Chain::Bitcoin),
            "eth" | "ethereum" | "evm" => Ok(Chain::Ethereum),
            "sol" | "solana" => Ok(Chain::Solana),
            other => Err(KeygenError::UnsupportedChain(other.to_string())),
        }
    }
}

/// 地址编码格式（每条链至少一种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFormat {
    /// Legacy (P2PKH)，1 开头
    P2pkh,
    /// Nested SegWit (P2SH-P2WPKH)，3 开头
    P2shP2wpkh,
    /// Native SegWit (P2WPKH)，bc1q 开头
    P2wpkh,
    /// Taproot (P2TR)，bc1p 开头
    P2tr,
    /// Keccak256 地址，EIP-55 校验和
    Ethereum,
    /// Base58 公钥
    Solana,
}

impl AddressFormat {
    /// 输出文档中使用的键名
    pub fn key(&self) -> &'static str {
        match self {
            AddressFormat::P2pkh => "p2pkh",
            AddressFormat::P2shP2wpkh => "p2shP2wpkh",
            AddressFormat::P2wpkh => "p2wpkh",
            AddressFormat::P2tr => "p2tr",
            AddressFormat::Ethereum => "ethereum",
            AddressFormat::Solana => "solana",
        }
    }

    pub fn chain(&self) -> Chain {
        match self {
            AddressFormat::P2pkh
            | AddressFormat::P2shP2wpkh
            | AddressFormat::P2wpkh
            | AddressFormat::P2tr => Chain::Bitcoin,
            AddressFormat::Ethereum => Chain::Ethereum,
            AddressFormat::Solana => Chain::Solana,
        }
    }

    pub fn derivation_standard(&self) -> DerivationStandard {
        match self {
            AddressFormat::P2pkh | AddressFormat::Ethereum => DerivationStandard::BIP44,
            AddressFormat::P2shP2wpkh => DerivationStandard::BIP49,
            AddressFormat::P2wpkh => DerivationStandard::BIP84,
            AddressFormat::P2tr => DerivationStandard::BIP86,
            AddressFormat::Solana => DerivationStandard::SLIP0010,
        }
    }

    pub fn private_key_encoding(&self) -> PrivateKeyEncoding {
        match self.chain() {
            Chain::Bitcoin => PrivateKeyEncoding::Wif,
            Chain::Ethereum => PrivateKeyEncoding::Hex,
            Chain::Solana => PrivateKeyEncoding::Base58,
        }
    }

    /// 第 `index` 个地址的派生路径
    ///
    /// - BIP44/49/84/86: m/purpose'/coin'/0'/0/index
    /// - SLIP-0010 (Solana): m/44'/501'/index'/0'，循环变量落在账户层
    pub fn derivation_path(&self, index: u32) -> KeygenResult<DerivationPath> {
        let standard = self.derivation_standard();
        let coin_type = self.chain().config().coin_type;

        match standard {
            DerivationStandard::SLIP0010 => Ok(DerivationPath::new(vec![
                ChildIndex::hardened(standard.purpose())?,
                ChildIndex::hardened(coin_type)?,
                ChildIndex::hardened(index)?,
                ChildIndex::hardened(0)?,
            ])),
            _ => DerivationPath::bip44_style(standard.purpose(), coin_type, 0, 0, index),
        }
    }
}

impl fmt::Display for AddressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AddressFormat::P2pkh => "P2PKH",
            AddressFormat::P2shP2wpkh => "P2SH(P2WPKH)",
            AddressFormat::P2wpkh => "P2WPKH",
            AddressFormat::P2tr => "P2TR",
            AddressFormat::Ethereum => "EVM",
            AddressFormat::Solana => "SOL",
        };
        f.write_str(label)
    }
}

/// 链配置
#[derive(Debug)]
pub struct ChainConfig {
    pub chain: Chain,
    /// 链名称
    pub name: &'static str,
    /// 链符号 (BTC, ETH, SOL)
    pub symbol: &'static str,
    pub curve_type: CurveType,
    /// SLIP-44 coin type
    pub coin_type: u32,
    pub formats: &'static [AddressFormat],
    /// 输出文件名中的链标签
    pub file_label: &'static str,
}

impl ChainConfig {
    pub fn is_multi_format(&self) -> bool {
        self.formats.len() > 1
    }
}

static BITCOIN: ChainConfig = ChainConfig {
    chain: Chain::Bitcoin,
    name: "Bitcoin",
    symbol: "BTC",
    curve_type: CurveType::Secp256k1,
    coin_type: 0,
    formats: &[
        AddressFormat::P2pkh,
        AddressFormat::P2shP2wpkh,
        AddressFormat::P2wpkh,
        AddressFormat::P2tr,
    ],
    file_label: "btc_addresses",
};

static ETHEREUM: ChainConfig = ChainConfig {
    chain: Chain::Ethereum,
    name: "Ethereum",
    symbol: "ETH",
    curve_type: CurveType::Secp256k1,
    coin_type: 60,
    formats: &[AddressFormat::Ethereum],
    file_label: "evm_addresses",
};

static SOLANA: ChainConfig = ChainConfig {
    chain: Chain::Solana,
    name: "Solana",
    symbol: "SOL",
    curve_type: CurveType::Ed25519,
    coin_type: 501,
    formats: &[AddressFormat::Solana],
    file_label: "sol_addresses",
};
