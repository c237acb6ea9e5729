//! 派生路径
//!
//! 路径模板是固定常量，只有最后的地址索引（Solana 为账户索引）随批次循环变化

use std::fmt;
use std::str::FromStr;

use crate::error::{KeygenError, KeygenResult};

/// 硬化派生偏移量 (2^31)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// 路径中的一个层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    /// 构造硬化索引，索引必须小于 2^31
    pub fn hardened(index: u32) -> KeygenResult<Self> {
        if index >= HARDENED_OFFSET {
            return Err(KeygenError::Derivation(format!(
                "Hardened index out of range: {}",
                index
            )));
        }
        Ok(ChildIndex::Hardened(index))
    }

    /// 构造普通索引，索引必须小于 2^31
    pub fn normal(index: u32) -> KeygenResult<Self> {
        if index >= HARDENED_OFFSET {
            return Err(KeygenError::Derivation(format!(
                "Normal index out of range: {}",
                index
            )));
        }
        Ok(ChildIndex::Normal(index))
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildIndex::Hardened(_))
    }

    /// 不含硬化偏移量的原始索引
    pub fn index(&self) -> u32 {
        match self {
            ChildIndex::Normal(i) | ChildIndex::Hardened(i) => *i,
        }
    }

    /// BIP32/SLIP-0010 序列化使用的 32 位值
    pub fn to_u32(&self) -> u32 {
        match self {
            ChildIndex::Normal(i) => *i,
            ChildIndex::Hardened(i) => *i | HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildIndex::Normal(i) => write!(f, "{}", i),
            ChildIndex::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

/// BIP32/44 风格的派生路径，例如 `m/84'/0'/0'/0/3`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    segments: Vec<ChildIndex>,
}

impl DerivationPath {
    pub fn new(segments: Vec<ChildIndex>) -> Self {
        Self { segments }
    }

    /// purpose'/coin_type'/account'/change/index
    pub fn bip44_style(
        purpose: u32,
        coin_type: u32,
        account: u32,
        change: u32,
        index: u32,
    ) -> KeygenResult<Self> {
        Ok(Self::new(vec![
            ChildIndex::hardened(purpose)?,
            ChildIndex::hardened(coin_type)?,
            ChildIndex::hardened(account)?,
            ChildIndex::normal(change)?,
            ChildIndex::normal(index)?,
        ]))
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.segments
    }

    pub fn purpose(&self) -> Option<ChildIndex> {
        self.segments.first().copied()
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.segments.iter().all(ChildIndex::is_hardened)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = KeygenError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();

        if path == "m" {
            return Ok(Self::new(Vec::new()));
        }

        let rest = path.strip_prefix("m/").ok_or_else(|| {
            KeygenError::Derivation(format!("Path must start with 'm/': {}", path))
        })?;

        let mut segments = Vec::new();
        for component in rest.split('/') {
            if component.is_empty() {
                return Err(KeygenError::Derivation(format!(
                    "Empty path component in: {}",
                    path
                )));
            }

            let (digits, hardened) = match component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (component, false),
            };

            let index: u32 = digits.parse().map_err(|e| {
                KeygenError::Derivation(format!("Invalid index '{}': {}", component, e))
            })?;

            segments.push(if hardened {
                ChildIndex::hardened(index)?
            } else {
                ChildIndex::normal(index)?
            });
        }

        Ok(Self::new(segments))
    }
}
