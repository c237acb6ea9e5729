//! 批量结果聚合
//!
//! 每种格式维护两条按派生索引排列的序列（地址、私钥），位置 i 对应索引 i

use serde::{Deserialize, Serialize};

use crate::domain::address::AddressRecord;
use crate::domain::chain_config::{AddressFormat, Chain};
use crate::error::{KeygenError, KeygenResult};

/// 预分配上限，超出部分随追加增长
const MAX_PREALLOCATED: usize = 1024;

/// 单一格式的索引对齐序列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatBatch {
    addresses: Vec<String>,
    private_keys: Vec<String>,
}

impl FormatBatch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            addresses: Vec::with_capacity(capacity),
            private_keys: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, record: AddressRecord) {
        self.addresses.push(record.address);
        self.private_keys.push(record.private_key);
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn private_keys(&self) -> &[String] {
        &self.private_keys
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// (地址, 私钥) 按索引顺序
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.addresses
            .iter()
            .zip(self.private_keys.iter())
            .map(|(a, k)| (a.as_str(), k.as_str()))
    }
}

/// 一次批量派生的完整结果，构建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    chain: Chain,
    /// 随机模式下为空串
    mnemonic: String,
    formats: Vec<(AddressFormat, FormatBatch)>,
}

impl BatchResult {
    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn has_mnemonic(&self) -> bool {
        !self.mnemonic.is_empty()
    }

    pub fn format(&self, format: AddressFormat) -> Option<&FormatBatch> {
        self.formats
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, batch)| batch)
    }

    /// 按链的格式顺序
    pub fn formats(&self) -> impl Iterator<Item = (AddressFormat, &FormatBatch)> {
        self.formats.iter().map(|(f, batch)| (*f, batch))
    }

    /// 批次大小（所有格式长度一致）
    pub fn batch_size(&self) -> usize {
        self.formats.first().map(|(_, b)| b.len()).unwrap_or(0)
    }
}

/// 聚合器：按派生顺序追加，完成后交出 BatchResult
pub struct BatchAggregator {
    chain: Chain,
    mnemonic: String,
    formats: Vec<(AddressFormat, FormatBatch)>,
}

impl BatchAggregator {
    pub fn new(chain: Chain, mnemonic: Option<&str>, batch_size: usize) -> Self {
        let capacity = batch_size.min(MAX_PREALLOCATED);
        Self {
            chain,
            mnemonic: mnemonic.unwrap_or_default().to_string(),
            formats: chain
                .formats()
                .iter()
                .map(|f| (*f, FormatBatch::with_capacity(capacity)))
                .collect(),
        }
    }

    /// 追加一条记录；格式不属于该链时返回错误，不修改任何序列
    pub fn append(&mut self, format: AddressFormat, record: AddressRecord) -> KeygenResult<()> {
        let chain = self.chain;
        let (_, batch) = self
            .formats
            .iter_mut()
            .find(|(f, _)| *f == format)
            .ok_or_else(|| {
                KeygenError::Encoding(format!("{} is not an address format of {}", format, chain))
            })?;
        batch.push(record);
        Ok(())
    }

    pub fn finish(self) -> BatchResult {
        BatchResult {
            chain: self.chain,
            mnemonic: self.mnemonic,
            formats: self.formats,
        }
    }
}
