//! 结果落盘
//!
//! 每次运行写一个 JSON 文件：`<dir>/<年>-<月>-<日>-<时>_<标签>.json`（本地时间，不补零）
//!
//! 文件结构：
//! - 多格式链：`{"mnemonic": "...", "addresses": {"p2pkh": {"addresses": [...], "privateKeys": [...]}, ...}}`
//! - 单格式链：`{"mnemonic": "...", "addresses": {"addresses": [...], "privateKeys": [...]}}`

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::batch::BatchResult;
use crate::error::{KeygenError, KeygenResult};

/// 结果输出端
pub trait ResultSink {
    /// 持久化一批结果，返回写入位置
    fn persist(&self, result: &BatchResult) -> KeygenResult<PathBuf>;
}

/// 写 JSON 文件的输出端
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 在指定时刻会写入的文件名
    pub fn file_name_at<Tz: TimeZone>(label: &str, at: &DateTime<Tz>) -> String {
        format!(
            "{}-{}-{}-{}_{}.json",
            at.year(),
            at.month(),
            at.day(),
            at.hour(),
            label
        )
    }

    fn write_at(&self, result: &BatchResult, at: &DateTime<Local>) -> KeygenResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            KeygenError::Persistence(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let label = result.chain().config().file_label;
        let path = self.dir.join(Self::file_name_at(label, at));
        let json = to_json(result)?;

        fs::write(&path, json).map_err(|e| {
            KeygenError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Batch result saved");
        Ok(path)
    }
}

impl ResultSink for JsonFileSink {
    fn persist(&self, result: &BatchResult) -> KeygenResult<PathBuf> {
        self.write_at(result, &Local::now())
    }
}

/// 按文件结构序列化，2 空格缩进
pub fn to_json(result: &BatchResult) -> KeygenResult<String> {
    Ok(serde_json::to_string_pretty(&BatchDocument(result))?)
}

struct BatchDocument<'a>(&'a BatchResult);

struct AddressesSection<'a>(&'a BatchResult);

impl Serialize for BatchDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("mnemonic", self.0.mnemonic())?;
        map.serialize_entry("addresses", &AddressesSection(self.0))?;
        map.end()
    }
}

impl Serialize for AddressesSection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let result = self.0;
        if result.chain().config().is_multi_format() {
            // 链配置中的格式顺序
            let mut map = serializer.serialize_map(None)?;
            for (format, batch) in result.formats() {
                map.serialize_entry(format.key(), batch)?;
            }
            map.end()
        } else {
            match result.formats().next() {
                Some((_, batch)) => batch.serialize(serializer),
                None => serializer.serialize_map(Some(0))?.end(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain_config::Chain;
    use crate::domain::engine::{derive_batch, BatchSize, GenerationMode};
    use tempfile::TempDir;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn imported(chain: Chain, n: u32) -> BatchResult {
        derive_batch(
            chain,
            GenerationMode::ImportMnemonic(TEST_MNEMONIC.to_string()),
            BatchSize::new(n).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_file_name_is_not_padded() {
        let at = Local.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap();
        assert_eq!(
            JsonFileSink::file_name_at("btc_addresses", &at),
            "2024-3-5-7_btc_addresses.json"
        );
        let at = Local.with_ymd_and_hms(2024, 11, 25, 23, 59, 0).unwrap();
        assert_eq!(
            JsonFileSink::file_name_at("sol_addresses", &at),
            "2024-11-25-23_sol_addresses.json"
        );
    }

    #[test]
    fn test_bitcoin_document_shape_and_order() {
        let result = imported(Chain::Bitcoin, 2);
        let json = to_json(&result).unwrap();

        let p2pkh = json.find("\"p2pkh\"").unwrap();
        let p2sh = json.find("\"p2shP2wpkh\"").unwrap();
        let p2wpkh = json.find("\"p2wpkh\"").unwrap();
        let p2tr = json.find("\"p2tr\"").unwrap();
        assert!(p2pkh < p2sh && p2sh < p2wpkh && p2wpkh < p2tr);
        assert!(json.find("\"mnemonic\"").unwrap() < json.find("\"addresses\"").unwrap());
        assert!(json.contains("\n  \"mnemonic\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mnemonic"], TEST_MNEMONIC);
        assert_eq!(
            value["addresses"]["p2wpkh"]["addresses"][0],
            "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
        );
        assert_eq!(
            value["addresses"]["p2tr"]["privateKeys"].as_array().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_single_format_document_is_flat() {
        for chain in [Chain::Ethereum, Chain::Solana] {
            let result = imported(chain, 3);
            let value: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
            let addresses = &value["addresses"];
            assert_eq!(addresses["addresses"].as_array().unwrap().len(), 3);
            assert_eq!(addresses["privateKeys"].as_array().unwrap().len(), 3);
            assert_eq!(addresses.as_object().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_random_document_has_empty_mnemonic() {
        let result =
            derive_batch(Chain::Ethereum, GenerationMode::Random, BatchSize::new(1).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();
        assert_eq!(value["mnemonic"], "");
    }

    #[test]
    fn test_persist_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("data");
        let sink = JsonFileSink::new(&dir);

        let result = imported(Chain::Solana, 2);
        let path = sink.persist(&result).unwrap();

        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_sol_addresses.json"), "{}", name);

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_json(&result).unwrap());
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        // 用普通文件占住目录位置
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let sink = JsonFileSink::new(blocker.join("data"));
        let err = sink.persist(&imported(Chain::Ethereum, 1)).unwrap_err();
        assert!(matches!(err, KeygenError::Persistence(_)));
    }
}
