//! 派生引擎
//!
//! 给定 {链, 模式, 批次大小} 生成 BatchResult。整批要么完整产出，要么返回错误

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::domain::address::AddressEncoder;
use crate::domain::batch::{BatchAggregator, BatchResult};
use crate::domain::chain_config::Chain;
use crate::domain::key_tree::KeyTreeFactory;
use crate::domain::mnemonic::{MnemonicSource, SeedMaterial, WordCount};
use crate::error::{KeygenError, KeygenResult};

/// 生成模式
#[derive(Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// 每个索引独立随机，无助记词
    Random,
    /// 生成新助记词后派生
    GenerateMnemonic,
    /// 导入助记词后派生
    ImportMnemonic(String),
}

impl GenerationMode {
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, GenerationMode::Random)
    }
}

impl fmt::Debug for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Random => f.write_str("Random"),
            GenerationMode::GenerateMnemonic => f.write_str("GenerateMnemonic"),
            GenerationMode::ImportMnemonic(_) => f.write_str("ImportMnemonic([REDACTED])"),
        }
    }
}

/// 正整数批次大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroU32);

impl BatchSize {
    pub fn new(n: u32) -> KeygenResult<Self> {
        NonZeroU32::new(n)
            .map(Self)
            .ok_or_else(|| KeygenError::InvalidBatchSize("batch size must be positive".to_string()))
    }

    /// 前端输入校验：非数字或非正数直接拒绝
    pub fn parse(input: &str) -> KeygenResult<Self> {
        let n: u32 = input
            .trim()
            .parse()
            .map_err(|_| KeygenError::InvalidBatchSize(format!("not a positive integer: {:?}", input)))?;
        Self::new(n)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl FromStr for BatchSize {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 一次派生调用的全部参数
#[derive(Debug, Clone)]
pub struct DeriveRequest {
    pub chain: Chain,
    pub mode: GenerationMode,
    pub batch_size: BatchSize,
}

/// 派生引擎，不持有跨调用的可变状态
#[derive(Debug, Clone, Default)]
pub struct DerivationEngine {
    word_count: WordCount,
}

impl DerivationEngine {
    pub fn new(word_count: WordCount) -> Self {
        Self { word_count }
    }

    /// 生成一整批密钥与地址
    ///
    /// # 流程
    /// 1. 按模式解析种子；导入的助记词无效时立即失败，不做任何派生
    /// 2. 对 i in 0..N：
    ///    - 随机模式：每个索引生成一个随机密钥对，链内所有格式共用
    ///      （BTC 四种格式是同一把密钥的四种表示）
    ///    - 确定性模式：每种格式按自己的路径从种子派生，BTC 四种格式是四把不同的密钥
    /// 3. 编码地址、序列化私钥，按索引顺序追加
    pub fn derive_batch(&self, request: &DeriveRequest) -> KeygenResult<BatchResult> {
        let chain = request.chain;
        let batch_size = request.batch_size.get();

        let material = match &request.mode {
            GenerationMode::Random => MnemonicSource::none(),
            GenerationMode::GenerateMnemonic => MnemonicSource::generate(self.word_count)?,
            GenerationMode::ImportMnemonic(phrase) => MnemonicSource::import_from(phrase)?,
        };

        tracing::info!(
            chain = %chain,
            mode = ?request.mode,
            batch_size,
            "Starting batch derivation"
        );

        let result = self.run(chain, &material, batch_size)?;

        tracing::info!(chain = %chain, batch_size, "Batch derivation completed");
        Ok(result)
    }

    fn run(&self, chain: Chain, material: &SeedMaterial, batch_size: u32) -> KeygenResult<BatchResult> {
        let config = chain.config();
        let tree = KeyTreeFactory::create(config.curve_type);
        let mut aggregator =
            BatchAggregator::new(chain, material.phrase(), batch_size as usize);

        for index in 0..batch_size {
            tracing::debug!("Address {}/{}", index + 1, batch_size);

            match material.seed() {
                None => {
                    let keypair = KeyTreeFactory::random_keypair(config.curve_type);
                    for format in config.formats {
                        let record = AddressEncoder::encode(&keypair, *format)?;
                        aggregator.append(*format, record)?;
                    }
                }
                Some(seed) => {
                    for format in config.formats {
                        let path = format.derivation_path(index)?;
                        let keypair = tree.derive_child(seed, &path)?;
                        let record = AddressEncoder::encode(&keypair, *format)?;
                        tracing::trace!(format = %format, path = %path, "Derived child key");
                        aggregator.append(*format, record)?;
                    }
                }
            }
        }

        Ok(aggregator.finish())
    }
}

/// 使用默认 12 词助记词的便捷入口
pub fn derive_batch(chain: Chain, mode: GenerationMode, batch_size: BatchSize) -> KeygenResult<BatchResult> {
    DerivationEngine::default().derive_batch(&DeriveRequest {
        chain,
        mode,
        batch_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain_config::AddressFormat;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn import(chain: Chain, n: u32) -> BatchResult {
        derive_batch(
            chain,
            GenerationMode::ImportMnemonic(TEST_MNEMONIC.to_string()),
            BatchSize::new(n).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_batch_size_parse() {
        assert_eq!(BatchSize::parse(" 7 ").unwrap().get(), 7);
        assert!(matches!(
            BatchSize::parse("0"),
            Err(KeygenError::InvalidBatchSize(_))
        ));
        assert!(BatchSize::parse("-3").is_err());
        assert!(BatchSize::parse("ten").is_err());
        assert!(BatchSize::parse("").is_err());
        assert_eq!("12".parse::<BatchSize>().unwrap().get(), 12);
    }

    #[test]
    fn test_bitcoin_import_vectors() {
        let result = import(Chain::Bitcoin, 1);
        assert_eq!(result.mnemonic(), TEST_MNEMONIC);

        let first = |format| result.format(format).unwrap().addresses()[0].clone();
        assert_eq!(first(AddressFormat::P2pkh), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
        assert_eq!(first(AddressFormat::P2shP2wpkh), "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf");
        assert_eq!(
            first(AddressFormat::P2wpkh),
            "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"
        );
        assert_eq!(
            first(AddressFormat::P2tr),
            "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr"
        );
        assert_eq!(
            result.format(AddressFormat::P2wpkh).unwrap().private_keys()[0],
            "KyZpNDKnfs94vbrwhJneDi77V6jF64PWPF8x5cdJb8ifgg2DUc9d"
        );
    }

    #[test]
    fn test_bitcoin_deterministic_formats_use_distinct_keys() {
        let result = import(Chain::Bitcoin, 2);
        for i in 0..2 {
            let keys: Vec<&String> = result
                .formats()
                .map(|(_, batch)| &batch.private_keys()[i])
                .collect();
            for a in 0..keys.len() {
                for b in (a + 1)..keys.len() {
                    assert_ne!(keys[a], keys[b]);
                }
            }
        }
    }

    #[test]
    fn test_ethereum_import_vector() {
        let result = import(Chain::Ethereum, 1);
        let batch = result.format(AddressFormat::Ethereum).unwrap();
        assert_eq!(batch.addresses()[0], "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert_eq!(
            batch.private_keys()[0],
            "0x1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn test_solana_import_vector() {
        let result = import(Chain::Solana, 1);
        let batch = result.format(AddressFormat::Solana).unwrap();
        assert_eq!(batch.addresses()[0], "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk");
    }

    #[test]
    fn test_determinism() {
        for chain in Chain::ALL {
            assert_eq!(import(chain, 3), import(chain, 3));
        }
    }

    #[test]
    fn test_index_alignment_all_modes() {
        let modes = [
            GenerationMode::Random,
            GenerationMode::GenerateMnemonic,
            GenerationMode::ImportMnemonic(TEST_MNEMONIC.to_string()),
        ];
        for chain in Chain::ALL {
            for mode in modes.iter().cloned() {
                let result = derive_batch(chain, mode, BatchSize::new(4).unwrap()).unwrap();
                assert_eq!(result.formats().count(), chain.formats().len());
                for (_, batch) in result.formats() {
                    assert_eq!(batch.addresses().len(), 4);
                    assert_eq!(batch.private_keys().len(), 4);
                }
            }
        }
    }

    #[test]
    fn test_random_bitcoin_shares_keypair_across_formats() {
        let result =
            derive_batch(Chain::Bitcoin, GenerationMode::Random, BatchSize::new(3).unwrap()).unwrap();
        assert!(!result.has_mnemonic());

        let p2pkh = result.format(AddressFormat::P2pkh).unwrap();
        for (format, batch) in result.formats() {
            assert_eq!(
                batch.private_keys(),
                p2pkh.private_keys(),
                "{} should reuse the random key",
                format
            );
        }
        // 不同索引是不同的随机密钥
        assert_ne!(p2pkh.private_keys()[0], p2pkh.private_keys()[1]);
    }

    #[test]
    fn test_random_runs_are_independent() {
        let a = derive_batch(Chain::Solana, GenerationMode::Random, BatchSize::new(2).unwrap()).unwrap();
        let b = derive_batch(Chain::Solana, GenerationMode::Random, BatchSize::new(2).unwrap()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_populates_mnemonic() {
        let engine = DerivationEngine::new(WordCount::TwentyFour);
        let result = engine
            .derive_batch(&DeriveRequest {
                chain: Chain::Ethereum,
                mode: GenerationMode::GenerateMnemonic,
                batch_size: BatchSize::new(1).unwrap(),
            })
            .unwrap();
        assert_eq!(result.mnemonic().split(' ').count(), 24);
        assert!(MnemonicSource::validate(result.mnemonic()));
    }

    #[test]
    fn test_invalid_import_fails_fast() {
        let err = derive_batch(
            Chain::Bitcoin,
            GenerationMode::ImportMnemonic("invalid invalid invalid invalid".to_string()),
            BatchSize::new(5).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, KeygenError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_mode_debug_redacts_phrase() {
        let mode = GenerationMode::ImportMnemonic(TEST_MNEMONIC.to_string());
        assert!(!format!("{:?}", mode).contains("abandon"));
        assert!(mode.is_deterministic());
        assert!(!GenerationMode::Random.is_deterministic());
    }
}
