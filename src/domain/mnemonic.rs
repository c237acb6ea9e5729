//! 熵/助记词来源
//!
//! 三种模式：生成新助记词、导入助记词、无种子（每个索引独立随机）

use std::fmt;

use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{KeygenError, KeygenResult};

/// 助记词长度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    /// 12 words (128-bit entropy)
    #[default]
    Twelve,
    /// 15 words (160-bit entropy)
    Fifteen,
    /// 18 words (192-bit entropy)
    Eighteen,
    /// 21 words (224-bit entropy)
    TwentyOne,
    /// 24 words (256-bit entropy)
    TwentyFour,
}

impl WordCount {
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    pub const fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::Fifteen => 15,
            WordCount::Eighteen => 18,
            WordCount::TwentyOne => 21,
            WordCount::TwentyFour => 24,
        }
    }

    pub fn from_words(words: usize) -> Option<Self> {
        match words {
            12 => Some(WordCount::Twelve),
            15 => Some(WordCount::Fifteen),
            18 => Some(WordCount::Eighteen),
            21 => Some(WordCount::TwentyOne),
            24 => Some(WordCount::TwentyFour),
            _ => None,
        }
    }
}

/// BIP39 种子 (64 bytes)，drop 时清零，从不落盘
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 64]);

impl Seed {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// 一次批量派生所用的密钥材料
pub enum SeedMaterial {
    /// 确定性模式：助记词 + 由其派生的种子
    Mnemonic { phrase: String, seed: Seed },
    /// 独立随机模式：没有共享种子，每个索引单独取随机数
    NoSeed,
}

impl SeedMaterial {
    pub fn phrase(&self) -> Option<&str> {
        match self {
            SeedMaterial::Mnemonic { phrase, .. } => Some(phrase),
            SeedMaterial::NoSeed => None,
        }
    }

    pub fn seed(&self) -> Option<&Seed> {
        match self {
            SeedMaterial::Mnemonic { seed, .. } => Some(seed),
            SeedMaterial::NoSeed => None,
        }
    }
}

impl fmt::Debug for SeedMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedMaterial::Mnemonic { .. } => f
                .debug_struct("Mnemonic")
                .field("phrase", &"[REDACTED]")
                .finish(),
            SeedMaterial::NoSeed => f.write_str("NoSeed"),
        }
    }
}

/// 助记词来源
pub struct MnemonicSource;

impl MnemonicSource {
    /// 用系统 CSPRNG 生成新助记词并派生种子
    pub fn generate(word_count: WordCount) -> KeygenResult<SeedMaterial> {
        let entropy_size = word_count.entropy_bytes();

        let mut entropy = [0u8; 32];
        OsRng.fill_bytes(&mut entropy[..entropy_size]);

        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_size]);
        entropy.zeroize();

        // 熵长度由 WordCount 保证合法
        let mnemonic = mnemonic.map_err(|e| {
            KeygenError::Derivation(format!("Failed to generate mnemonic from entropy: {}", e))
        })?;

        Ok(Self::material(&mnemonic))
    }

    /// 校验并导入用户提供的助记词
    ///
    /// 校验失败返回 `InvalidMnemonic`，调用方应中止整批
    pub fn import_from(phrase: &str) -> KeygenResult<SeedMaterial> {
        let normalized = normalize_phrase(phrase);
        if normalized.is_empty() {
            return Err(KeygenError::InvalidMnemonic("empty phrase".to_string()));
        }

        let mnemonic = Mnemonic::parse_in(Language::English, normalized.as_str())
            .map_err(|e| KeygenError::InvalidMnemonic(e.to_string()))?;

        Ok(Self::material(&mnemonic))
    }

    /// 独立随机模式，必须显式选择
    pub fn none() -> SeedMaterial {
        SeedMaterial::NoSeed
    }

    /// 仅做校验
    pub fn validate(phrase: &str) -> bool {
        Mnemonic::parse_in(Language::English, normalize_phrase(phrase).as_str()).is_ok()
    }

    fn material(mnemonic: &Mnemonic) -> SeedMaterial {
        SeedMaterial::Mnemonic {
            phrase: mnemonic.to_string(),
            seed: Seed::from_bytes(mnemonic.to_seed("")),
        }
    }
}

/// 合并多余空白
fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
