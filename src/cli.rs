use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::domain::chain_config::Chain;
use crate::domain::engine::{BatchSize, GenerationMode};

/// Multi-chain batch key and address generator
#[derive(Debug, Parser)]
#[command(
    name = "ironcore-keygen",
    about = "Batch-derive Bitcoin / Ethereum / Solana keys and addresses",
    version
)]
pub struct Cli {
    /// Target chain: btc | eth | sol
    #[arg(long, value_parser = parse_chain)]
    pub chain: Chain,

    /// Key source
    #[arg(long, value_enum, default_value_t = ModeArg::Generate)]
    pub mode: ModeArg,

    /// Number of indices to derive (defaults to KEYGEN_DEFAULT_COUNT)
    #[arg(long, value_parser = parse_count)]
    pub count: Option<BatchSize>,

    /// BIP-39 phrase for import mode; read from stdin when omitted
    #[arg(long)]
    pub mnemonic: Option<String>,

    /// Directory for the result file (defaults to KEYGEN_OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print only, do not write a result file
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Independent random key per index, no mnemonic
    Random,
    /// Fresh mnemonic, deterministic derivation
    Generate,
    /// Existing mnemonic, deterministic derivation
    Import,
}

impl Cli {
    /// 解析生成模式；导入模式未给出助记词时从 reader 读取一行
    pub fn generation_mode<R: BufRead>(&self, mut reader: R) -> Result<GenerationMode> {
        Ok(match self.mode {
            ModeArg::Random => GenerationMode::Random,
            ModeArg::Generate => GenerationMode::GenerateMnemonic,
            ModeArg::Import => {
                let phrase = match &self.mnemonic {
                    Some(phrase) => phrase.clone(),
                    None => {
                        let mut line = String::new();
                        reader
                            .read_line(&mut line)
                            .context("Failed to read mnemonic from stdin")?;
                        line
                    }
                };
                GenerationMode::ImportMnemonic(phrase)
            }
        })
    }

    /// 命令行优先，其次配置
    pub fn batch_size(&self, default_count: u32) -> Result<BatchSize> {
        match self.count {
            Some(count) => Ok(count),
            None => BatchSize::new(default_count).context("Invalid default batch size"),
        }
    }
}

fn parse_chain(s: &str) -> Result<Chain, String> {
    s.parse::<Chain>().map_err(|e| e.to_string())
}

fn parse_count(s: &str) -> Result<BatchSize, String> {
    BatchSize::parse(s).map_err(|e| e.to_string())
}
