//! ironcore-keygen 主入口
//! 多链批量密钥/地址生成

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ironcore_keygen::{
    cli::Cli,
    config::Config,
    domain::{BatchResult, DerivationEngine, DeriveRequest, GenerationMode},
    error::KeygenError,
    infrastructure::logging,
    service::{JsonFileSink, ResultSink},
};

fn main() -> ExitCode {
    // 1. 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 2. 加载配置（存在 CONFIG_PATH 时配置文件优先）
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // 3. 初始化日志
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        logging::init_default_logging();
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<KeygenError>() {
                Some(KeygenError::InvalidMnemonic(reason)) => {
                    tracing::error!(chain = %cli.chain, "Invalid mnemonic: {}", reason);
                }
                _ => tracing::error!("Generation failed: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<Config> {
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = Config::from_env_and_file(config_path.as_deref())?;
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let batch_size = cli.batch_size(config.generation.default_batch_size)?;
    let mode = cli.generation_mode(std::io::stdin().lock())?;
    let generated = matches!(mode, GenerationMode::GenerateMnemonic);

    let engine = DerivationEngine::new(config.generation.word_count());
    let result = engine.derive_batch(&DeriveRequest {
        chain: cli.chain,
        mode,
        batch_size,
    })?;

    report(&result, generated);

    if cli.no_save {
        tracing::info!("--no-save given, result file skipped");
        return Ok(());
    }

    let dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());
    let sink = JsonFileSink::new(dir);
    let path = sink
        .persist(&result)
        .context("Failed to save batch result")?;
    println!("{}", path.display());

    Ok(())
}

/// 控制台回显全部地址与私钥
fn report(result: &BatchResult, generated: bool) {
    if generated {
        tracing::warn!("Mnemonic (save it offline): {}", result.mnemonic());
    }

    for (format, batch) in result.formats() {
        tracing::info!("{} addresses:", format);
        for (index, (address, private_key)) in batch.iter().enumerate() {
            tracing::info!("[{}] address: {}", index, address);
            tracing::info!("[{}] private key: {}", index, private_key);
        }
    }
}
