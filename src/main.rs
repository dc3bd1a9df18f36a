use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coordinator::app::{parse_define, verify_params, Application};
use coordinator_core::{init_logging, AppConfig, LogConfig, LogLevel, OutputFormat};
use tracing::{error, info};

/// 协调器作业参数校验与动作查询工具
#[derive(Parser, Debug)]
#[command(name = "coordinator")]
#[command(version)]
#[command(about = "协调器作业定义校验与动作查询")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径，未指定时按默认路径查找
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// 日志格式 (json, text, pretty)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<OutputFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验作业定义声明的参数并补齐默认值
    VerifyParams {
        /// 作业定义XML文件
        #[arg(long, value_name = "XML")]
        definition: PathBuf,
        /// Hadoop 风格的作业配置XML文件
        #[arg(long, value_name = "XML")]
        conf: Option<PathBuf>,
        /// 覆盖单个配置项，可重复
        #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
        define: Vec<(String, String)>,
    },
    /// 分页查询协调器作业的动作
    Actions {
        /// 协调器作业ID
        job_id: String,
        /// 状态过滤，可重复；不指定时返回全部状态
        #[arg(long = "status", value_name = "STATUS")]
        statuses: Vec<String>,
        /// 起始位置，从1开始
        #[arg(long, default_value_t = 1)]
        start: u32,
        /// 返回条数，默认取配置中的分页长度
        #[arg(long)]
        len: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::VerifyParams {
            definition,
            conf,
            define,
        } => {
            let definition_xml = fs::read_to_string(&definition)
                .with_context(|| format!("读取作业定义失败: {}", definition.display()))?;
            let conf_xml = conf
                .as_ref()
                .map(|path| {
                    fs::read_to_string(path)
                        .with_context(|| format!("读取作业配置失败: {}", path.display()))
                })
                .transpose()?;

            let output = verify_params(&definition_xml, conf_xml.as_deref(), &define)
                .map_err(anyhow::Error::from)
                .inspect_err(|e| error!("参数校验失败: {:#}", e))?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Actions {
            job_id,
            statuses,
            start,
            len,
        } => {
            info!("查询协调器作业动作: {}", job_id);
            let app = Application::new(config).await?;
            let result = app.list_actions(&job_id, &statuses, start, len).await;
            app.shutdown().await;

            let output = result
                .map_err(anyhow::Error::from)
                .inspect_err(|e| error!("动作查询失败: {:#}", e))?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// 加载配置，日志参数优先级: 命令行 > 环境变量 > 配置文件
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;

    let mut logging: LogConfig = config.logging.clone().with_env_overrides();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    config.logging = logging;

    Ok(config)
}
