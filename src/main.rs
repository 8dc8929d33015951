//! httprint 命令行入口

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use httprint::server::local_ip;
use httprint::utils::{format_name_list, generate_random_string, icon_hash, remove_duplicates};
use httprint::{
    BatchRunner, ConfigManager, FingerMatcher, HttpAcquirer, PreviewServer, ReportSink, RuleLoader,
};

const BANNER: &str = r#"
  _     _   _               _       _
 | |__ | |_| |_ _ __  _ __ (_)_ __ | |_
 | '_ \| __| __| '_ \| '__|| | '_ \| __|
 | | | | |_| |_| |_) | |   | | | | | |_
 |_| |_|\__|\__| .__/|_|   |_|_| |_|\__|
               |_|
"#;

#[derive(Parser, Debug)]
#[command(name = "httprint", version, about = "批量Web应用指纹识别工具")]
struct Cli {
    /// 单个目标URL
    #[arg(short, long)]
    url: Option<String>,

    /// 目标清单文件，每行一个URL，支持#注释行
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// 代理地址（http/https/socks5）
    #[arg(long)]
    proxy: Option<String>,

    /// 单次请求超时（秒）
    #[arg(long, default_value_t = 8)]
    timeout: u64,

    /// 并发任务数
    #[arg(long, default_value_t = 20)]
    thread: usize,

    /// 指纹规则文件路径
    #[arg(long, default_value = "fingers.json")]
    fingers: PathBuf,

    /// 输出目录
    #[arg(long, default_value = "output")]
    output: String,

    /// 只计算指定URL的favicon哈希后退出
    #[arg(long, value_name = "URL")]
    hash: Option<String>,

    /// 规则库体检：校验全部规则表达式后退出
    #[arg(long)]
    check: bool,

    /// 启动带Basic认证的报告预览服务（扫描前开启，可实时查看）
    #[arg(long)]
    server: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("httprint=info")),
        )
        .init();

    let cli = Cli::parse();
    println!("{}", BANNER.cyan());

    let config = ConfigManager::custom()
        .concurrency(cli.thread)
        .timeout_secs(cli.timeout)
        .proxy(cli.proxy.clone())
        .finger_path(cli.fingers.clone())
        .output(cli.output.clone())
        .build();

    // 独立favicon哈希模式
    if let Some(url) = &cli.hash {
        let acquirer = HttpAcquirer::new(&config)?;
        let bytes = acquirer
            .fetch_bytes(&normalize_target(url))
            .await
            .with_context(|| format!("favicon下载失败：{}", url))?;
        println!("icon_hash=\"{}\"", icon_hash(&bytes));
        return Ok(());
    }

    // 规则库体检模式
    if cli.check {
        let rules = RuleLoader::load_from_file(&config.finger_path)?;
        let offenders = RuleLoader::validate(&rules);
        if offenders.is_empty() {
            println!(
                "{}",
                format!("规则库体检通过，共{}条规则", rules.len()).green()
            );
            return Ok(());
        }
        for (name, err) in &offenders {
            println!("{}", format!("[{}] {}", name, err).red());
        }
        bail!("规则库体检失败：{}条规则非法", offenders.len());
    }

    // 单目标模式：对齐列输出，不产出报告文件
    if let (Some(url), None) = (&cli.url, &cli.file) {
        let rules = RuleLoader::load_from_file(&config.finger_path)?;
        let acquirer = HttpAcquirer::new(&config)?;
        let matcher = FingerMatcher::new(rules);
        let result = matcher
            .fingerprint(&acquirer, &normalize_target(url.trim()))
            .await;

        println!(
            "{:<40} {:<8} {:<24} {:<16} {:<16}",
            "URL", "Status", "Title", "CMS List", "Other List"
        );
        println!(
            "{:<40} {:<8} {:<24} {:<16} {:<16}",
            result.url,
            result.status_code,
            result.title,
            format_name_list(&result.cms_list).green(),
            format_name_list(&result.other_list).red()
        );
        return Ok(());
    }

    let targets = collect_targets(&cli)?;
    if targets.is_empty() {
        bail!("未提供目标：使用 -u 指定URL或 -f 指定清单文件");
    }

    let rules = RuleLoader::load_from_file(&config.finger_path)?;
    println!(
        "规则{}条，目标{}个，并发{}，超时{}秒",
        rules.len(),
        targets.len(),
        config.concurrency,
        config.timeout_secs
    );

    let started = Instant::now();
    let sink = ReportSink::create(Path::new(&config.output))?;
    let html_name = sink.html_name().to_string();

    // 预览服务先于扫描启动：随机端口 + 随机密码，边扫边看
    if cli.server {
        let password = generate_random_string(10, &mut rand::thread_rng());
        let server = Arc::new(PreviewServer::new(
            PathBuf::from(&config.output),
            html_name,
            password,
        ));
        let listener = server.bind().await?;
        let port = listener.local_addr()?.port();
        let host = local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        println!(
            "{}",
            format!(
                "报告预览：http://{}:{}/  用户名：{}  密码：{}",
                host,
                port,
                server.username(),
                server.password()
            )
            .green()
        );

        tokio::spawn(server.clone().serve(listener));
    }

    let runner = BatchRunner::new(
        FingerMatcher::new(rules),
        HttpAcquirer::new(&config)?,
        sink,
        config.concurrency,
    );
    let stats = runner.run(targets).await;

    println!(
        "{}",
        format!(
            "扫描完成：共{}个目标，cms命中{}，无响应{}，写入失败{}，耗时{:.2}秒",
            stats.total,
            stats.cms_hits,
            stats.unreachable,
            stats.report_errors,
            started.elapsed().as_secs_f64()
        )
        .cyan()
    );
    println!("报告目录：{}", config.output);

    // 预览服务存活期间等待Ctrl-C
    if cli.server {
        tokio::signal::ctrl_c().await?;
        println!("\n预览服务退出");
    }

    Ok(())
}

/// 汇总-u与-f两路目标，去重并保留顺序
fn collect_targets(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut targets = Vec::new();

    if let Some(url) = &cli.url {
        targets.push(normalize_target(url.trim()));
    }

    if let Some(path) = &cli.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取目标清单失败：{}", path.display()))?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            targets.push(normalize_target(line));
        }
    }

    Ok(remove_duplicates(targets))
}

/// 无scheme的目标默认按http处理
fn normalize_target(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}
