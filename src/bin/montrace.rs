//! 追踪自动机重建
//!
//! 读取监控追踪文件，为每个监控上下文输出一个 dot 格式的状态自动机（写到标准输出）。

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use montrace_rs::graph::GraphBuilder;
use montrace_rs::mode::{RunError, run_mode};
use montrace_rs::names::{NameRegistry, NamesError};
use montrace_rs::trace::{TraceError, TraceReader};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "montrace",
    about = "从监控追踪文件重建各上下文的状态自动机（dot 格式）"
)]
struct Args {
    /// 追踪文件路径
    trace: PathBuf,

    /// 名称表（JSON）；未注册的编号按十进制显示
    #[arg(long)]
    names: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Names(#[from] NamesError),

    #[error("opening {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: TraceError,
    },

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("closing trace: {0}")]
    Close(#[source] TraceError),

    #[error("writing output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    // 日志写到 stderr，stdout 只输出 dot 图
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "运行失败");
            eprintln!("montrace: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let names = match &args.names {
        Some(path) => NameRegistry::load(path)?,
        None => NameRegistry::default(),
    };

    let mut trace = TraceReader::open_file(&args.trace).map_err(|source| CliError::Open {
        path: args.trace.display().to_string(),
        source,
    })?;
    info!(
        path = %args.trace.display(),
        major = trace.major(),
        minor = trace.minor(),
        "打开追踪文件"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut mode = GraphBuilder::new(&names);

    let result = run_mode(&mut trace, &mut mode, &mut out);
    // 已输出的部分结果不撤回
    let flushed = out.flush();
    let closed = trace.close();

    let records = result?;
    flushed?;
    closed.map_err(CliError::Close)?;

    info!(records, "完成");
    Ok(())
}
