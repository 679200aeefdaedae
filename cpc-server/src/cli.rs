use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "cpc.yaml";

#[derive(Parser, Debug)]
#[command(name = "cpc-server")]
#[command(about = "Keyword analysis service for AdSense CPC optimization")]
#[command(version)]
pub struct Cli {
    /// Config file; without it `cpc.yaml` is read if present
    #[arg(short, long, env = "CPC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Probe the LLM provider before accepting traffic
    #[arg(long)]
    pub check_llm: bool,
}
