use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "buildcheck",
    version,
    about = "Declared-vs-actual build checks: header reconciliation and package size budgets"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON on stdout")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare headers the compiler actually used against headers declared in
    /// the build graph. Build all targets in the out dir first.
    Headers(HeadersArgs),
    /// Measure deduplicated, compression-aware package sizes and check them
    /// against configured budgets.
    Sizes(SizesArgs),
}

#[derive(Args, Debug)]
pub struct HeadersArgs {
    #[arg(
        long,
        default_value = "out/Release",
        help = "Build output directory, relative to the source root"
    )]
    pub out_dir: String,
    #[arg(long, default_value = ".", help = "Repository source root")]
    pub src_root: PathBuf,
    #[arg(
        long,
        help = "Write the sorted missing+nonexistent paths as a JSON array to this file"
    )]
    pub machine_json: Option<PathBuf>,
    #[arg(
        long,
        help = "File of paths to permanently ignore (one per line, # comments)"
    )]
    pub allowlist: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help = "Skip checking whether the build is dirty"
    )]
    pub skip_dirty_check: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "With --machine-json, exit 0 even when findings exist"
    )]
    pub exit_zero_on_findings: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "Print per-header referencing objects"
    )]
    pub verbose: bool,
    #[arg(
        long,
        default_value = "ninja",
        help = "Build tool used for the dependency trace"
    )]
    pub ninja: PathBuf,
    #[arg(long, default_value = "gn", help = "Build-graph generator")]
    pub gn: PathBuf,
    #[arg(
        long,
        default_value = "gclient",
        help = "Checkout tool for nested-repo prefixes"
    )]
    pub gclient: PathBuf,
}

#[derive(Args, Debug)]
pub struct SizesArgs {
    #[arg(long, help = "Location of the packaged build artifacts")]
    pub build_out_dir: PathBuf,
    #[arg(long, help = "Package size budgets JSON file")]
    pub sizes_path: PathBuf,
    #[arg(
        long,
        help = "Platform SDK root; its shared libraries are excluded from sizes"
    )]
    pub sdk_root: Option<PathBuf>,
    #[arg(
        long,
        help = "Write per-metric PASS/FAIL/CRASH test results to this file"
    )]
    pub test_results: Option<PathBuf>,
    #[arg(
        long,
        help = "Write the {package: compressed_bytes} size map to this file"
    )]
    pub size_data: Option<PathBuf>,
    #[arg(long, help = "Write the dashboard histogram document to this file")]
    pub histogram: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help = "Print per-package blob tables"
    )]
    pub verbose: bool,
    #[arg(long, default_value = "far", help = "Archive extraction tool")]
    pub far_tool: PathBuf,
    #[arg(
        long,
        default_value = "blobfs-compression",
        help = "Compressor reporting compressed byte counts"
    )]
    pub compressor: PathBuf,
}
