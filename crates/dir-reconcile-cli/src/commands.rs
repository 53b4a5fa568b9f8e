use clap::{Args, Parser, Subcommand, ValueEnum};
use dir_reconcile_core::{HashAlgorithm, IdentityPolicy};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dir-reconcile")]
#[command(
    about = "Reconcile folders (partially copied, duplicates, version conflicts, etc.)",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge the source folder into the destination and remove it when done
    Run(RunArgs),
    /// Print the content fingerprint of each file
    Fingerprint(FingerprintArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Destination folder (to be updated)
    #[arg(long)]
    pub dst: PathBuf,
    /// Source folder (to be removed)
    #[arg(long)]
    pub src: PathBuf,
    /// Only flag internal duplicates instead of deleting them
    #[arg(long)]
    pub keep_duplicates: bool,
    /// Simulate the operation
    #[arg(long)]
    pub simulate: bool,
    /// Keys that make a file an internal duplicate
    #[arg(long, value_enum)]
    pub identity: Option<IdentityArg>,
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,
    /// Read block size in bytes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub block_size: Option<u64>,
    /// Write every outcome and error to a CSV file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FingerprintArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IdentityArg {
    Content,
    ContentOrPath,
}

impl From<IdentityArg> for IdentityPolicy {
    fn from(arg: IdentityArg) -> Self {
        match arg {
            IdentityArg::Content => IdentityPolicy::Content,
            IdentityArg::ContentOrPath => IdentityPolicy::ContentOrPath,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Sha256,
    Blake3,
}

impl From<AlgorithmArg> for HashAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha256 => HashAlgorithm::Sha256,
            AlgorithmArg::Blake3 => HashAlgorithm::Blake3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "dir-reconcile",
            "run",
            "--dst",
            "/d",
            "--src",
            "/s",
            "--keep-duplicates",
            "--simulate",
            "--identity",
            "content-or-path",
            "--algorithm",
            "blake3",
            "--block-size",
            "4096",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.dst, PathBuf::from("/d"));
        assert_eq!(args.src, PathBuf::from("/s"));
        assert!(args.keep_duplicates);
        assert!(args.simulate);
        assert!(matches!(args.identity, Some(IdentityArg::ContentOrPath)));
        assert!(matches!(args.algorithm, Some(AlgorithmArg::Blake3)));
        assert_eq!(args.block_size, Some(4096));
        assert!(args.report.is_none());
    }

    #[test]
    fn test_run_requires_both_roots() {
        assert!(Cli::try_parse_from(["dir-reconcile", "run", "--dst", "/d"]).is_err());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let result = Cli::try_parse_from([
            "dir-reconcile",
            "run",
            "--dst",
            "/d",
            "--src",
            "/s",
            "--block-size",
            "0",
        ]);
        assert!(result.is_err());
    }
}
