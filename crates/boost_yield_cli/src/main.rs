//! boost-yield CLI: claimable, bundle, verify.

use boost_yield::boost::{AccrualInput, YieldConfig};
use boost_yield::compute::{accrue_input, format_units, AccrualOutcome};
use boost_yield::verify::{reproducibility_hash, verify_bundle, EvidenceBundle};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Claimable(args) => run_claimable(args),
        Command::Bundle(args) => run_bundle(args),
        Command::Verify(args) => run_verify(args),
    }
}

#[derive(Parser)]
#[command(name = "boost-yield")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Claimable yield for a boost stake, recomputed from account snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the claimable amount from a snapshot file.
    Claimable(ClaimableArgs),
    /// Compute and write an evidence bundle with its hash.
    Bundle(BundleArgs),
    /// Verify a bundle's claim and reproducibility hash.
    Verify(VerifyArgs),
}

#[derive(Parser)]
struct ClaimableArgs {
    /// JSON file with boost_config, boost, boost_proof and stake snapshots.
    #[arg(long)]
    input: PathBuf,
    /// Display decimals; defaults to the config file value.
    #[arg(long)]
    decimals: Option<u8>,
    /// Print every intermediate value as JSON.
    #[arg(long)]
    explain: bool,
}

#[derive(Parser)]
struct BundleArgs {
    #[arg(long)]
    input: PathBuf,
    /// Bundle identifier, e.g. the stake account address.
    #[arg(long)]
    label: String,
    #[arg(long, default_value = "./reports")]
    out_dir: PathBuf,
}

#[derive(Parser)]
struct VerifyArgs {
    #[arg(long)]
    bundle: PathBuf,
}

fn run_claimable(args: ClaimableArgs) -> Result<(), Box<dyn std::error::Error>> {
    let decimals = args
        .decimals
        .unwrap_or_else(|| YieldConfig::load().display_decimals);
    let input = AccrualInput::load_from_path(&args.input)?;
    let breakdown = accrue_input(&input)?;
    if let AccrualOutcome::Unsynced(reason) = breakdown.outcome {
        warn!(?reason, "stake not synced; only stored rewards are claimable");
    }
    if args.explain {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    }
    println!(
        "{}\t{}",
        breakdown.claimable,
        format_units(breakdown.claimable, decimals)
    );
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = AccrualInput::load_from_path(&args.input)?;
    let bundle = EvidenceBundle::build(args.label.clone(), input)?;
    let hash = reproducibility_hash(&bundle)?;
    std::fs::create_dir_all(&args.out_dir)?;
    let label_suffix = args
        .label
        .chars()
        .take(44)
        .collect::<String>()
        .replace([' ', ':', '/'], "_");
    let bundle_path = args.out_dir.join(format!("{}.bundle.json", label_suffix));
    let hash_path = args.out_dir.join(format!("{}.sha256", label_suffix));
    std::fs::write(&bundle_path, serde_json::to_string_pretty(&bundle)?)?;
    std::fs::write(&hash_path, format!("{}\n", hash))?;
    info!(
        claimable = bundle.claimable(),
        ?bundle_path,
        ?hash_path,
        "bundle complete"
    );
    println!("{}", hash);
    Ok(())
}

/// `<dir>/<label>.bundle.json` pairs with `<dir>/<label>.sha256`.
fn sha256_path_for(bundle: &Path) -> PathBuf {
    let name = bundle
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let stem = name
        .strip_suffix(".bundle.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(&name);
    bundle
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{}.sha256", stem))
}

fn run_verify(args: VerifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bundle_json = std::fs::read_to_string(&args.bundle)?;
    let bundle: EvidenceBundle = serde_json::from_str(&bundle_json)?;
    let expected = std::fs::read_to_string(sha256_path_for(&args.bundle))
        .ok()
        .map(|s| s.trim().to_string());
    let result = verify_bundle(&bundle, expected.as_deref())?;
    if result.matches() && result.expected_hash.is_some() {
        println!("OK\t{}", result.bundle_hash);
    } else {
        eprintln!(
            "MISMATCH\tcomputed={}\texpected={:?}\tclaimable stored={} recomputed={}",
            result.bundle_hash,
            result.expected_hash,
            bundle.claimable(),
            result.recomputed_claimable
        );
        std::process::exit(1);
    }
    Ok(())
}
