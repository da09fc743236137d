//! Offline signature authoring tool.
//!
//! Computes the average hash of a known sponsor banner and appends it to the
//! signature file consumed by the matcher:
//!
//! ```text
//! make-signature --name "naver-coop" --region top \
//!     --url https://example.com/banner.png \
//!     --out signatures.json
//! ```
//!
//! Either `--url` or `--file` must be given. The region recorded here is the
//! region the matcher will hash candidates with, so pick the part of the
//! banner that stays stable across campaigns.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use perceptual::Region;
use signatures::{Signature, SignatureStore};

#[derive(Parser, Debug)]
#[command(name = "make-signature", about = "Append a sponsor-banner signature")]
struct Args {
    /// Platform label stored with the signature.
    #[arg(long)]
    name: String,

    /// Region to hash: whole|left|right|top|bottom|x,y,w,h
    #[arg(long, default_value = "whole")]
    region: String,

    /// Remote image URL to fingerprint.
    #[arg(long)]
    url: Option<String>,

    /// Local image file to fingerprint.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Signature file to append to.
    #[arg(long, default_value = "signatures.json")]
    out: PathBuf,

    /// Optional operator note stored with the record.
    #[arg(long)]
    note: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let region: Region = args
        .region
        .parse()
        .with_context(|| format!("bad --region {:?}", args.region))?;

    let bytes = match (&args.url, &args.file) {
        (Some(url), None) => fetch_image(url).await?,
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        _ => bail!("exactly one of --url or --file is required"),
    };

    let hash = perceptual::average_hash(&bytes, region)?;

    let mut store = SignatureStore::load(&args.out)?;
    let mut signature = Signature::new(&args.name, region, hash);
    signature.note = args.note;
    store.push(signature);
    store.save(&args.out)?;

    println!(
        "added signature name={} region={} avgHash={} -> {} ({} total)",
        args.name,
        region,
        perceptual::to_hex(hash),
        args.out.display(),
        store.len(),
    );
    Ok(())
}

async fn fetch_image(url: &str) -> anyhow::Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0")
        .timeout(Duration::from_secs(10))
        .build()?;
    let response = client
        .get(url)
        .header(reqwest::header::REFERER, url)
        .send()
        .await
        .with_context(|| format!("fetching {url}"))?
        .error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
