//! disc-inspect - developer tool for share tokens
//!
//! ## Usage
//!
//! - `disc-inspect decode <token|url>`: print the disc carried by a token
//! - `disc-inspect burn <draft.yaml>`: validate a draft and print its token
//! - `disc-inspect lookup <track id|link>`: resolve a track title
//!
//! Reads `~/.config/mixtape/config.yaml`; set `RUST_LOG=debug` for verbose
//! output.

use std::path::Path;

use anyhow::{bail, Context, Result};

use mixtape_core::config::{default_config_path, EngineConfig};
use mixtape_core::disc::codec::{decode_detailed, encode, share_url, to_json, token_from_url};
use mixtape_core::disc::DiscDraft;
use mixtape_core::metadata::{MetadataClient, MetadataService, OembedLookup};
use mixtape_core::track::extract_track_id;

const USAGE: &str = "usage: disc-inspect <decode TOKEN|URL | burn DRAFT.yaml | lookup TRACK>";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = EngineConfig::load(&default_config_path());

    match args.as_slice() {
        [cmd, token] if cmd == "decode" => decode_cmd(token),
        [cmd, path] if cmd == "burn" => burn_cmd(Path::new(path), &config),
        [cmd, track] if cmd == "lookup" => lookup_cmd(track, &config),
        _ => bail!(USAGE),
    }
}

fn decode_cmd(input: &str) -> Result<()> {
    let disc = decode_detailed(token_from_url(input.trim()))
        .context("Token does not contain a disc")?;

    log::info!(
        "Decoded {:?} from {} ({} tracks, {} photos)",
        disc.meta.title,
        disc.meta.sender,
        disc.track_count(),
        disc.photos.len()
    );
    println!("{}", to_json(&disc, true)?);
    Ok(())
}

fn burn_cmd(path: &Path, config: &EngineConfig) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft: {:?}", path))?;
    let draft: DiscDraft = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse draft: {:?}", path))?;

    let disc = draft.press().context("Draft rejected")?;
    let token = encode(&disc)?;
    println!("{}", token);

    if let Some(base) = config.share.base_url.as_deref() {
        println!("{}", share_url(base, &disc)?);
    }
    Ok(())
}

fn lookup_cmd(input: &str, config: &EngineConfig) -> Result<()> {
    let Some(track_id) = extract_track_id(input) else {
        bail!("Not a track link or id: {}", input);
    };

    let service = MetadataService::spawn(Box::new(OembedLookup::new(&config.metadata)))
        .map_err(anyhow::Error::msg)?;
    let client = MetadataClient::new(&service);

    let result = client.resolve_blocking(&track_id);
    client.shutdown();
    service.join();

    let info = result.with_context(|| format!("Lookup failed for {}", track_id))?;
    println!("{}", info.title);
    if let Some(author) = info.author {
        println!("by {}", author);
    }
    Ok(())
}
