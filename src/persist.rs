//! # persist
//!
//! The **persistence boundary**: a JSON snapshot of the watchlist — and only
//! the watchlist.  Load-on-start, save-on-change; every other store field is
//! ephemeral or derived and is never written here.
//!
//! Failures on this path are advisories: a dashboard that cannot save its
//! watchlist still works, it just forgets on restart.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::models::Stock;

/// Write the watchlist snapshot to `path`, atomically enough for a local
/// cache: write to a sibling temp file, then rename over the target.
pub async fn save_watchlist(path: &Path, watchlist: &[Stock]) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(watchlist).context("serialize watchlist")?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .with_context(|| format!("write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("rename into {}", path.display()))?;

    debug!(path = %path.display(), entries = watchlist.len(), "Watchlist snapshot saved");
    Ok(())
}

/// Load the watchlist snapshot from `path`.
///
/// A missing file is a normal first run and yields an empty watchlist; an
/// unreadable or unparseable file is reported to the caller.
pub async fn load_watchlist(path: &Path) -> anyhow::Result<Vec<Stock>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No watchlist snapshot yet — starting empty");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read {}", path.display()));
        }
    };

    let watchlist: Vec<Stock> =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;

    info!(path = %path.display(), entries = watchlist.len(), "Watchlist snapshot restored");
    Ok(watchlist)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stockdeck-{}-{name}.json", std::process::id()))
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let path = temp_path("roundtrip");
        let watchlist = vec![
            mock::generate("AAPL", "Apple Inc."),
            mock::generate("MSFT", "Microsoft Corporation"),
        ];

        save_watchlist(&path, &watchlist).await.unwrap();
        let restored = load_watchlist(&path).await.unwrap();

        assert_eq!(restored, watchlist);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_start() {
        let path = temp_path("missing");
        let restored = load_watchlist(&path).await.unwrap();
        assert!(restored.is_empty());
    }
}
