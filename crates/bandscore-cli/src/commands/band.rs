//! The `bandscore band` command.

use anyhow::Result;
use serde_json::json;

use bandscore_core::band::{band_for_score, percentage};

pub fn execute(score: u32, total: u32, json: bool) -> Result<()> {
    let band = band_for_score(score, total)?;

    if json {
        let out = json!({
            "score": score,
            "total": total,
            "percentage": percentage(score, total),
            "band_score": band,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{score}/{total} ({:.1}%) -> band {band:.1}",
            percentage(score, total)
        );
    }
    Ok(())
}
