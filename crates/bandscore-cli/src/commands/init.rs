//! The `bandscore init` command.

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("bandscore.toml");
    if path.exists() {
        println!("bandscore.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG).context("failed to write bandscore.toml")?;
        println!("Created bandscore.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set OPENAI_API_KEY (or edit bandscore.toml)");
    println!("  2. Run: bandscore band --score 30 --total 40");
    println!("  3. Run: bandscore writing --task 2 --prompt \"...\" --essay essay.txt");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# bandscore configuration

default_provider = "openai"
model = "gpt-4"
temperature = 0.2
writing_max_tokens = 1500
speaking_max_tokens = 1200
timeout_secs = 30
max_retries = 0
retry_delay_ms = 1000
data_dir = "./bandscore-data"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;
