//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use budgetbook_server::{ServerConfig, DEFAULT_TOKEN_TTL, JWT_SECRET_ENV, TOKEN_TTL_ENV};
use tracing::warn;

use super::open_db;

/// Environment variable listing allowed CORS origins (comma-separated)
pub const ALLOWED_ORIGINS_ENV: &str = "BUDGETBOOK_ALLOWED_ORIGINS";

/// Signing secret used only when auth is disabled and none is configured
const DEV_JWT_SECRET: &str = "budgetbook-dev-secret";

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Token lifetime from the environment value, falling back to the default
pub fn parse_token_ttl(value: Option<&str>) -> Result<i64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_TOKEN_TTL),
        Some(v) => {
            let ttl: i64 = v
                .parse()
                .with_context(|| format!("Invalid {} value: {}", TOKEN_TTL_ENV, v))?;
            if ttl <= 0 {
                anyhow::bail!("{} must be positive, got {}", TOKEN_TTL_ENV, ttl);
            }
            Ok(ttl)
        }
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    uploads_dir: &Path,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting BudgetBook web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Uploads: {}", uploads_dir.display());
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let allowed_origins = parse_origins(&std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default());
    let token_ttl_secs = parse_token_ttl(std::env::var(TOKEN_TTL_ENV).ok().as_deref())?;

    let mut jwt_secret = std::env::var(JWT_SECRET_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_default();

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
        if jwt_secret.is_empty() {
            // Login still issues tokens, they are just never required
            warn!("{} not set, signing tokens with a development secret", JWT_SECRET_ENV);
            jwt_secret = DEV_JWT_SECRET.to_string();
        }
    } else {
        println!("   🔒 Authentication: bearer tokens (expire after {}s)", token_ttl_secs);
    }
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} ({})",
            allowed_origins.join(", "),
            ALLOWED_ORIGINS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        jwt_secret,
        token_ttl_secs,
        uploads_dir: uploads_dir.to_path_buf(),
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;
    budgetbook_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
