//! Server configuration
//!
//! Every knob is env-overridable with a sensible default.
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DB_PATH | /var/lib/comedor/data | Embedded database directory |
//! | LOG_LEVEL | info | Tracing level |
//! | LOG_DIR | (unset) | Daily-rolling log file directory |
//! | TIMEZONE | America/Santiago | Business timezone for week/cutoff math |
//! | PAYMENT_API_URL | http://localhost:3001 | Payment processor base URL |
//! | PAYMENT_API_KEY | (unset) | Bearer key for the payment processor |
//! | REQUEST_TIMEOUT_MS | 30000 | Outbound HTTP client timeout |
//! | PRICE_GUARDIAN_LUNCH | 4500 | Guardian lunch default price |
//! | PRICE_STAFF_LUNCH | 4875 | Staff lunch default price |
//! | PRICE_GUARDIAN_SIDE | 900 | Guardian side default price |
//! | PRICE_STAFF_SIDE | 1100 | Staff side default price |
//! | CURRENCY | CLP | ISO currency code sent to the gateway |
//! | DEFAULT_SIDES | (built-in) | "CODE:Description" pairs, comma separated |

use chrono_tz::Tz;
use shared::models::PriceTable;

/// Built-in default side-dish catalog, used when DEFAULT_SIDES is unset
const BUILTIN_DEFAULT_SIDES: &str = "ENS:Ensalada surtida,SOP:Sopa del día,FRU:Fruta de estación";

/// One entry of the default side-dish catalog
#[derive(Debug, Clone)]
pub struct DefaultSide {
    pub code: String,
    pub description: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Embedded database directory
    pub db_path: String,
    /// Tracing level: trace | debug | info | warn | error
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
    /// Business timezone, drives week and cutoff math
    pub timezone: Tz,
    /// Payment processor base URL
    pub payment_base_url: String,
    /// Bearer key for the payment processor
    pub payment_api_key: Option<String>,
    /// Outbound HTTP client timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// Per-category default prices
    pub prices: PriceTable,
    /// Default side-dish catalog for `apply_default_sides`
    pub default_sides: Vec<DefaultSide>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let prices = PriceTable {
            guardian_lunch: env_f64("PRICE_GUARDIAN_LUNCH", 4500.0),
            staff_lunch: env_f64("PRICE_STAFF_LUNCH", 4875.0),
            guardian_side: env_f64("PRICE_GUARDIAN_SIDE", 900.0),
            staff_side: env_f64("PRICE_STAFF_SIDE", 1100.0),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "CLP".into()),
        };

        let sides_raw =
            std::env::var("DEFAULT_SIDES").unwrap_or_else(|_| BUILTIN_DEFAULT_SIDES.into());

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "/var/lib/comedor/data".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::America::Santiago),
            payment_base_url: std::env::var("PAYMENT_API_URL")
                .unwrap_or_else(|_| "http://localhost:3001".into()),
            payment_api_key: std::env::var("PAYMENT_API_KEY").ok(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            prices,
            default_sides: parse_default_sides(&sides_raw),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse "CODE:Description,CODE:Description" pairs, skipping malformed entries
fn parse_default_sides(raw: &str) -> Vec<DefaultSide> {
    raw.split(',')
        .filter_map(|entry| {
            let (code, description) = entry.split_once(':')?;
            let code = code.trim();
            let description = description.trim();
            if code.is_empty() || description.is_empty() {
                return None;
            }
            Some(DefaultSide {
                code: code.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_side_catalog_parses() {
        let sides = parse_default_sides(BUILTIN_DEFAULT_SIDES);
        assert_eq!(sides.len(), 3);
        assert_eq!(sides[0].code, "ENS");
        assert_eq!(sides[1].description, "Sopa del día");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let sides = parse_default_sides("ENS:Ensalada,,bad,PUR:Puré");
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[1].code, "PUR");
    }
}
