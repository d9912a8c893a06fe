//! Configuration template generation

const TEMPLATE: &str = r#"# metals-feed configuration
# Every key is optional; the values below are the defaults.
# Environment variables (INFLUX_HOST, INFLUX_PORT, INFLUX_DB, INFLUX_USER,
# INFLUX_PASSWORD, METALS_API_URL, METALS_POLL_INTERVAL_SECS) override them.

[influx]
# InfluxDB host name, or a full http(s):// URL
host = "localhost"

# InfluxDB HTTP API port
port = 8086

# Database the points are written to (created at startup if absent)
database = "metals_db"

# Optional credentials
# username = ""
# password = ""

[feed]
# Price API; "/price/{SYMBOL}" is appended to this URL
api_base_url = "https://api.gold-api.com"

# Seconds to sleep after each polling round
poll_interval_secs = 5

# Per-request timeout in seconds (unset = wait indefinitely)
# request_timeout_secs = 10

# What to do when writing a batch fails: "continue" or "abort"
on_store_error = "continue"

# Symbols polled each round, in this order
[[metals]]
symbol = "XAU"
name = "Gold"

[[metals]]
symbol = "XAG"
name = "Silver"

[[metals]]
symbol = "XPT"
name = "Platinum"

[[metals]]
symbol = "HG"
name = "Copper"
"#;

/// Configuration file with comments explaining each field
pub fn commented_config_template() -> &'static str {
    TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_template_matches_defaults() {
        let parsed: Config = toml::from_str(commented_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_template_documents_env_overrides() {
        let text = commented_config_template();
        for key in crate::config::ENV_KEYS {
            assert!(text.contains(key), "template does not mention {}", key);
        }
    }
}
