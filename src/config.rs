use std::{env, str::FromStr};

use anyhow::{Context, bail};

use crate::domain::{PricingRules, pricing::BPS_DENOMINATOR};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub commission_rate_bps: i64,
    pub tax_rate_bps: i64,
    pub shipping_fee: i64,
    pub free_shipping_threshold: i64,
    pub low_stock_threshold: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "APP_PORT", 3000)?;

        let config = Self {
            database_url,
            host,
            port,
            jwt_secret,
            commission_rate_bps: parse_or(&lookup, "COMMISSION_RATE_BPS", 1000)?,
            tax_rate_bps: parse_or(&lookup, "TAX_RATE_BPS", 800)?,
            shipping_fee: parse_or(&lookup, "SHIPPING_FEE", 500)?,
            free_shipping_threshold: parse_or(&lookup, "FREE_SHIPPING_THRESHOLD", 5000)?,
            low_stock_threshold: parse_or(&lookup, "LOW_STOCK_THRESHOLD", 5)?,
        };

        for (name, bps) in [
            ("COMMISSION_RATE_BPS", config.commission_rate_bps),
            ("TAX_RATE_BPS", config.tax_rate_bps),
        ] {
            if !(0..=BPS_DENOMINATOR).contains(&bps) {
                bail!("{name} must be between 0 and {BPS_DENOMINATOR}, got {bps}");
            }
        }
        if config.shipping_fee < 0 || config.free_shipping_threshold < 0 {
            bail!("shipping amounts must not be negative");
        }

        Ok(config)
    }

    pub fn pricing(&self) -> PricingRules {
        PricingRules {
            shipping_fee: self.shipping_fee,
            free_shipping_threshold: self.free_shipping_threshold,
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key} {raw:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/bazario"),
            ("JWT_SECRET", "secret"),
        ])
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.commission_rate_bps, 1000);
        assert_eq!(config.pricing().free_shipping_threshold, 5000);
        assert_eq!(config.low_stock_threshold, 5);
    }

    #[test]
    fn requires_secret_and_database() {
        assert!(config_from(&[("JWT_SECRET", "s")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "postgres://x")]).is_err());
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let err = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("COMMISSION_RATE_BPS", "12000"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("COMMISSION_RATE_BPS"));
    }

    #[test]
    fn rejects_garbage_numbers() {
        assert!(
            config_from(&[
                ("DATABASE_URL", "postgres://x"),
                ("JWT_SECRET", "s"),
                ("APP_PORT", "eighty"),
            ])
            .is_err()
        );
    }
}
