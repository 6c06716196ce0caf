use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Platform business rules: deposit/withdrawal limits, fee rate and the
/// referral commission table. Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub min_deposit: Decimal,
    pub min_withdrawal: Decimal,
    pub withdrawal_fee_rate: Decimal,
    pub max_daily_withdrawals: u64,
    /// Commission rates indexed by referral level - 1.
    pub referral_rates: [Decimal; 3],
    pub max_referral_levels: usize,
    /// How often the earnings scheduler ticks.
    pub earnings_interval_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            min_deposit: dec!(3000),
            min_withdrawal: dec!(1000),
            withdrawal_fee_rate: dec!(0.06),
            max_daily_withdrawals: 3,
            referral_rates: [dec!(0.15), dec!(0.03), dec!(0.02)],
            max_referral_levels: 3,
            earnings_interval_secs: 300,
        }
    }
}

impl PlatformConfig {
    /// Commission rate for a 1-based referral level, None beyond the cap.
    pub fn rate_for_level(&self, level: usize) -> Option<Decimal> {
        if level == 0 || level > self.max_referral_levels {
            return None;
        }
        self.referral_rates.get(level - 1).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub platform: PlatformConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let defaults = PlatformConfig::default();
        let platform = PlatformConfig {
            min_deposit: parse_decimal("MIN_DEPOSIT", defaults.min_deposit)?,
            min_withdrawal: parse_decimal("MIN_WITHDRAWAL", defaults.min_withdrawal)?,
            withdrawal_fee_rate: parse_decimal(
                "WITHDRAWAL_FEE_RATE",
                defaults.withdrawal_fee_rate
            )?,
            max_daily_withdrawals: parse_u64(
                "MAX_DAILY_WITHDRAWALS",
                defaults.max_daily_withdrawals
            )?,
            referral_rates: [
                parse_decimal("REFERRAL_RATE_LEVEL1", defaults.referral_rates[0])?,
                parse_decimal("REFERRAL_RATE_LEVEL2", defaults.referral_rates[1])?,
                parse_decimal("REFERRAL_RATE_LEVEL3", defaults.referral_rates[2])?,
            ],
            max_referral_levels: defaults.max_referral_levels,
            earnings_interval_secs: parse_u64(
                "EARNINGS_INTERVAL_SECS",
                defaults.earnings_interval_secs
            )?,
        };

        Ok(Config {
            database_url,
            server_host,
            server_port,
            platform,
        })
    }
}

fn parse_decimal(key: &str, default: Decimal) -> Result<Decimal, Box<dyn std::error::Error>> {
    match env::var(key) {
        Ok(raw) => Decimal::from_str(raw.trim()).map_err(|_| {
            format!("{} must be a decimal number, got '{}'", key, raw).into()
        }),
        Err(_) => Ok(default),
    }
}

fn parse_u64(key: &str, default: u64) -> Result<u64, Box<dyn std::error::Error>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a positive integer, got '{}'", key, raw).into()),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platform_config() {
        let config = PlatformConfig::default();
        assert_eq!(config.min_deposit, dec!(3000));
        assert_eq!(config.min_withdrawal, dec!(1000));
        assert_eq!(config.withdrawal_fee_rate, dec!(0.06));
        assert_eq!(config.max_daily_withdrawals, 3);
    }

    #[test]
    fn test_rate_for_level() {
        // Rates follow the configured constants table: 15%, 3%, 2%
        let config = PlatformConfig::default();
        assert_eq!(config.rate_for_level(1), Some(dec!(0.15)));
        assert_eq!(config.rate_for_level(2), Some(dec!(0.03)));
        assert_eq!(config.rate_for_level(3), Some(dec!(0.02)));
        assert_eq!(config.rate_for_level(0), None);
        assert_eq!(config.rate_for_level(4), None);
    }
}
