//! Server configuration

use clap::Parser;
use rust_decimal::Decimal;

use crate::{domain::PricingPolicy, error::Result};

/// Bookstore storefront server configuration
#[derive(Debug, Parser)]
#[command(name = "bookstore", about = "Bookstore storefront API server", long_about = None)]
pub struct Config {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8083")]
    pub port: u16,

    /// `PostgreSQL` connection string; without one the server keeps its data in memory
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value = "10")]
    pub database_max_connections: u32,

    /// NATS server for domain events
    #[arg(long, env = "NATS_URL")]
    pub nats_url: Option<String>,

    /// Bearer token for admin routes
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: String,

    /// Currency code shown to clients
    #[arg(long, env = "CURRENCY", default_value = "usd")]
    pub currency: String,

    /// Flat delivery charge for a non-empty order
    #[arg(long, env = "DELIVERY_CHARGE", default_value = "10")]
    pub delivery_charge: Decimal,

    /// Tax rate applied to the subtotal, between 0 and 1
    #[arg(long, env = "TAX_RATE", default_value = "0.05")]
    pub tax_rate: Decimal,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> std::result::Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The pricing policy shared by cart previews and checkout.
    pub fn pricing(&self) -> Result<PricingPolicy> {
        Ok(PricingPolicy::new(self.delivery_charge, self.tax_rate)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["bookstore", "--admin-token", "secret"]).unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:8083");
        assert_eq!(config.currency, "usd");
        assert_eq!(config.pricing().unwrap(), PricingPolicy::default());
    }

    #[test]
    fn test_invalid_tax_rate_is_rejected() {
        let config =
            Config::try_parse_from(["bookstore", "--admin-token", "secret", "--tax-rate", "1.5"]).unwrap();
        assert!(config.pricing().is_err());
    }
}
