//! Source domains handled by the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A business domain with its own raw shape and cleaning rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    DateEvents,
}

impl Domain {
    /// All domains in pipeline order.
    pub const ALL: [Domain; 6] = [
        Domain::Users,
        Domain::Cards,
        Domain::Stores,
        Domain::Products,
        Domain::Orders,
        Domain::DateEvents,
    ];

    /// Stable tag used in configuration and logs.
    pub fn code(self) -> &'static str {
        match self {
            Domain::Users => "users",
            Domain::Cards => "cards",
            Domain::Stores => "stores",
            Domain::Products => "products",
            Domain::Orders => "orders",
            Domain::DateEvents => "date-events",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Domain::Users => "Customer accounts",
            Domain::Cards => "Payment card details",
            Domain::Stores => "Store locations and staffing",
            Domain::Products => "Product catalogue",
            Domain::Orders => "Order facts",
            Domain::DateEvents => "Sale date and time events",
        }
    }

    /// Table name used when a job does not name its target table.
    pub fn default_target_table(self) -> &'static str {
        match self {
            Domain::Users => "dim_users",
            Domain::Cards => "dim_card_details",
            Domain::Stores => "dim_store_details",
            Domain::Products => "dim_products",
            Domain::Orders => "orders_table",
            Domain::DateEvents => "dim_date_times",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "users" | "user" => Ok(Domain::Users),
            "cards" | "card" | "carddetails" => Ok(Domain::Cards),
            "stores" | "store" | "storedetails" => Ok(Domain::Stores),
            "products" | "product" => Ok(Domain::Products),
            "orders" | "order" => Ok(Domain::Orders),
            "dateevents" | "dates" | "datetimes" | "datedetails" => Ok(Domain::DateEvents),
            _ => Err(ConfigError::UnknownDomain(s.to_string())),
        }
    }
}
