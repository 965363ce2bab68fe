//! Party-service quote pricing.
//!
//! A quote is three independent selections (event hours, guest count,
//! bartender count), each mapped to a fixed contribution in reais. The total
//! is the plain sum. Unknown or missing selections contribute zero, so
//! [`price`] is total over its input and never negative.

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Event duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoursTier {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

impl HoursTier {
    /// Parse the selection key (`"3"`, `"4"`, `"5"`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "3" => Some(Self::Three),
            "4" => Some(Self::Four),
            "5" => Some(Self::Five),
            _ => None,
        }
    }

    /// Selection key as shown on the quote form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
        }
    }

    /// Contribution to the quote.
    #[must_use]
    pub fn price(self) -> Price {
        Price::from_reais(match self {
            Self::Three => 200,
            Self::Four => 300,
            Self::Five => 400,
        })
    }
}

/// Guest count bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuestTier {
    #[serde(rename = "50")]
    Fifty,
    #[serde(rename = "100")]
    Hundred,
    #[serde(rename = ">100")]
    OverHundred,
}

impl GuestTier {
    /// Parse the selection key (`"50"`, `"100"`, `">100"`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "50" => Some(Self::Fifty),
            "100" => Some(Self::Hundred),
            ">100" => Some(Self::OverHundred),
            _ => None,
        }
    }

    /// Selection key as shown on the quote form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fifty => "50",
            Self::Hundred => "100",
            Self::OverHundred => ">100",
        }
    }

    /// Contribution to the quote.
    #[must_use]
    pub fn price(self) -> Price {
        Price::from_reais(match self {
            Self::Fifty => 500,
            Self::Hundred => 700,
            Self::OverHundred => 1_000,
        })
    }
}

/// Bartender count bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BartenderTier {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = ">2")]
    OverTwo,
}

impl BartenderTier {
    /// Parse the selection key (`"1"`, `"2"`, `">2"`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            ">2" => Some(Self::OverTwo),
            _ => None,
        }
    }

    /// Selection key as shown on the quote form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::OverTwo => ">2",
        }
    }

    /// Contribution to the quote.
    #[must_use]
    pub fn price(self) -> Price {
        Price::from_reais(match self {
            Self::One => 150,
            Self::Two => 250,
            Self::OverTwo => 400,
        })
    }
}

/// The three quote selections. Any of them may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSelection {
    pub hours: Option<HoursTier>,
    pub guests: Option<GuestTier>,
    pub bartenders: Option<BartenderTier>,
}

impl TierSelection {
    /// Build a selection from raw form keys. Unrecognized keys become `None`.
    #[must_use]
    pub fn from_keys(hours: &str, guests: &str, bartenders: &str) -> Self {
        Self {
            hours: HoursTier::from_key(hours),
            guests: GuestTier::from_key(guests),
            bartenders: BartenderTier::from_key(bartenders),
        }
    }

    /// Whether all three selections are set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.hours.is_some() && self.guests.is_some() && self.bartenders.is_some()
    }
}

/// Quote total for `selection`.
///
/// ```
/// use open_bar_core::{TierSelection, price, Price};
///
/// let selection = TierSelection::from_keys("3", "50", "1");
/// assert_eq!(price(&selection), Price::from_reais(850));
/// ```
#[must_use]
pub fn price(selection: &TierSelection) -> Price {
    let hours = selection.hours.map_or_else(Price::zero, HoursTier::price);
    let guests = selection.guests.map_or_else(Price::zero, GuestTier::price);
    let bartenders = selection
        .bartenders
        .map_or_else(Price::zero, BartenderTier::price);
    hours + guests + bartenders
}
