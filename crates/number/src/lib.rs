//! Conversions between human readable decimal amounts and integer token
//! amounts denominated in the token's smallest unit.

pub mod display;
pub mod units;

pub use {
    display::format_short_amount,
    units::{ParseAmountError, format_units, parse_units},
};
