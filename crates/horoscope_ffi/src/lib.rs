//! Flutter-facing bindings for the horoscope core.

pub mod api;
