//! Background tasks driving the hub.

pub mod flush_ticker;
