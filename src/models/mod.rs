//! Data models for Lendstock entities

pub mod claims;
pub mod customer;
pub mod rental;
pub mod thing;
