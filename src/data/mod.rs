//! Record content parsing module

pub mod contacts;
pub mod profile;
