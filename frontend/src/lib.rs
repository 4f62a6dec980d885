//! Vestora investment dashboard.
//!
//! A Yew single-page app over the browser's local storage. [`repository`]
//! holds the record store; [`views`] renders it.

pub mod config;
pub mod currency;
pub mod error;
pub mod geo;
pub mod logging;
pub mod models;
pub mod repository;
pub mod storage;
pub mod views;
