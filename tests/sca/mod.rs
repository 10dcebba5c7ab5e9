//! End-to-end analysis of synthetic package trees.

mod batch;
mod cancellation;
mod config;
mod libraries;
mod options;
mod relatives;
mod scripts;
mod vendored;
mod views;
