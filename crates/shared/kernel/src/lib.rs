//! Kernel utilities shared across slices.
//! Keep this crate lightweight; today it only owns layered configuration loading.
//!
//! ## Config loading
//! ```rust,no_run
//! use vtl_kernel::config::load_config;
//! use vtl_kernel::domain::config::LaunchConfig;
//!
//! let cfg: LaunchConfig = load_config(None::<&str>).unwrap();
//! assert_eq!(cfg.launcher.program, "torchrun");
//! ```
pub mod config;

pub use vtl_domain as domain;
