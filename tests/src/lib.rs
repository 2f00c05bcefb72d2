//! Integration tests for runeterm

use runeterm_core::logging::{dev_config, prod_config, LogLevel};

pub mod chunking;
pub mod sgr_integration;
pub mod vt_scenarios;

#[test]
fn test_logging_configurations() {
    let dev_config = dev_config();
    assert_eq!(dev_config.global_level, LogLevel::Debug);
    assert!(!dev_config.json_format);
    assert!(dev_config.use_colors);

    let prod_config = prod_config();
    assert_eq!(prod_config.global_level, LogLevel::Info);
    assert!(prod_config.json_format);
    assert!(!prod_config.use_colors);
}
