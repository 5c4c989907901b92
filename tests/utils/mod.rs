#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;
use transaction_tracker::asset::Asset;
use transaction_tracker::config::WaitConfig;
use transaction_tracker::types::{Authorization, TrackingMode, Transfer};

pub fn transfer(from: &str, to: &str) -> Transfer {
    Transfer {
        from: from.to_string(),
        to: to.to_string(),
        quantity: Asset::from_str("1.0000 SYS").unwrap(),
        memo: "test".to_string(),
        authorization: Authorization::active(from),
    }
}

pub fn wait_config(mode: TrackingMode, timeout_secs: u64, poll_interval_millis: u64) -> WaitConfig {
    WaitConfig::new(
        mode,
        timeout_secs,
        Duration::from_millis(poll_interval_millis),
    )
    .unwrap()
}
