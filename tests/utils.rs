#![allow(dead_code)]

use log::LevelFilter;
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn enable_logging() {
    LOGGER.call_once(logger_init)
}

fn logger_init() {
    env_logger::Builder::new()
        .filter(None, LevelFilter::Trace)
        .is_test(true)
        .init();
}
