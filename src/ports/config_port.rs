//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}

/// Config with no keys set; every lookup falls back to its default.
pub struct EmptyConfig;

impl ConfigPort for EmptyConfig {
    fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
        None
    }
    fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
        default
    }
    fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
        default
    }
}
