mod leetcode;
mod webhook;

pub use leetcode::LeetCodeClient;
pub use webhook::{Destination, Publisher};
