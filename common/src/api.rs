pub mod clients;
pub mod envelope;
pub mod tasks;

use serde::{Deserialize, Serialize};

/// Generic acknowledgement payload for write-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusAck {
    pub status: String,
}

impl StatusAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u64 {
    let page_size = page_size.max(1) as u64;
    total.div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_total_pages_zero_page_size() {
        assert_eq!(total_pages(5, 0), 5);
    }
}
