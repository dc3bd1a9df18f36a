use serde::{Deserialize, Serialize};

/// Pagination defaults for coordinator action queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page length used when the caller gives none
    pub default_page_size: u32,
    /// Upper bound applied to any requested page length
    pub max_page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_page_size == 0 {
            return Err(anyhow::anyhow!("最大分页长度必须大于0"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(anyhow::anyhow!(
                "默认分页长度 {} 不能大于最大分页长度 {}",
                self.default_page_size,
                self.max_page_size
            ));
        }
        Ok(())
    }

    /// Clamp a requested page length to the configured maximum
    pub fn effective_len(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
