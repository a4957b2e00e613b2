use serde::Deserialize;

/// Limit/offset paging for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { limit: 20, offset: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        let p = PageParams { limit: 500, offset: -3 };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);

        let p = PageParams { limit: 0, offset: 10 };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 10);
    }
}
