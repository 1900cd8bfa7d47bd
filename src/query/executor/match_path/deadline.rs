//! 查询截止时间
//!
//! 执行器在每次状态转移和每一步遍历时轮询，超时后中止整个匹配。

use std::time::{Duration, Instant};

use crate::core::error::{DBResult, QueryError};

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

impl Deadline {
    /// 不限时
    pub fn none() -> Self {
        Self {
            started: Instant::now(),
            limit: None,
        }
    }

    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit: Some(limit),
        }
    }

    /// `0` 表示不限时
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::none()
        } else {
            Self::after(Duration::from_millis(ms))
        }
    }

    pub fn is_expired(&self) -> bool {
        self.limit
            .map(|limit| self.started.elapsed() >= limit)
            .unwrap_or(false)
    }

    pub fn check(&self) -> DBResult<()> {
        match self.limit {
            Some(limit) if self.started.elapsed() >= limit => Err(QueryError::Timeout {
                elapsed_ms: self.started.elapsed().as_millis() as u64,
                limit_ms: limit.as_millis() as u64,
            }
            .into()),
            _ => Ok(()),
        }
    }
}
