// ==========================================
// 绩效评价管理系统 - 时钟抽象
// ==========================================
// 业务时区固定偏移 (默认 UTC+09:00); 截止时间比较按绝对时刻进行
// ==========================================

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// 默认业务时区偏移 (分钟)
pub const DEFAULT_BUSINESS_UTC_OFFSET_MINUTES: i32 = 540;

pub trait Clock: Send + Sync {
    /// 当前业务时间
    fn now(&self) -> DateTime<FixedOffset>;
}

// ==========================================
// BusinessClock - 系统时钟 (业务时区)
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// 按分钟偏移构造; 超出 ±24h 时返回 None
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_BUSINESS_UTC_OFFSET_MINUTES)
            .unwrap_or_else(|| Self::new(Utc.fix()))
    }
}

impl Clock for BusinessClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

// ==========================================
// FixedClock - 固定时刻 (测试/补跑)
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self { at }
    }

    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self::new(at.with_timezone(&Utc.fix()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }
}
