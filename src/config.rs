use std::time::Duration;

use crate::browser::WaitPolicy;

/// スクレイパー設定
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub user_id: String,
    pub password: String,
    pub headless: bool,
    pub wait_policy: WaitPolicy,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            password: String::new(),
            headless: true,
            wait_policy: WaitPolicy::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// 要素・ナビゲーション待機の上限を設定する（既定は無制限）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.wait_policy.timeout = Some(timeout);
        self
    }

    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }
}
