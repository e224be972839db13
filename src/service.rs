use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::NaiveDate;
use serde::Serialize;
use tower::Service;
use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::mybca::MyBcaScraper;
use crate::traits::BankScraper;
use crate::types::BankTransaction;

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub user_id: String,
    pub password: String,
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    pub headless: bool,
}

impl ScrapeRequest {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            start_at: None,
            end_at: None,
            headless: true,
        }
    }

    /// 明細の取得期間を指定する。未指定なら表示中の既定明細を読む
    pub fn with_period(mut self, start_at: NaiveDate, end_at: NaiveDate) -> Self {
        self.start_at = Some(start_at);
        self.end_at = Some(end_at);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<ScrapeRequest> for ScraperConfig {
    fn from(req: ScrapeRequest) -> Self {
        ScraperConfig::new(req.user_id, req.password).with_headless(req.headless)
    }
}

/// スクレイピング結果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub user_id: String,
    pub account_balance: u64,
    pub transactions: Vec<BankTransaction>,
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // 将来的な拡張用（レートリミット、キャッシュなど）
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("スクレイピングリクエスト受信: user_id={}", req.user_id);

        Box::pin(async move {
            let user_id = req.user_id.clone();
            let (start_at, end_at) = (req.start_at, req.end_at);

            let config: ScraperConfig = req.into();
            let mut scraper = MyBcaScraper::new(config);

            let outcome = match scraper.execute(start_at, end_at).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    // 失敗後のセッション状態は不定なので強制的に閉じてから返す
                    warn!("スクレイピング失敗: {}", e);
                    let _ = scraper.close().await;
                    return Err(e);
                }
            };

            info!(
                "スクレイピング完了: {} 件 (残高 {})",
                outcome.transactions.len(),
                outcome.account_balance
            );

            Ok(ScrapeResult {
                user_id,
                account_balance: outcome.account_balance,
                transactions: outcome.transactions,
                start_at,
                end_at,
            })
        })
    }
}
