use async_trait::async_trait;
use chrono::NaiveDate;

use crate::browser::LaunchOptions;
use crate::error::ScraperError;
use crate::types::{BankTransaction, ScrapeOutcome};

#[async_trait]
pub trait BankScraper: Send + Sync {
    /// ブラウザ初期化
    async fn init_browser(&mut self, options: LaunchOptions) -> Result<(), ScraperError>;

    /// ログイン実行
    async fn login(&mut self) -> Result<(), ScraperError>;

    /// 現在残高の取得（最小通貨単位）
    async fn current_balance(&mut self) -> Result<u64, ScraperError>;

    /// 取引明細の取得。両端指定で期間検索、未指定なら表示中の既定明細
    async fn transactions(
        &mut self,
        start_at: Option<NaiveDate>,
        end_at: Option<NaiveDate>,
    ) -> Result<Vec<BankTransaction>, ScraperError>;

    /// ログアウト
    async fn logout(&mut self) -> Result<(), ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（login → 残高 → 明細 → logout → close）
    async fn execute(
        &mut self,
        start_at: Option<NaiveDate>,
        end_at: Option<NaiveDate>,
    ) -> Result<ScrapeOutcome, ScraperError> {
        self.login().await?;
        let account_balance = self.current_balance().await?;
        let transactions = self.transactions(start_at, end_at).await?;
        self.logout().await?;
        self.close().await?;
        Ok(ScrapeOutcome {
            account_balance,
            transactions,
        })
    }
}
