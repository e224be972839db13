//! myBCAスクレイパー本体（セッション状態機械）

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::try_join;
use tracing::info;

use super::selectors::MyBcaPortal;
use super::{calendar, read_text, statement, CLICK_ALL_FN, CLICK_FN};
use crate::browser::{BrowserDriver, ChromiumBrowser, LaunchOptions};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::BankScraper;
use crate::types::BankTransaction;

pub(crate) const BANK_CODE: &str = "BCA";

/// セッション状態
///
/// Uninitialized → BrowserReady → LoggedIn と進み、Closed へは
/// どの状態からでも遷移できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Uninitialized,
    BrowserReady,
    LoggedIn,
    Closed,
}

/// myBCAインターネットバンキングのスクレイパー
///
/// ブラウザは最初の操作で遅延起動される。失敗時のロールバックは行わない
/// ため、エラー後はセッション状態不定として `close` してから作り直すこと。
pub struct MyBcaScraper<B: BrowserDriver = ChromiumBrowser> {
    config: ScraperConfig,
    portal: MyBcaPortal,
    browser: B,
    state: SessionState,
}

impl MyBcaScraper<ChromiumBrowser> {
    pub fn new(config: ScraperConfig) -> Self {
        Self::with_browser(config, ChromiumBrowser::new())
    }
}

impl<B: BrowserDriver> MyBcaScraper<B> {
    /// 任意のドライバ実装で構築する（テストのフェイク差し替え口）
    pub fn with_browser(config: ScraperConfig, browser: B) -> Self {
        Self {
            config,
            portal: MyBcaPortal::default(),
            browser,
            state: SessionState::Uninitialized,
        }
    }

    pub fn with_portal(mut self, portal: MyBcaPortal) -> Self {
        self.portal = portal;
        self
    }

    fn launch_options(&self) -> LaunchOptions {
        LaunchOptions::default().with_headless(self.config.headless)
    }

    async fn ensure_logged_in(&mut self) -> Result<(), ScraperError> {
        if self.state != SessionState::LoggedIn {
            self.login().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<B: BrowserDriver> BankScraper for MyBcaScraper<B> {
    async fn init_browser(&mut self, options: LaunchOptions) -> Result<(), ScraperError> {
        info!("ブラウザを初期化中...");
        self.browser.launch(&options).await?;
        self.browser
            .set_default_wait_policy(self.config.wait_policy.clone());
        self.state = SessionState::BrowserReady;
        Ok(())
    }

    async fn login(&mut self) -> Result<(), ScraperError> {
        if matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Closed
        ) {
            let options = self.launch_options();
            self.init_browser(options).await?;
        }

        info!("ログイン処理開始...");
        self.browser.navigate(&self.portal.login_url).await?;

        // 3つのコントロールは互いに独立なのでまとめて待つ
        try_join!(
            self.browser.wait_for_element(&self.portal.input_user_id),
            self.browser.wait_for_element(&self.portal.input_password),
            self.browser.wait_for_element(&self.portal.submit_login_btn),
        )?;

        try_join!(
            self.browser
                .type_text(&self.portal.input_user_id, &self.config.user_id),
            self.browser
                .type_text(&self.portal.input_password, &self.config.password),
        )?;

        self.browser.click(&self.portal.submit_login_btn).await?;
        self.browser.wait_for_navigation().await?;

        // 遷移しただけでは成功とみなさない。ダッシュボード側の要素が
        // 現れるのを確認してからログイン済みにする
        self.browser
            .wait_for_element(&self.portal.balance_card)
            .await?;

        self.state = SessionState::LoggedIn;
        info!("ログイン完了");
        Ok(())
    }

    async fn current_balance(&mut self) -> Result<u64, ScraperError> {
        self.ensure_logged_in().await?;

        info!("残高取得開始...");
        self.browser.navigate(&self.portal.dashboard_url).await?;

        let unlock = format!(
            "{} {}",
            self.portal.balance_card, self.portal.unlock_balance_link
        );
        self.browser.wait_for_element(&unlock).await?;
        self.browser.extract_one(&unlock, CLICK_FN, &[]).await?;

        let balance_selector =
            format!("{} {}", self.portal.balance_card, self.portal.balance_text);
        self.browser.wait_for_element(&balance_selector).await?;
        let text = read_text(&self.browser, &balance_selector).await?;
        let balance = statement::parse_amount(&text)?;

        info!("残高取得完了: {}", balance);
        Ok(balance)
    }

    async fn transactions(
        &mut self,
        start_at: Option<NaiveDate>,
        end_at: Option<NaiveDate>,
    ) -> Result<Vec<BankTransaction>, ScraperError> {
        self.ensure_logged_in().await?;

        info!("取引明細取得開始...");
        self.browser.navigate(&self.portal.statement_url).await?;

        let range = match (start_at, end_at) {
            (Some(start), Some(end)) => {
                self.browser
                    .wait_for_element(&self.portal.duration_input)
                    .await?;
                self.browser
                    .extract_one(&self.portal.duration_input, CLICK_FN, &[])
                    .await?;

                calendar::select_date(&self.browser, &self.portal, start, true).await?;
                calendar::select_date(&self.browser, &self.portal, end, false).await?;

                self.browser
                    .wait_for_element(&self.portal.submit_statement_btn)
                    .await?;
                // 同一セレクタのボタンがDOM上に複数あるため全てクリックする
                self.browser
                    .extract_all(&self.portal.submit_statement_btn, CLICK_ALL_FN, &[])
                    .await?;

                Some((start, end))
            }
            // 片側でも欠けていれば表示中の既定明細をそのまま読む
            _ => None,
        };

        let transactions =
            statement::extract_transactions(&self.browser, &self.portal, BANK_CODE, range).await?;

        info!("取引明細取得完了: {} 件", transactions.len());
        Ok(transactions)
    }

    async fn logout(&mut self) -> Result<(), ScraperError> {
        if self.state != SessionState::LoggedIn {
            return Ok(());
        }

        info!("ログアウト処理開始...");
        self.browser.navigate(&self.portal.logout_url).await?;
        self.browser
            .wait_for_element(&self.portal.logout_btn)
            .await?;
        self.browser
            .extract_one(&self.portal.logout_btn, CLICK_FN, &[])
            .await?;

        // サーバ側セッションは破棄済みなので、次の操作は再ログインさせる
        self.state = SessionState::BrowserReady;
        info!("ログアウト完了");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        info!("ブラウザを終了中...");
        self.browser.close().await?;
        self.state = SessionState::Closed;
        Ok(())
    }
}
