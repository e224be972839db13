//! ブラウザ自動化の抽象境界
//!
//! スクレイピングロジックはこの `BrowserDriver` だけを介してページを
//! 操作する。銀行固有の知識は持たせない。本番実装は [`ChromiumBrowser`]、
//! テストではインメモリのフェイクを差し込む。

mod chromium;

pub use chromium::ChromiumBrowser;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ScraperError;

/// 要素待機・ナビゲーション待機の既定ポリシー
///
/// `timeout: None` は無制限待機。本番利用では呼び出し側が明示的に
/// 上限を与えること。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl WaitPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Default::default()
        }
    }
}

/// ブラウザ起動オプション
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub window_size: Option<(u32, u32)>,
    /// 未指定なら一時ディレクトリにユニークなプロファイルを作る
    pub user_data_dir: Option<PathBuf>,
    /// 未指定なら CHROME_PATH / CHROMIUM_PATH 環境変数を参照する
    pub chrome_path: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: Some((1280, 800)),
            user_data_dir: None,
            chrome_path: None,
        }
    }
}

impl LaunchOptions {
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    pub fn with_user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }
}

/// ブラウザ自動化の最小サーフェス
///
/// DOMからの読み出しは `extract_one` / `extract_all` だけが正規の経路。
/// 渡すJS関数はマッチした要素（群）を第1引数に受け取り、追加引数は
/// `args` のJSON値がそのまま並ぶ。戻り値は `serde_json::Value` で返る。
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// ブラウザ/ページコンテキストを獲得する。再呼び出しは既存
    /// セッションを破棄して作り直す
    async fn launch(&mut self, options: &LaunchOptions) -> Result<(), ScraperError>;

    /// URLへ遷移し、読み込み完了条件まで待つ
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    /// セレクタに合致する要素がDOMに現れるまで待つ
    async fn wait_for_element(&self, selector: &str) -> Result<(), ScraperError>;

    /// 進行中のナビゲーションが完了するまで待つ
    async fn wait_for_navigation(&self) -> Result<(), ScraperError>;

    /// 要素へ文字列を入力する。要素が無ければ即エラー
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScraperError>;

    /// 要素をクリックする。要素が無ければ即エラー
    async fn click(&self, selector: &str) -> Result<(), ScraperError>;

    /// 最初に合致した1要素に対してJS関数を実行し結果を返す
    async fn extract_one(
        &self,
        selector: &str,
        js_fn: &str,
        args: &[Value],
    ) -> Result<Value, ScraperError>;

    /// 合致した全要素の配列に対してJS関数を実行し結果を返す
    async fn extract_all(
        &self,
        selector: &str,
        js_fn: &str,
        args: &[Value],
    ) -> Result<Value, ScraperError>;

    /// 待機ポリシーの既定値を差し替える
    fn set_default_wait_policy(&mut self, policy: WaitPolicy);

    /// 全リソースを解放する。解放済みなら何もしない
    async fn close(&mut self) -> Result<(), ScraperError>;
}
