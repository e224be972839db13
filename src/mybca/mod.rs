//! myBCAポータル固有の実装
//!
//! セレクタ定義・カレンダー操作・明細抽出・セッション状態機械

pub mod calendar;
mod scraper;
mod selectors;
mod statement;

pub use scraper::MyBcaScraper;
pub use selectors::MyBcaPortal;

use crate::browser::BrowserDriver;
use crate::error::ScraperError;

/// 要素をクリックするだけのスニペット
pub(crate) const CLICK_FN: &str = "function(el) { el.click(); return true; }";

/// マッチした全要素をクリックする
pub(crate) const CLICK_ALL_FN: &str =
    "function(els) { for (var i = 0; i < els.length; i++) { els[i].click(); } return els.length; }";

/// innerTextを読む
pub(crate) const READ_TEXT_FN: &str = "function(el) { return el.innerText.trim(); }";

pub(crate) async fn read_text<B: BrowserDriver>(
    browser: &B,
    selector: &str,
) -> Result<String, ScraperError> {
    let value = browser.extract_one(selector, READ_TEXT_FN, &[]).await?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ScraperError::Extraction(format!("テキストが取得できません: {}", selector)))
}
