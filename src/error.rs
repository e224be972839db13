use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("カレンダー操作エラー: {0}")]
    CalendarNavigation(String),

    #[error("数値パースエラー: {0}")]
    Parse(String),

    #[error("DOM抽出エラー: {0}")]
    Extraction(String),
}
