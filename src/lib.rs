//! myBCAインターネットバンキングスクレイパーライブラリ
//!
//! - ヘッドレスブラウザでmyBCAポータルへログインし、残高と取引明細を取得
//! - 取引はSHA-256の外部ID付き正規化レコード（重複排除キー）として返す
//!
//! # サービス経由の使用例
//!
//! ```rust,ignore
//! use bank_scraper_service::{ScrapeRequest, ScraperService};
//! use chrono::NaiveDate;
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("user_id", "pin_password")
//!         .with_period(
//!             NaiveDate::from_ymd_opt(2022, 10, 21).unwrap(),
//!             NaiveDate::from_ymd_opt(2022, 11, 21).unwrap(),
//!         )
//!         .with_headless(false);
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("Saldo: {}", result.account_balance);
//!     println!("Transactions: {}", result.transactions.len());
//! }
//! ```
//!
//! # スクレイパー直接利用例
//!
//! ```rust,ignore
//! use bank_scraper_service::{BankScraper, MyBcaScraper, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::new("user_id", "pin_password");
//!     let mut scraper = MyBcaScraper::new(config);
//!
//!     scraper.login().await.unwrap();
//!     let saldo = scraper.current_balance().await.unwrap();
//!     println!("Saldo: {}", saldo);
//!     scraper.close().await.unwrap();
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod mybca;
pub mod service;
pub mod traits;
pub mod types;

// 主要な型をリエクスポート
pub use browser::{BrowserDriver, ChromiumBrowser, LaunchOptions, WaitPolicy};
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use mybca::{MyBcaPortal, MyBcaScraper};
pub use service::{ScrapeRequest, ScrapeResult, ScraperService};
pub use traits::BankScraper;
pub use types::{BankTransaction, ScrapeOutcome, TransactionType};
