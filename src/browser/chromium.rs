//! chromiumoxide による本番ドライバ実装

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info};

use super::{BrowserDriver, LaunchOptions, WaitPolicy};
use crate::error::ScraperError;

pub struct ChromiumBrowser {
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
    wait_policy: WaitPolicy,
}

impl ChromiumBrowser {
    pub fn new() -> Self {
        Self {
            browser: None,
            page: None,
            wait_policy: WaitPolicy::default(),
        }
    }

    fn page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    /// セレクタをJS文字列リテラルへエスケープする
    fn js_literal(s: &str) -> String {
        Value::from(s).to_string()
    }

    /// 抽出スニペット共通部。結果はページ内で JSON.stringify してから
    /// 返し、Rust側でパースし直す
    fn extract_script(query: &str, js_fn: &str, args: &[Value]) -> String {
        let args_src: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let call_args = if args_src.is_empty() {
            String::new()
        } else {
            format!(", {}", args_src.join(", "))
        };

        format!(
            r#"(function() {{
    var target = {query};
    if (target === null) {{ return "__missing__"; }}
    return JSON.stringify(({js_fn})(target{call_args}));
}})()"#
        )
    }

    async fn run_extract(&self, selector: &str, script: String) -> Result<Value, ScraperError> {
        let page = self.page()?;
        let result = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Extraction(e.to_string()))?;

        let encoded = result
            .into_value::<String>()
            .map_err(|e| ScraperError::Extraction(format!("{}: {}", selector, e)))?;

        if encoded == "__missing__" {
            return Err(ScraperError::ElementNotFound(selector.to_string()));
        }

        serde_json::from_str(&encoded)
            .map_err(|e| ScraperError::Extraction(format!("{}: {}", selector, e)))
    }
}

impl Default for ChromiumBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserDriver for ChromiumBrowser {
    async fn launch(&mut self, options: &LaunchOptions) -> Result<(), ScraperError> {
        if self.browser.is_some() {
            // 再入時は既存セッションを破棄して作り直す
            self.close().await?;
        }

        info!("Launching browser...");

        let chrome_path = options
            .chrome_path
            .clone()
            .or_else(|| std::env::var("CHROME_PATH").ok())
            .or_else(|| std::env::var("CHROMIUM_PATH").ok())
            .unwrap_or_else(|| "chromium".to_string());

        let user_data_dir = match &options.user_data_dir {
            Some(dir) => dir.clone(),
            None => {
                let unique_id = format!(
                    "{}-{}",
                    std::process::id(),
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_nanos()
                );
                std::env::temp_dir().join(format!("mybca-scraper-{}", unique_id))
            }
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&user_data_dir);

        if !options.headless {
            builder = builder.with_head();
        }

        if let Some((width, height)) = options.window_size {
            builder = builder.window_size(width, height);
        }

        builder = builder
            .no_sandbox()
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        let config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));

        info!("Browser initialized successfully");
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let page = self.page()?;

        page.goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;

        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        let script = format!(
            "document.querySelector({}) !== null",
            Self::js_literal(selector)
        );
        let deadline = self.wait_policy.timeout.map(|t| Instant::now() + t);

        loop {
            let found = page
                .evaluate(script.as_str())
                .await
                .map_err(|e| ScraperError::Extraction(e.to_string()))?
                .into_value::<bool>()
                .unwrap_or(false);

            if found {
                return Ok(());
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ScraperError::ElementNotFound(format!(
                        "{} (待機タイムアウト)",
                        selector
                    )));
                }
            }

            tokio::time::sleep(self.wait_policy.poll_interval).await;
        }
    }

    async fn wait_for_navigation(&self) -> Result<(), ScraperError> {
        let page = self.page()?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        page.find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))?
            .type_str(text)
            .await
            .map_err(|e| ScraperError::Extraction(format!("{}: {}", selector, e)))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        page.find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScraperError::Extraction(format!("{}: {}", selector, e)))?;
        Ok(())
    }

    async fn extract_one(
        &self,
        selector: &str,
        js_fn: &str,
        args: &[Value],
    ) -> Result<Value, ScraperError> {
        let query = format!("document.querySelector({})", Self::js_literal(selector));
        let script = Self::extract_script(&query, js_fn, args);
        self.run_extract(selector, script).await
    }

    async fn extract_all(
        &self,
        selector: &str,
        js_fn: &str,
        args: &[Value],
    ) -> Result<Value, ScraperError> {
        let query = format!(
            "Array.prototype.slice.call(document.querySelectorAll({}))",
            Self::js_literal(selector)
        );
        let script = Self::extract_script(&query, js_fn, args);
        self.run_extract(selector, script).await
    }

    fn set_default_wait_policy(&mut self, policy: WaitPolicy) {
        self.wait_policy = policy;
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Failed to close browser: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_literal_escapes_quotes() {
        assert_eq!(
            ChromiumBrowser::js_literal("input[name='duration']"),
            r#""input[name='duration']""#
        );
        assert_eq!(
            ChromiumBrowser::js_literal(r#"a[title="x"]"#),
            r#""a[title=\"x\"]""#
        );
    }

    #[test]
    fn test_extract_script_passes_args() {
        let script = ChromiumBrowser::extract_script(
            "document.querySelector(\"table\")",
            "function(el, n) { return n; }",
            &[Value::from(7)],
        );
        assert!(script.contains("(target, 7)"));
        assert!(script.contains("__missing__"));
    }

    #[test]
    fn test_extract_script_without_args() {
        let script = ChromiumBrowser::extract_script(
            "document.querySelector(\"h5\")",
            "function(el) { return el.innerText; }",
            &[],
        );
        assert!(script.contains("(target)"));
    }
}
