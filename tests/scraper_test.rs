//! フェイクドライバによる結合テスト
//!
//! ポータルの振る舞い（年レンジのページ送り・明細テーブル・残高カード）を
//! インメモリでモデル化し、実ブラウザなしでスクレイパー全体を検証する。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use serde_json::{json, Value};

use bank_scraper_service::mybca::calendar;
use bank_scraper_service::{
    BankScraper, BrowserDriver, LaunchOptions, MyBcaPortal, MyBcaScraper, ScraperConfig,
    ScraperError, TransactionType, WaitPolicy,
};

/// 年レンジページ1枚あたりの表示年数
const PAGE_SPAN: i32 = 12;

#[derive(Debug)]
struct FakeState {
    launched: u32,
    closed: u32,
    navigations: Vec<String>,
    typed: Vec<(String, String)>,
    clicks: Vec<String>,

    // 年レンジピッカーのモデル
    range_start: i32,
    range_end: i32,
    min_year: i32,
    max_year: i32,
    nav_clicks: u32,
    pending_year: Option<i32>,
    pending_month: Option<String>,
    selected_dates: Vec<(i32, String, u32)>,
    disabled_months: HashSet<String>,
    disabled_days: HashSet<u32>,

    // 明細・残高のモデル
    rows: Value,
    account_num: String,
    balance_text: String,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            launched: 0,
            closed: 0,
            navigations: Vec::new(),
            typed: Vec::new(),
            clicks: Vec::new(),

            range_start: 2016,
            range_end: 2027,
            min_year: 1992,
            max_year: 2039,
            nav_clicks: 0,
            pending_year: None,
            pending_month: None,
            selected_dates: Vec::new(),
            disabled_months: HashSet::new(),
            disabled_days: HashSet::new(),

            rows: json!([]),
            account_num: "1234567890".to_string(),
            balance_text: "Rp 5.000.000,00".to_string(),
        }
    }
}

struct FakeBrowser {
    portal: MyBcaPortal,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    fn new() -> (Self, Arc<Mutex<FakeState>>) {
        Self::with_state(FakeState::default())
    }

    fn with_state(state: FakeState) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                portal: MyBcaPortal::default(),
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    async fn launch(&mut self, _options: &LaunchOptions) -> Result<(), ScraperError> {
        self.state.lock().unwrap().launched += 1;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        self.state.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_for_element(&self, _selector: &str) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), ScraperError> {
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ScraperError> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), ScraperError> {
        self.state.lock().unwrap().clicks.push(selector.to_string());
        Ok(())
    }

    async fn extract_one(
        &self,
        selector: &str,
        _js_fn: &str,
        args: &[Value],
    ) -> Result<Value, ScraperError> {
        let portal = &self.portal;
        let balance_selector = format!("{} {}", portal.balance_card, portal.balance_text);
        let unlock_selector = format!("{} {}", portal.balance_card, portal.unlock_balance_link);
        let reveal_selector = format!("{} {}", portal.date_range_picker, portal.inner_year_btn);
        let prev_selector = format!("{}previous", portal.nav_btn_prefix);
        let next_selector = format!("{}next", portal.nav_btn_prefix);

        let mut state = self.state.lock().unwrap();

        if selector == portal.cur_year_range_btn {
            return Ok(json!(format!(
                "{} - {}",
                state.range_start, state.range_end
            )));
        }
        if selector == prev_selector {
            if state.range_start > state.min_year {
                state.range_start -= PAGE_SPAN;
                state.range_end -= PAGE_SPAN;
                state.nav_clicks += 1;
                return Ok(json!(true));
            }
            return Ok(json!(false));
        }
        if selector == next_selector {
            if state.range_end < state.max_year {
                state.range_start += PAGE_SPAN;
                state.range_end += PAGE_SPAN;
                state.nav_clicks += 1;
                return Ok(json!(true));
            }
            return Ok(json!(false));
        }
        if selector == portal.year_table {
            let year = args[0].as_i64().unwrap() as i32;
            if year >= state.range_start && year <= state.range_end {
                state.pending_year = Some(year);
                return Ok(json!(true));
            }
            return Ok(json!(false));
        }
        if selector == portal.month_table {
            let name = args[0].as_str().unwrap().to_string();
            if state.disabled_months.contains(&name) {
                return Ok(json!(false));
            }
            state.pending_month = Some(name);
            return Ok(json!(true));
        }
        if selector == portal.day_table {
            let day = args[0].as_u64().unwrap() as u32;
            if state.disabled_days.contains(&day) {
                return Ok(json!(false));
            }
            let year = state.pending_year.take().unwrap_or_default();
            let month = state.pending_month.take().unwrap_or_default();
            state.selected_dates.push((year, month, day));
            return Ok(json!(true));
        }
        if selector == balance_selector {
            return Ok(json!(state.balance_text.clone()));
        }
        if selector == portal.account_num {
            return Ok(json!(state.account_num.clone()));
        }
        if selector == portal.transaction_table {
            return Ok(state.rows.clone());
        }
        if selector == unlock_selector
            || selector == reveal_selector
            || selector == portal.duration_input
            || selector == portal.logout_btn
        {
            state.clicks.push(selector.to_string());
            return Ok(json!(true));
        }

        Ok(json!(true))
    }

    async fn extract_all(
        &self,
        selector: &str,
        _js_fn: &str,
        _args: &[Value],
    ) -> Result<Value, ScraperError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(format!("all:{}", selector));
        Ok(json!(2))
    }

    fn set_default_wait_policy(&mut self, _policy: WaitPolicy) {}

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn scraper_with(state: FakeState) -> (MyBcaScraper<FakeBrowser>, Arc<Mutex<FakeState>>) {
    let (fake, handle) = FakeBrowser::with_state(state);
    let scraper = MyBcaScraper::with_browser(ScraperConfig::new("someone", "secret"), fake);
    (scraper, handle)
}

#[tokio::test]
async fn calendar_paginates_backward_to_start_year() {
    let (fake, state) = FakeBrowser::new();
    let portal = MyBcaPortal::default();

    calendar::select_date(&fake, &portal, date(2002, 5, 10), true)
        .await
        .unwrap();

    let state = state.lock().unwrap();
    // 2016-2027 → 2004-2015 → 1992-2003 でちょうど2ページ
    assert_eq!(state.nav_clicks, 2);
    assert_eq!(state.selected_dates, vec![(2002, "Mei".to_string(), 10)]);
}

#[tokio::test]
async fn calendar_paginates_forward_to_end_year() {
    let (fake, state) = FakeBrowser::new();
    let portal = MyBcaPortal::default();

    calendar::select_date(&fake, &portal, date(2035, 10, 21), false)
        .await
        .unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.nav_clicks, 1);
    assert_eq!(state.selected_dates, vec![(2035, "Oktober".to_string(), 21)]);
}

#[tokio::test]
async fn calendar_stops_at_pagination_boundary() {
    let mut init = FakeState::default();
    // これ以上過去のページが無い状態
    init.min_year = init.range_start;
    let (fake, _state) = FakeBrowser::with_state(init);
    let portal = MyBcaPortal::default();

    let err = calendar::select_date(&fake, &portal, date(2010, 1, 15), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::CalendarNavigation(_)));
}

#[tokio::test]
async fn calendar_rejects_disabled_month() {
    let mut init = FakeState::default();
    init.disabled_months.insert("Desember".to_string());
    let (fake, _state) = FakeBrowser::with_state(init);
    let portal = MyBcaPortal::default();

    let err = calendar::select_date(&fake, &portal, date(2022, 12, 5), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::CalendarNavigation(_)));
}

#[tokio::test]
async fn calendar_rejects_disabled_day() {
    let mut init = FakeState::default();
    init.disabled_days.insert(31);
    let (fake, _state) = FakeBrowser::with_state(init);
    let portal = MyBcaPortal::default();

    let err = calendar::select_date(&fake, &portal, date(2022, 1, 31), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::CalendarNavigation(_)));
}

#[tokio::test]
async fn balance_triggers_login_first() {
    let (mut scraper, state) = scraper_with(FakeState::default());

    let balance = scraper.current_balance().await.unwrap();
    assert_eq!(balance, 5_000_000);

    let state = state.lock().unwrap();
    let portal = MyBcaPortal::default();
    assert_eq!(state.launched, 1);
    assert_eq!(state.navigations[0], portal.login_url);
    assert!(state.navigations.contains(&portal.dashboard_url));
    assert!(state
        .typed
        .iter()
        .any(|(sel, text)| sel == &portal.input_user_id && text == "someone"));
    assert!(state
        .typed
        .iter()
        .any(|(sel, text)| sel == &portal.input_password && text == "secret"));
    assert!(state.clicks.contains(&portal.submit_login_btn));
}

#[tokio::test]
async fn logout_before_login_is_noop() {
    let (mut scraper, state) = scraper_with(FakeState::default());

    scraper.logout().await.unwrap();

    let state = state.lock().unwrap();
    assert!(state.navigations.is_empty());
    assert!(state.clicks.is_empty());
}

#[tokio::test]
async fn logout_forces_relogin_on_next_call() {
    let mut init = FakeState::default();
    init.rows = json!([]);
    let (mut scraper, state) = scraper_with(init);

    scraper.login().await.unwrap();
    scraper.logout().await.unwrap();
    scraper.transactions(None, None).await.unwrap();

    let state = state.lock().unwrap();
    let portal = MyBcaPortal::default();
    let logins = state
        .navigations
        .iter()
        .filter(|url| *url == &portal.login_url)
        .count();
    assert_eq!(logins, 2);
}

#[tokio::test]
async fn two_row_statement_normalizes_in_order() {
    let mut init = FakeState::default();
    init.rows = json!([
        {"date": "21/10", "description": "Groceries", "amount": "50000", "credit": true},
        {"date": "22/10", "description": "Transfer", "amount": "20000", "credit": false},
    ]);
    let (mut scraper, _state) = scraper_with(init);

    let transactions = scraper.transactions(None, None).await.unwrap();

    assert_eq!(transactions.len(), 2);

    assert_eq!(transactions[0].bank_code, "BCA");
    assert_eq!(transactions[0].transaction_name, "Groceries");
    assert_eq!(transactions[0].transaction_type, TransactionType::Credit);
    assert_eq!(transactions[0].transaction_amount, 50000);

    assert_eq!(transactions[1].transaction_name, "Transfer");
    assert_eq!(transactions[1].transaction_type, TransactionType::Debit);
    assert_eq!(transactions[1].transaction_amount, 20000);

    // 口座番号は1回の取得内で共通
    assert_eq!(transactions[0].account_num, "1234567890");
    assert_eq!(transactions[1].account_num, "1234567890");

    // 年はポータルに出ないため現在年で補完される
    let year = Local::now().year();
    assert_eq!(transactions[0].transaction_date, date(year, 10, 21));
    assert_eq!(transactions[1].transaction_date, date(year, 10, 22));

    // 外部IDは互いに異なり、同一内容からは常に同じ値が出る
    assert_ne!(transactions[0].external_id, transactions[1].external_id);
    let expected = bank_scraper_service::types::external_id(
        "BCA",
        "1234567890",
        transactions[0].transaction_date,
        TransactionType::Credit,
        50000,
        "Groceries",
    );
    assert_eq!(transactions[0].external_id, expected);
}

#[tokio::test]
async fn ranged_query_drives_calendar_and_submit() {
    let mut init = FakeState::default();
    init.rows = json!([
        {"date": "28/12", "description": "Yearend", "amount": "10000", "credit": false},
        {"date": "03/01", "description": "Newyear", "amount": "15000", "credit": false},
    ]);
    let (mut scraper, state) = scraper_with(init);

    let start = date(2022, 12, 20);
    let end = date(2023, 1, 5);
    let transactions = scraper.transactions(Some(start), Some(end)).await.unwrap();

    {
        let state = state.lock().unwrap();
        let portal = MyBcaPortal::default();
        assert_eq!(
            state.selected_dates,
            vec![
                (2022, "Desember".to_string(), 20),
                (2023, "Januari".to_string(), 5),
            ]
        );
        assert!(state
            .clicks
            .iter()
            .any(|c| c == &format!("all:{}", portal.submit_statement_btn)));
    }

    // 年境界をまたぐ期間では行ごとに適切な年が付く
    assert_eq!(transactions[0].transaction_date, date(2022, 12, 28));
    assert_eq!(transactions[1].transaction_date, date(2023, 1, 3));
}

#[tokio::test]
async fn unparsable_amount_surfaces_parse_error() {
    let mut init = FakeState::default();
    init.rows = json!([
        {"date": "21/10", "description": "Broken", "amount": "Rp -", "credit": false},
    ]);
    let (mut scraper, _state) = scraper_with(init);

    let err = scraper.transactions(None, None).await.unwrap_err();
    assert!(matches!(err, ScraperError::Parse(_)));
}

#[tokio::test]
async fn execute_runs_full_pipeline() {
    let mut init = FakeState::default();
    init.rows = json!([
        {"date": "21/10", "description": "Groceries", "amount": "50000", "credit": true},
    ]);
    let (mut scraper, state) = scraper_with(init);

    let outcome = scraper.execute(None, None).await.unwrap();
    assert_eq!(outcome.account_balance, 5_000_000);
    assert_eq!(outcome.transactions.len(), 1);

    let state = state.lock().unwrap();
    let portal = MyBcaPortal::default();
    assert!(state.clicks.contains(&portal.logout_btn));
    assert_eq!(state.closed, 1);
}

#[tokio::test]
async fn close_twice_is_idempotent() {
    let (mut scraper, state) = scraper_with(FakeState::default());

    scraper.login().await.unwrap();
    scraper.close().await.unwrap();
    scraper.close().await.unwrap();

    assert_eq!(state.lock().unwrap().closed, 1);
}
