//! 日付レンジピッカー操作
//!
//! myBCAの明細検索は年→月→日の3段グリッドを持つページング式の
//! ピッカーで期間を指定する。表示中の年レンジを読み取り、目的の年が
//! 見えるまでページ送りしてから各セルをクリックしていく。

use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};
use tracing::debug;

use super::selectors::MyBcaPortal;
use super::{read_text, CLICK_FN};
use crate::browser::BrowserDriver;
use crate::error::ScraperError;

/// ポータルが表示するインドネシア語の月名
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// disabledでなければクリックしてtrueを返す
const CLICK_IF_ENABLED_FN: &str = r#"function(el) {
    if (el.getAttribute('disabled') === null) {
        el.click();
        return true;
    }
    return false;
}"#;

const SELECT_YEAR_FN: &str = r#"function(el, year) {
    var tds = el.querySelectorAll('tbody td');
    for (var i = 0; i < tds.length; i++) {
        if (parseInt(tds[i].innerText, 10) === year) {
            tds[i].click();
            return true;
        }
    }
    return false;
}"#;

const SELECT_MONTH_FN: &str = r#"function(el, name) {
    var tds = el.querySelectorAll('tbody td');
    for (var i = 0; i < tds.length; i++) {
        if (tds[i].innerText.trim() === name && !tds[i].classList.contains('disabled')) {
            tds[i].click();
            return true;
        }
    }
    return false;
}"#;

const SELECT_DAY_FN: &str = r#"function(el, day) {
    var tds = el.querySelectorAll('tbody td');
    for (var i = 0; i < tds.length; i++) {
        var td = tds[i];
        if (td.innerText.trim() === String(day) && !td.querySelector('span.disabled')) {
            var span = td.querySelector('span');
            (span !== null ? span : td).click();
            return true;
        }
    }
    return false;
}"#;

/// レンジ境界（開始または終端）の日付をピッカー上で選択する
///
/// 開始境界は「前へ」、終端境界は「次へ」でページ送りする。同じ
/// ウィジェットに対して開始・終端の順に2回呼ばれるため、終了時には
/// 次回呼び出しの年レンジ読み取りが成立する状態を保つ。
pub async fn select_date<B: BrowserDriver>(
    browser: &B,
    portal: &MyBcaPortal,
    target: NaiveDate,
    is_range_start: bool,
) -> Result<(), ScraperError> {
    browser.wait_for_element(&portal.date_range_picker).await?;

    // インラインカレンダーを開き、年レンジページへ
    let reveal = format!("{} {}", portal.date_range_picker, portal.inner_year_btn);
    browser.wait_for_element(&reveal).await?;
    browser.extract_one(&reveal, CLICK_FN, &[]).await?;

    browser.wait_for_element(&portal.cur_year_range_btn).await?;
    let label = read_text(browser, &portal.cur_year_range_btn).await?;
    let (mut range_start, mut range_end) = parse_year_range(&label)?;

    let year = target.year();
    let nav_selector = format!(
        "{}{}",
        portal.nav_btn_prefix,
        if is_range_start { "previous" } else { "next" }
    );

    loop {
        if is_range_start && range_start <= year {
            break;
        }
        if !is_range_start && range_end >= year {
            break;
        }

        browser.wait_for_element(&nav_selector).await?;
        let clicked = browser
            .extract_one(&nav_selector, CLICK_IF_ENABLED_FN, &[])
            .await?;
        if clicked != Value::Bool(true) {
            return Err(ScraperError::CalendarNavigation(format!(
                "ページ送りの限界に到達: {}年には移動できません (表示中 {} - {})",
                year, range_start, range_end
            )));
        }

        browser.wait_for_element(&portal.cur_year_range_btn).await?;
        let label = read_text(browser, &portal.cur_year_range_btn).await?;
        (range_start, range_end) = parse_year_range(&label)?;
        debug!("年レンジ表示: {} - {}", range_start, range_end);
    }

    browser.wait_for_element(&portal.year_table).await?;
    let selected = browser
        .extract_one(&portal.year_table, SELECT_YEAR_FN, &[json!(year)])
        .await?;
    if selected != Value::Bool(true) {
        return Err(ScraperError::CalendarNavigation(format!(
            "{}年のセルが見つかりません",
            year
        )));
    }

    let month_name = MONTH_NAMES[target.month0() as usize];
    browser.wait_for_element(&portal.month_table).await?;
    let selected = browser
        .extract_one(&portal.month_table, SELECT_MONTH_FN, &[json!(month_name)])
        .await?;
    if selected != Value::Bool(true) {
        return Err(ScraperError::CalendarNavigation(format!(
            "月 {} が選択できません",
            month_name
        )));
    }

    browser.wait_for_element(&portal.day_table).await?;
    let selected = browser
        .extract_one(&portal.day_table, SELECT_DAY_FN, &[json!(target.day())])
        .await?;
    if selected != Value::Bool(true) {
        return Err(ScraperError::CalendarNavigation(format!(
            "日 {} が選択できません",
            target.day()
        )));
    }

    debug!(
        "日付選択完了: {} ({}境界)",
        target,
        if is_range_start { "開始" } else { "終端" }
    );
    Ok(())
}

/// "2016 - 2027" 形式の年レンジ表記を読む
fn parse_year_range(label: &str) -> Result<(i32, i32), ScraperError> {
    let mut parts = label.split(" - ");
    let start = parts.next().and_then(|s| s.trim().parse::<i32>().ok());
    let end = parts.next().and_then(|s| s.trim().parse::<i32>().ok());

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ScraperError::CalendarNavigation(format!(
            "年レンジ表記が読めません: {:?}",
            label
        ))),
    }
}
