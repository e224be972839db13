//! 取引明細テーブルの抽出と正規化

use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use super::selectors::MyBcaPortal;
use super::read_text;
use crate::browser::BrowserDriver;
use crate::error::ScraperError;
use crate::types::{BankTransaction, TransactionType};

/// tbodyの全行を描画順のまま読み出す
const READ_ROWS_FN: &str = r#"function(el) {
    var rows = [];
    var tbody = el.querySelector('tbody');
    if (tbody === null) { return rows; }
    var trs = tbody.querySelectorAll('tr');
    for (var i = 0; i < trs.length; i++) {
        var tds = trs[i].querySelectorAll('td');
        if (tds.length < 3) { continue; }
        rows.push({
            date: tds[0].innerText.trim(),
            description: tds[1].innerText.trim(),
            amount: tds[2].innerText.trim(),
            credit: tds[2].classList.contains('text-danger'),
        });
    }
    return rows;
}"#;

/// ポータルが描画したままの1行
#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    description: String,
    amount: String,
    credit: bool,
}

/// 表示中の明細テーブルを正規化レコード列にする
///
/// 出力順はテーブルの行順そのまま。口座番号は1回だけ読み、全レコードで
/// 共有する。`range` は日付の年補完に使う問い合わせ期間（あれば）。
pub(crate) async fn extract_transactions<B: BrowserDriver>(
    browser: &B,
    portal: &MyBcaPortal,
    bank_code: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<BankTransaction>, ScraperError> {
    browser.wait_for_element(&portal.transaction_table).await?;
    let raw = browser
        .extract_one(&portal.transaction_table, READ_ROWS_FN, &[])
        .await?;
    let rows: Vec<RawRow> = serde_json::from_value(raw)
        .map_err(|e| ScraperError::Extraction(format!("明細行の形式が不正: {}", e)))?;

    browser.wait_for_element(&portal.account_num).await?;
    let account_num = read_text(browser, &portal.account_num).await?;

    debug!("明細 {} 行を取得 (口座: {})", rows.len(), account_num);

    let mut transactions = Vec::with_capacity(rows.len());
    for row in rows {
        let transaction_date = parse_statement_date(&row.date, range)?;
        let amount = parse_amount(&row.amount)?;
        // 金額セルの出金ハイライトクラスの有無が種別を決める（クラスあり=CR）
        let transaction_type = if row.credit {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        };

        transactions.push(BankTransaction::new(
            bank_code,
            &account_num,
            transaction_date,
            transaction_type,
            amount,
            row.description,
        ));
    }

    Ok(transactions)
}

/// 金額テキストを最小通貨単位の整数にする
///
/// "Rp 1.234.567,00" のような表記を想定し、末尾の小数部（,XX）を
/// 落としてから数字だけを残してパースする。数字が残らなければエラー。
pub(crate) fn parse_amount(text: &str) -> Result<u64, ScraperError> {
    let integral = match text.rsplit_once(',') {
        Some((head, frac))
            if !frac.is_empty() && frac.len() <= 2 && frac.chars().all(|c| c.is_ascii_digit()) =>
        {
            head
        }
        _ => text,
    };

    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ScraperError::Parse(format!("金額が読めません: {:?}", text)));
    }

    digits
        .parse::<u64>()
        .map_err(|e| ScraperError::Parse(format!("金額が読めません: {:?} ({})", text, e)))
}

/// "DD/MM" 形式の日付セルを読む
///
/// ポータルは年を表示しないため問い合わせ期間から補完する。期間が年を
/// またぐ場合、終端年で作った日付が終端を超えるなら開始年に倒す。期間
/// 指定なしの取得では現在年を仮定する（年境界をまたぐ既定明細では
/// ずれうる）。
pub(crate) fn parse_statement_date(
    text: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<NaiveDate, ScraperError> {
    let mut parts = text.trim().split('/');
    let day = parts.next().and_then(|s| s.parse::<u32>().ok());
    let month = parts.next().and_then(|s| s.parse::<u32>().ok());

    let (day, month) = match (day, month) {
        (Some(day), Some(month)) => (day, month),
        _ => {
            return Err(ScraperError::Parse(format!(
                "日付が読めません: {:?}",
                text
            )))
        }
    };

    let year = match range {
        Some((start, end)) => {
            let mut year = end.year();
            if start.year() < end.year() {
                if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
                    if candidate > end {
                        year = start.year();
                    }
                }
            }
            year
        }
        None => Local::now().year(),
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ScraperError::Parse(format!("日付が不正: {:?} (year={})", text, year))
    })
}
