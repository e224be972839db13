//! 取引レコード関連の型定義

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 取引種別（CR=入金 / DB=出金）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "CR")]
    Credit,
    #[serde(rename = "DB")]
    Debit,
}

impl TransactionType {
    /// ワイヤ表記。外部IDの連結にもこの表記を使う
    pub fn as_wire(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CR",
            TransactionType::Debit => "DB",
        }
    }
}

/// 銀行取引レコード
///
/// 1回の取得呼び出しで構築され、以後変更されない。`external_id` が
/// 重複排除の唯一のキーになる（DB上のIDは存在しない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    pub bank_code: String,
    /// 同一取得内の全レコードで共通
    pub account_num: String,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    /// 最小通貨単位の非負整数（小数・桁区切りなし）
    pub transaction_amount: u64,
    pub transaction_name: String,
    pub external_id: String,
}

impl BankTransaction {
    pub fn new(
        bank_code: impl Into<String>,
        account_num: impl Into<String>,
        transaction_date: NaiveDate,
        transaction_type: TransactionType,
        transaction_amount: u64,
        transaction_name: impl Into<String>,
    ) -> Self {
        let bank_code = bank_code.into();
        let account_num = account_num.into();
        let transaction_name = transaction_name.into();
        let external_id = external_id(
            &bank_code,
            &account_num,
            transaction_date,
            transaction_type,
            transaction_amount,
            &transaction_name,
        );
        Self {
            bank_code,
            account_num,
            transaction_date,
            transaction_type,
            transaction_amount,
            transaction_name,
            external_id,
        }
    }
}

/// 取引の外部IDを計算する
///
/// bankCode ‖ accountNum ‖ 日付(ISO) ‖ 種別 ‖ 金額 ‖ 摘要 をこの順で連結し、
/// SHA-256の16進文字列にする。同一内容の取引は常に同一IDになる。
pub fn external_id(
    bank_code: &str,
    account_num: &str,
    transaction_date: NaiveDate,
    transaction_type: TransactionType,
    transaction_amount: u64,
    transaction_name: &str,
) -> String {
    let concat = format!(
        "{}{}{}{}{}{}",
        bank_code,
        account_num,
        transaction_date,
        transaction_type.as_wire(),
        transaction_amount,
        transaction_name
    );

    let mut hasher = Sha256::new();
    hasher.update(concat.as_bytes());
    hex::encode(hasher.finalize())
}

/// 1回のスクレイプ結果（残高 + 取引明細）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub account_balance: u64,
    pub transactions: Vec<BankTransaction>,
}
