/// myBCAポータルのURLとセレクタ定義
///
/// ポータルのマークアップ変更はここだけを直せば済むよう、UI上の
/// 論理ターゲット1つにつき1フィールドを割り当てる。
#[derive(Debug, Clone)]
pub struct MyBcaPortal {
    pub login_url: String,
    pub input_user_id: String,
    pub input_password: String,
    pub submit_login_btn: String,

    pub dashboard_url: String,
    pub balance_card: String,
    /// balance_card 配下の残高アンロックリンク
    pub unlock_balance_link: String,
    /// balance_card 配下の残高表示
    pub balance_text: String,

    pub statement_url: String,
    pub transaction_table: String,
    pub account_num: String,
    pub duration_input: String,
    pub date_range_picker: String,
    /// date_range_picker 配下、年レンジページを開くヘッダボタン
    pub inner_year_btn: String,
    /// 表示中の年レンジ ("2016 - 2027" 形式) を持つボタン
    pub cur_year_range_btn: String,
    /// ページ送りボタンの前置部。"previous" / "next" を連結して使う
    pub nav_btn_prefix: String,
    pub year_table: String,
    pub month_table: String,
    pub day_table: String,
    pub submit_statement_btn: String,

    pub logout_url: String,
    pub logout_btn: String,
}

impl Default for MyBcaPortal {
    fn default() -> Self {
        Self {
            login_url: "https://mybca.bca.co.id/auth/login".into(),
            input_user_id: "input[name='username']".into(),
            input_password: "input[name='password']".into(),
            submit_login_btn: "button[type=submit]".into(),

            dashboard_url: "https://mybca.bca.co.id/dashboard".into(),
            balance_card: "app-dashboard-card-balance".into(),
            unlock_balance_link: "> app-card > app-card-body > div > a".into(),
            balance_text: "h5".into(),

            statement_url: "https://mybca.bca.co.id/profile/statement".into(),
            transaction_table: "table".into(),
            account_num: "app-form-group span.font-weight-semibold".into(),
            duration_input: "input[name='duration']".into(),
            date_range_picker: "app-daterangepicker".into(),
            inner_year_btn: "section > app-bottom-sheet > div > div.sheet-content > app-card \
                             > app-card-body > bs-daterangepicker-inline \
                             > bs-daterangepicker-inline-container > div > div > div > div \
                             > bs-days-calendar-view > bs-calendar-layout \
                             > div.bs-datepicker-head > bs-datepicker-navigation-view \
                             > button:nth-child(3)"
                .into(),
            cur_year_range_btn: "bs-datepicker-navigation-view > button.current".into(),
            nav_btn_prefix: "bs-datepicker-navigation-view > button.".into(),
            year_table: "table.years".into(),
            month_table: "table.months".into(),
            day_table: "table.days.weeks".into(),
            submit_statement_btn: "button[type=submit]".into(),

            logout_url: "https://mybca.bca.co.id/dashboard".into(),
            logout_btn: "app-header > header > nav > div > div > ul > li:nth-child(3) > a".into(),
        }
    }
}
