// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持日文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "ja";

/// 已提供文案的语言
pub const SUPPORTED_LOCALES: &[&str] = &["ja", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"ja" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use welfare_addition_engine::i18n::t;
/// let msg = t("judgment.all_met");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use welfare_addition_engine::i18n::t_with_args;
/// let msg = t_with_args("judgment.unmet", &[("name", "常勤専従"), ("current", "1"), ("required", "2")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key).to_string(), args)
}

/// 按指定语言翻译（不读取全局语言设定）
pub fn t_in(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 按指定语言翻译（带参数）
///
/// # 示例
/// ```no_run
/// use welfare_addition_engine::i18n::t_with_args_in;
/// let msg = t_with_args_in("en", "judgment.superseded", &[("selected", "人員配置体制加算(I)")]);
/// ```
pub fn t_with_args_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_args(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_args(mut text: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        text = text.replace(&placeholder, v);
    }
    text
}

/// 数值显示（整数不带小数点，其余最多两位小数）
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
