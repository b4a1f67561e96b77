// ==========================================
// 加算判定引擎 - 判定理由 / 建议文案
// ==========================================
// 红线: 所有规则必须输出 reason
// 红线: 语言由调用方显式传入，不读取全局语言设定
// ==========================================

use crate::domain::judgment::RequirementStatus;
use crate::domain::types::SuggestionType;
use crate::i18n::{format_number, t_in, t_with_args_in};

pub struct ReasonText;

impl ReasonText {
    pub fn all_met(locale: &str) -> String {
        t_in(locale, "judgment.all_met")
    }

    pub fn no_requirements(locale: &str) -> String {
        t_in(locale, "judgment.no_requirements")
    }

    /// 未满足要件（现值/要求值）
    pub fn unmet(locale: &str, status: &RequirementStatus) -> String {
        t_with_args_in(
            locale,
            "judgment.unmet",
            &[
                ("name", &status.name),
                ("current", &format_number(status.current)),
                ("required", &format_number(status.required)),
            ],
        )
    }

    /// 排他组内被其他加算优先
    pub fn superseded(locale: &str, selected_name: &str) -> String {
        t_with_args_in(locale, "judgment.superseded", &[("selected", selected_name)])
    }

    pub fn requirement_line(locale: &str, status: &RequirementStatus) -> String {
        t_with_args_in(
            locale,
            "suggestion.requirement",
            &[
                ("name", &status.name),
                ("current", &format_number(status.current)),
                ("required", &format_number(status.required)),
            ],
        )
    }

    /// 建议说明
    ///
    /// - subject: 人员措施为对象要件名，Switch 为当前届出的加算名
    /// - shortfall: 仅 Hire 使用
    pub fn suggestion(
        locale: &str,
        suggestion_type: SuggestionType,
        addition_name: &str,
        subject: &str,
        shortfall: f64,
    ) -> String {
        let key = match suggestion_type {
            SuggestionType::Hire => "suggestion.hire",
            SuggestionType::Training => "suggestion.training",
            SuggestionType::Upgrade => "suggestion.upgrade",
            SuggestionType::Switch => "suggestion.switch",
        };
        t_with_args_in(
            locale,
            key,
            &[
                ("name", addition_name),
                ("subject", subject),
                ("shortfall", &format_number(shortfall)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_text_names_both_additions() {
        let text = ReasonText::suggestion(
            "ja",
            SuggestionType::Switch,
            "人員配置体制加算(I)",
            "人員配置体制加算(III)",
            0.0,
        );
        assert!(text.starts_with("人員配置体制加算(I)："));
        assert!(text.contains("人員配置体制加算(III)"));

        let text = ReasonText::suggestion("en", SuggestionType::Hire, "A", "qualified_staff_count", 1.0);
        assert_eq!(text, "A: hire staff to meet qualified_staff_count (short by 1)");
    }
}
