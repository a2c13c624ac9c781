//! Best-effort parsing of semi-structured model output
//!
//! These parsers never fail: malformed output degrades field-by-field to
//! documented defaults, and the [`Parsed`] wrapper records whether that
//! happened so callers and tests can tell a clean parse from a degraded one.

use std::sync::LazyLock;

use regex::Regex;

use worksim_core::{Parsed, Scenario};

/// Scenario returned without any LLM call when a project has neither stored
/// context nor guidelines
pub fn default_scenario() -> Scenario {
    Scenario {
        situation: "일반적인 서비스 문의 상황".to_string(),
        customer_type: "일반 고객".to_string(),
        first_message: "안녕하세요, 서비스 이용 관련해서 문의드립니다.".to_string(),
    }
}

/// Per-field fallbacks for a scenario the model formatted badly
const FALLBACK_SITUATION: &str = "매뉴얼 관련 문의 상황";
const FALLBACK_CUSTOMER_TYPE: &str = "일반 고객";
const FALLBACK_FIRST_MESSAGE: &str = "안녕하세요, 문의사항이 있습니다.";

/// Total-score default when the `총점:` line is missing or malformed
pub const DEFAULT_TOTAL_SCORE: u32 = 12;
/// Denominator of the three 1-5 sub-scores
pub const MAX_TOTAL_SCORE: u32 = 15;

static TOTAL_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"총점:\s*(\d+)\s*/").expect("valid score regex"));

/// Parse the three labeled scenario lines (`상황:`, `고객 유형:`,
/// `고객 첫 말:` or `첫 말:`).
///
/// Lines are scanned for literal label prefixes; each missing field falls
/// back to its fixed default and marks the parse degraded.
pub fn parse_scenario(content: &str) -> Parsed<Scenario> {
    let mut situation = None;
    let mut customer_type = None;
    let mut first_message = None;

    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("상황:") {
            situation = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("고객 유형:") {
            customer_type = Some(rest.trim().to_string());
        } else if line.contains("고객 첫 말:") || line.contains("첫 말:") {
            if let Some((_, rest)) = line.split_once(':') {
                first_message = Some(rest.trim().trim_matches('"').to_string());
            }
        }
    }

    let degraded = [
        situation.as_deref(),
        customer_type.as_deref(),
        first_message.as_deref(),
    ]
    .iter()
    .any(|field| field.is_none_or(str::is_empty));

    let scenario = Scenario {
        situation: situation
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_SITUATION.to_string()),
        customer_type: customer_type
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_CUSTOMER_TYPE.to_string()),
        first_message: first_message
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_FIRST_MESSAGE.to_string()),
    };

    Parsed {
        value: scenario,
        degraded,
    }
}

/// Extract the integer total from the `총점: X/15` line.
///
/// Any failure (no such line, a non-integer, a missing slash) resolves to
/// [`DEFAULT_TOTAL_SCORE`] with the degraded flag set. The surrounding
/// feedback text is the caller's to keep verbatim either way.
pub fn parse_total_score(content: &str) -> Parsed<u32> {
    for line in content.lines() {
        if !line.contains("총점:") {
            continue;
        }
        if let Some(captures) = TOTAL_SCORE_RE.captures(line) {
            if let Ok(score) = captures[1].parse::<u32>() {
                return Parsed::clean(score);
            }
        }
        break;
    }

    Parsed::degraded(DEFAULT_TOTAL_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_total_score() {
        let feedback = "정확성: 4/5 - 좋음\n친절성: 4/5 - 좋음\n적절성: 3/5 - 보통\n총점: 11/15\n개선점: 마무리 인사 추가";
        let parsed = parse_total_score(feedback);
        assert_eq!(parsed.value, 11);
        assert!(!parsed.degraded);
    }

    #[test]
    fn test_missing_score_line_defaults() {
        let parsed = parse_total_score("평가를 완료했습니다. 전반적으로 좋았습니다.");
        assert_eq!(parsed.value, DEFAULT_TOTAL_SCORE);
        assert!(parsed.degraded);
    }

    #[test]
    fn test_malformed_score_defaults() {
        let parsed = parse_total_score("총점: 높음/15");
        assert_eq!(parsed.value, DEFAULT_TOTAL_SCORE);
        assert!(parsed.degraded);

        let parsed = parse_total_score("총점: 11점");
        assert_eq!(parsed.value, DEFAULT_TOTAL_SCORE);
        assert!(parsed.degraded);
    }

    #[test]
    fn test_score_line_with_spacing() {
        let parsed = parse_total_score("총점:  13 /15");
        assert_eq!(parsed.value, 13);
        assert!(!parsed.degraded);
    }

    #[test]
    fn test_parse_scenario_clean() {
        let content = "상황: 고객이 환불 절차를 묻는 상황\n고객 유형: 초보 학습자\n고객 첫 말: 환불은 어떻게 하나요?";
        let parsed = parse_scenario(content);
        assert!(!parsed.degraded);
        assert_eq!(parsed.value.situation, "고객이 환불 절차를 묻는 상황");
        assert_eq!(parsed.value.customer_type, "초보 학습자");
        assert_eq!(parsed.value.first_message, "환불은 어떻게 하나요?");
    }

    #[test]
    fn test_parse_scenario_short_first_message_label() {
        let content = "상황: 배송 지연 문의\n고객 유형: 일반 고객\n첫 말: \"배송이 왜 이렇게 늦나요?\"";
        let parsed = parse_scenario(content);
        assert!(!parsed.degraded);
        assert_eq!(parsed.value.first_message, "배송이 왜 이렇게 늦나요?");
    }

    #[test]
    fn test_parse_scenario_missing_fields_degrade() {
        let parsed = parse_scenario("상황: 결제 오류 문의");
        assert!(parsed.degraded);
        assert_eq!(parsed.value.situation, "결제 오류 문의");
        assert_eq!(parsed.value.customer_type, FALLBACK_CUSTOMER_TYPE);
        assert_eq!(parsed.value.first_message, FALLBACK_FIRST_MESSAGE);
    }

    #[test]
    fn test_parse_scenario_garbage_degrades_all_fields() {
        let parsed = parse_scenario("죄송하지만 시나리오를 만들 수 없습니다.");
        assert!(parsed.degraded);
        assert_eq!(parsed.value.situation, FALLBACK_SITUATION);
        assert_eq!(parsed.value.customer_type, FALLBACK_CUSTOMER_TYPE);
        assert_eq!(parsed.value.first_message, FALLBACK_FIRST_MESSAGE);
    }

    #[test]
    fn test_parse_scenario_ignores_surrounding_prose() {
        let content = "다음은 시나리오입니다.\n\n상황: 로그인 실패 문의\n고객 유형: 컴퓨터에 익숙하지 않은 고객\n고객 첫 말: 로그인이 안 돼요.\n\n도움이 되길 바랍니다.";
        let parsed = parse_scenario(content);
        assert!(!parsed.degraded);
        assert_eq!(parsed.value.situation, "로그인 실패 문의");
    }

    #[test]
    fn test_empty_labels_fall_back() {
        let parsed = parse_scenario("상황:\n고객 유형: 일반 고객\n고객 첫 말: 문의드립니다.");
        assert!(parsed.degraded);
        assert_eq!(parsed.value.situation, FALLBACK_SITUATION);
    }
}
