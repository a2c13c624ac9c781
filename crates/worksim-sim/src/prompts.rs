//! Role-specific prompt builders
//!
//! All truncation budgets are in characters, not bytes: the manuals and
//! conversations are Korean. Budgets differ per prompt: scenario seeds get
//! the most context, the in-character customer reply the least.

use worksim_core::ConversationTurn;

/// Context budget for scenario generation
pub const SCENARIO_CONTEXT_CHARS: usize = 1500;
/// Context budget for the evaluation call
pub const EVALUATION_CONTEXT_CHARS: usize = 1000;
/// Context budget for the next-customer-utterance call
pub const CUSTOMER_CONTEXT_CHARS: usize = 800;
/// Only the most recent turns are rendered into prompts
pub const HISTORY_TURNS: usize = 10;

/// Truncate to a character budget without splitting codepoints
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// `[프로젝트 지침]` block, empty when there are no guidelines
fn guidelines_block(guidelines: &str) -> String {
    if guidelines.is_empty() {
        String::new()
    } else {
        format!("\n\n[프로젝트 지침]\n{}", guidelines)
    }
}

/// `[이전 대화 내용]` block over the last [`HISTORY_TURNS`] turns, empty when
/// there is no history
fn history_block(history: &[ConversationTurn]) -> String {
    let recent = history.iter().rev().take(HISTORY_TURNS).rev();
    let lines: Vec<String> = recent
        .map(|turn| format!("{}: {}", turn.role.prompt_label(), turn.content))
        .collect();

    if lines.is_empty() {
        String::new()
    } else {
        format!("\n\n[이전 대화 내용]\n{}", lines.join("\n"))
    }
}

/// Prompt asking the model to invent one manual-grounded customer scenario
/// in the three-line labeled format
pub fn scenario_prompt(context: &str, guidelines: &str) -> String {
    format!(
        "당신은 아래 매뉴얼에 나오는 서비스/업무의 고객 또는 사용자입니다.\n\
         \n\
         [업무/서비스 매뉴얼 발췌]\n\
         {}{}\n\
         \n\
         위 매뉴얼의 주제와 용어를 벗어나지 말고,\n\
         실제 현장에서 자주 나올 법한 고객 문의 상황 1개만 만드세요.\n\
         \n\
         반드시 매뉴얼의 내용과 직접 관련된 문의여야 하며,\n\
         매뉴얼에 없는 새로운 종류의 상품/서비스는 만들지 마세요.\n\
         \n\
         [출력 형식 - 이 형식 그대로]\n\
         상황: (고객이 처한 상황을 한 줄로)\n\
         고객 유형: (예: 일반 고객 / 초보 학습자 / 컴퓨터에 익숙하지 않은 고객 등)\n\
         고객 첫 말: (직원에게 처음 건네는 한 문장)",
        truncate_chars(context, SCENARIO_CONTEXT_CHARS),
        guidelines_block(guidelines),
    )
}

/// Grounded-answer prompt for agent-reply mode: the trainee plays the
/// customer, the model answers as a support agent over the full retrieved
/// context
pub fn agent_reply_prompt(
    context: &str,
    guidelines: &str,
    history: &[ConversationTurn],
    message: &str,
) -> String {
    format!(
        "당신은 아래 문서/매뉴얼을 기반으로 친절하게 답변하는 전문 상담원입니다.\n\
         \n\
         [참고 문서/매뉴얼]\n\
         {}\n\
         {}\n\
         {}\n\
         \n\
         답변 가이드라인:\n\
         1. 참고 문서에 직접적인 답이 있으면 해당 내용을 정확히 안내하세요.\n\
         2. 직접적인 답이 없더라도, 문서의 맥락을 바탕으로 관련된 정보를 제공하거나 일반적인 안내를 해주세요.\n\
         3. 전혀 관련 없는 질문이면 \"죄송합니다. 해당 내용은 제가 도와드리기 어려운 부분입니다. 다른 문의사항이 있으시면 말씀해 주세요.\"라고 완곡히 답변하세요.\n\
         4. 질문에 관련된 추가 도움이 될 만한 정보가 있다면 함께 안내해 주세요.\n\
         5. 답변은 자연스럽고 친근한 말투로 작성하세요.\n\
         \n\
         고객 질문: {}\n\
         \n\
         친절한 답변:",
        context,
        guidelines_block(guidelines),
        history_block(history),
        message,
    )
}

/// Grading prompt for customer-role mode: three 1-5 sub-scores plus the
/// `총점: X/15` total the parser looks for
pub fn evaluation_prompt(
    context: &str,
    guidelines: &str,
    history: &[ConversationTurn],
    message: &str,
) -> String {
    format!(
        "다음 업무 매뉴얼과 지침을 기준으로 직원의 고객 응답을 평가해주세요:\n\
         \n\
         업무 매뉴얼:\n\
         {}{}{}\n\
         \n\
         직원 응답: {}\n\
         \n\
         다음 기준으로 평가해주세요:\n\
         1. 정확성 (1-5점)\n\
         2. 친절성 (1-5점)\n\
         3. 적절성 (1-5점)\n\
         총점: /15점\n\
         \n\
         형식:\n\
         정확성: X/5 - 간단한 코멘트\n\
         친절성: X/5 - 간단한 코멘트\n\
         적절성: X/5 - 간단한 코멘트\n\
         총점: X/15\n\
         개선점: 구체적인 개선 제안",
        truncate_chars(context, EVALUATION_CONTEXT_CHARS),
        guidelines_block(guidelines),
        history_block(history),
        message,
    )
}

/// In-character follow-up prompt: one customer sentence, roughly 50 chars,
/// reacting to the trainee's latest reply
pub fn next_customer_prompt(
    context: &str,
    guidelines: &str,
    history: &[ConversationTurn],
    message: &str,
) -> String {
    format!(
        "당신은 서비스를 이용하는 고객입니다.\n\
         \n\
         [업무/서비스 매뉴얼 발췌]\n\
         {}{}{}\n\
         \n\
         위 매뉴얼의 주제와 용어를 벗어나지 말고,\n\
         이전 대화 맥락을 고려하여 직원의 답변을 들은 뒤 이어질 다음 고객 질문/반응을 한 문장으로만 작성하세요.\n\
         \n\
         직원 응답: {}\n\
         \n\
         고객 답변 (50자 이내, 한 문장):",
        truncate_chars(context, CUSTOMER_CONTEXT_CHARS),
        guidelines_block(guidelines),
        history_block(history),
        message,
    )
}
