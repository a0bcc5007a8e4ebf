//! Instruction template sent to the completion service.

use crate::suggestion::{Category, Severity};

/// System message establishing the proofreader role.
pub const SYSTEM_PROMPT: &str = "당신은 한국어 맞춤법 검사 전문가입니다. 주어진 텍스트의 맞춤법, 띄어쓰기, 문법, 일관성, 문체를 검사하고 JSON 형태로 교정 제안을 제공합니다.";

/// Korean description of each category, in prompt order.
const CATEGORY_LABELS: [(Category, &str); 5] = [
    (Category::Spelling, "맞춤법"),
    (Category::Spacing, "띄어쓰기"),
    (Category::Grammar, "문법"),
    (Category::Consistency, "일관성"),
    (Category::Style, "문체"),
];

const CATEGORY_HINTS: [&str; 5] = [
    "잘못된 철자",
    "잘못된 띄어쓰기",
    "문법적 오류",
    "용어나 표기의 일관성",
    "더 나은 표현이나 간결한 문장",
];

/// A two-message chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    /// Build the spell-check request for `text`, embedding it verbatim.
    pub fn spell_check(text: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: render_prompt(text),
        }
    }
}

/// Render the user prompt for `text`.
pub fn render_prompt(text: &str) -> String {
    let criteria = CATEGORY_LABELS
        .iter()
        .zip(CATEGORY_HINTS)
        .enumerate()
        .map(|(i, ((category, label), hint))| {
            format!("{}. **{} ({})**: {}", i + 1, label, category, hint)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let categories = Category::ALL.map(|c| c.as_str()).join("|");
    let severities = Severity::ALL.map(|s| s.as_str()).join("|");

    format!(
        r#"
다음 한국어 텍스트의 맞춤법, 띄어쓰기, 문법, 일관성, 문체를 검사하고 교정 제안을 JSON 형태로 제공해 주세요.

검사할 텍스트:
"{text}"

다음 기준으로 검사해 주세요:
{criteria}

응답 형식 (JSON):
{{
  "corrections": [
    {{
      "original": "원본 텍스트",
      "revised": "교정된 텍스트",
      "type": "{categories}",
      "reason": "교정 이유 설명",
      "severity": "{severities}",
      "position": {{"start": 시작위치, "end": 끝위치}}
    }}
  ]
}}

중요한 점:
- 명확한 오류만 교정 제안하세요
- 교정 이유를 명확히 설명하세요
- 심각도(severity)를 적절히 판단하세요
- 원본과 교정본이 동일한 경우는 제외하세요
- 빈 배열 {{"corrections": []}} 도 유효한 응답입니다 (오류가 없는 경우)
"#
    )
}
