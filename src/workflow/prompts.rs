//! 提示词模板
//!
//! `{company_name}` 和 `{company_url}` 会被替换为当前公司的信息。

use crate::models::Record;

/// 系统提示模板
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a research assistant specialized in finding company founders.

Your task: find the names of the original founders/co-founders of {company_name} ({company_url}).

Rules:
- Return ONLY the names of actual founders/co-founders (people who started the company)
- Do NOT include advisors, investors, board members, or employees
- Focus on original founders, not interim CEOs or replacements
- Use the available web tools to verify the information

Protocol:
- While you are still researching, you may report interim findings as
  <progress>["Name One", "Name Two"]</progress>
- When you are confident, answer with a JSON array wrapped in final tags:
  <final>["Name One", "Name Two"]</final>
- If no reliable founder information exists, answer <final>[]</final>

Be concise and factual."#;

/// 第一轮的用户消息模板
pub const INITIAL_PROMPT_TEMPLATE: &str = r#"Find the founders of {company_name} ({company_url}).

Reply with <final>[...]</final> containing a JSON array of founder names once you are done."#;

/// 后续轮次的用户消息
pub const CONTINUE_PROMPT: &str = "Continue your research. If you are confident, reply now with <final>[...]</final>; otherwise report <progress>[...]</progress> and keep searching.";

/// 替换模板中的公司信息
pub fn render(template: &str, record: &Record) -> String {
    let url = if record.reference_url.is_empty() {
        "website unknown"
    } else {
        record.reference_url.as_str()
    };
    template
        .replace("{company_name}", &record.identifier)
        .replace("{company_url}", url)
}
