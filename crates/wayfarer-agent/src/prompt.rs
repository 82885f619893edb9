//! System instructions seeded into every new conversation.

use std::fmt::Write;

/// Render the travel-assistant instructions.
///
/// `currency_hint` is the origin currency code when it is already known.
/// `tools_listing` is the router's [`describe`](wayfarer_tools::ToolRouter::describe)
/// output.
pub fn system_prompt(country_from: &str, currency_hint: Option<&str>, tools_listing: &str) -> String {
    let mut prompt = String::from("You are a strict travel assistant.\n\nUser context:\n");
    let _ = writeln!(prompt, "- My country is {}", country_from);
    if let Some(code) = currency_hint {
        let _ = writeln!(prompt, "- My currency code is {}", code);
    }

    prompt.push_str("\nAvailable tools:\n");
    if tools_listing.trim().is_empty() {
        prompt.push_str("- none\n");
    } else {
        prompt.push_str(tools_listing.trim_end());
        prompt.push('\n');
    }

    prompt.push_str(
        r#"
Rules:
1. If the user mentions travel to another country,
   you MUST call the tool travel_info.get_info.
2. You MUST respond with ONLY valid JSON.
3. Tool format:
{
    "tool": "travel_info.get_info",
    "arguments": {
        "country_to": "<country>"
    }
}
4. Do NOT wrap JSON in markdown.
5. Do NOT modify the tool name.
6. Do NOT add explanations.
"#,
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_context_and_tool_listing() {
        let prompt = system_prompt(
            "Israel",
            Some("ILS"),
            "- travel_info.get_info(country_to: string)",
        );
        assert!(prompt.starts_with("You are a strict travel assistant."));
        assert!(prompt.contains("- My country is Israel"));
        assert!(prompt.contains("- My currency code is ILS"));
        assert!(prompt.contains("- travel_info.get_info(country_to: string)"));
        assert!(prompt.contains(r#""tool": "travel_info.get_info""#));
    }

    #[test]
    fn omits_unknown_currency_and_marks_empty_listing() {
        let prompt = system_prompt("France", None, "");
        assert!(!prompt.contains("currency code"));
        assert!(prompt.contains("Available tools:\n- none\n"));
    }
}
