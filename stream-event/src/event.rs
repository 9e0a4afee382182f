//! Wire shape for one run-loop stream event, rendered as an XML tag.
//!
//! Unlike a JSON envelope protocol, each event renders to a standalone tag;
//! there is no session/node/event_id envelope to inject — `session_id` and
//! `model` travel once, inside `meta_init`.

use serde_json::Value;

/// One event on the run loop's stream queue.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    MetaInit {
        session_id: String,
        user_query: String,
        model: String,
    },
    ContentBlockText {
        text: String,
    },
    ContentBlockThinking {
        text: String,
    },
    ContentBlockToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    ContentBlockToolResult {
        id: String,
        name: String,
        content: String,
        is_error: bool,
    },
    AwaitingFrontendTools {
        tool_use_ids: Vec<String>,
    },
    MetaFinal {
        stop_reason: String,
        total_steps: u32,
    },
    ContentBlockError {
        message: String,
    },
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Renders one event to its XML tag form (§6 of the stream protocol).
pub fn format_event(event: &StreamEvent) -> String {
    match event {
        StreamEvent::MetaInit {
            session_id,
            user_query,
            model,
        } => {
            let data = serde_json::json!({
                "session_id": session_id,
                "user_query": user_query,
                "model": model,
            });
            format!("<meta_init data=\"{}\"/>", escape_attr(&data.to_string()))
        }
        StreamEvent::ContentBlockText { text } => {
            format!("<content-block-text>{}</content-block-text>", escape_attr(text))
        }
        StreamEvent::ContentBlockThinking { text } => {
            format!(
                "<content-block-thinking>{}</content-block-thinking>",
                escape_attr(text)
            )
        }
        StreamEvent::ContentBlockToolCall { id, name, arguments } => {
            format!(
                "<content-block-tool_call id=\"{}\" name=\"{}\" arguments=\"{}\"></content-block-tool_call>",
                escape_attr(id),
                escape_attr(name),
                escape_attr(&arguments.to_string()),
            )
        }
        StreamEvent::ContentBlockToolResult {
            id,
            name,
            content,
            is_error,
        } => {
            format!(
                "<content-block-tool_result id=\"{}\" name=\"{}\" is_error=\"{}\"><![CDATA[{}]]></content-block-tool_result>",
                escape_attr(id),
                escape_attr(name),
                is_error,
                content,
            )
        }
        StreamEvent::AwaitingFrontendTools { tool_use_ids } => {
            let data = serde_json::json!({ "tool_use_ids": tool_use_ids });
            format!(
                "<awaiting_frontend_tools data=\"{}\"></awaiting_frontend_tools>",
                escape_attr(&data.to_string())
            )
        }
        StreamEvent::MetaFinal {
            stop_reason,
            total_steps,
        } => {
            let data = serde_json::json!({
                "stop_reason": stop_reason,
                "total_steps": total_steps,
            });
            format!("<meta_final data=\"{}\"></meta_final>", escape_attr(&data.to_string()))
        }
        StreamEvent::ContentBlockError { message } => {
            format!("<content-block-error><![CDATA[{message}]]></content-block-error>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_init_escapes_attribute_value() {
        let rendered = format_event(&StreamEvent::MetaInit {
            session_id: "s1".to_string(),
            user_query: "say \"hi\" & go".to_string(),
            model: "gpt".to_string(),
        });
        assert!(rendered.starts_with("<meta_init data=\""));
        assert!(rendered.contains("&quot;"));
        assert!(rendered.contains("&amp;"));
    }

    #[test]
    fn tool_result_uses_cdata_for_content() {
        let rendered = format_event(&StreamEvent::ContentBlockToolResult {
            id: "t1".to_string(),
            name: "read_file".to_string(),
            content: "<raw & unescaped>".to_string(),
            is_error: false,
        });
        assert!(rendered.contains("<![CDATA[<raw & unescaped>]]>"));
    }

    #[test]
    fn error_event_wraps_message_in_cdata() {
        let rendered = format_event(&StreamEvent::ContentBlockError {
            message: "boom".to_string(),
        });
        assert_eq!(rendered, "<content-block-error><![CDATA[boom]]></content-block-error>");
    }

    #[test]
    fn awaiting_frontend_tools_embeds_ids() {
        let rendered = format_event(&StreamEvent::AwaitingFrontendTools {
            tool_use_ids: vec!["a".to_string(), "b".to_string()],
        });
        assert!(rendered.contains("awaiting_frontend_tools"));
        assert!(rendered.contains("a"));
    }
}
