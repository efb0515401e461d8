use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, ID_ARG_COMMANDS, MULTI_PATH_COMMANDS, NO_ARG_COMMANDS, RAW_ARG_COMMANDS,
    SINGLE_PATH_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub text: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            text: None,
            command_args: BTreeMap::new(),
        }
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_path_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn parse_single_path_arg(arg: &str) -> String {
    let parts = parse_path_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

fn parse_id_arg(arg: &str) -> String {
    arg.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Maps one line of chat input to an action.
///
/// Slash commands map through the command registry; any other non-empty line
/// becomes an `instruct` intent carrying the text, which the host treats as a
/// follow-up when a result exists and as a prompt edit otherwise.
pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let remainder = &slash_tail[command_len..];
            let arg = if remainder.is_empty() {
                ""
            } else {
                remainder.trim()
            };

            if let Some(action) = find_action(&command, RAW_ARG_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent.text = Some(arg.to_string());
                return intent;
            }

            if let Some(action) = find_action(&command, ID_ARG_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent
                    .command_args
                    .insert("id".to_string(), Value::String(parse_id_arg(arg)));
                return intent;
            }

            if let Some(action) = find_action(&command, SINGLE_PATH_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent.command_args.insert(
                    "path".to_string(),
                    Value::String(parse_single_path_arg(arg)),
                );
                return intent;
            }

            if let Some(action) = find_action(&command, MULTI_PATH_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent.command_args.insert(
                    "paths".to_string(),
                    Value::Array(
                        parse_path_args(arg)
                            .into_iter()
                            .map(Value::String)
                            .collect(),
                    ),
                );
                return intent;
            }

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return Intent::new(action, text);
            }

            let mut intent = Intent::new("unknown", text);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = Intent::new("instruct", text);
    intent.text = Some(raw_trimmed.to_string());
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_intent;

    #[test]
    fn parse_upload_quoted_paths() {
        let intent = parse_intent("/upload \"/tmp/a b.jpg\" c.heic");
        assert_eq!(intent.action, "upload");
        assert_eq!(
            intent.command_args["paths"],
            json!(["/tmp/a b.jpg", "c.heic"])
        );
    }

    #[test]
    fn parse_upload_without_paths_yields_empty_list() {
        let intent = parse_intent("/upload");
        assert_eq!(intent.command_args["paths"], json!([]));
    }

    #[test]
    fn parse_id_commands_lowercase_first_token() {
        let style = parse_intent("/style Studio-Headshot please");
        assert_eq!(style.action, "select_style");
        assert_eq!(style.command_args["id"], json!("studio-headshot"));

        let toggle = parse_intent("/toggle improve-lighting");
        assert_eq!(toggle.action, "toggle_modifier");
        assert_eq!(toggle.command_args["id"], json!("improve-lighting"));

        assert_eq!(parse_intent("/platform tiktok").action, "select_platform");
        assert_eq!(parse_intent("/mood casual").action, "select_mood");
    }

    #[test]
    fn parse_raw_text_commands_keep_remainder() {
        let refine = parse_intent("  /refine   make the sky bluer ");
        assert_eq!(refine.action, "refine");
        assert_eq!(refine.text.as_deref(), Some("make the sky bluer"));

        let topic = parse_intent("/topic New product launch");
        assert_eq!(topic.action, "set_topic");
        assert_eq!(topic.text.as_deref(), Some("New product launch"));

        let empty = parse_intent("/prompt");
        assert_eq!(empty.action, "set_prompt");
        assert_eq!(empty.text.as_deref(), Some(""));
    }

    #[test]
    fn parse_save_single_path() {
        let intent = parse_intent("/save \"/tmp/out dir/result.png\"");
        assert_eq!(intent.action, "save");
        assert_eq!(intent.command_args["path"], json!("/tmp/out dir/result.png"));
    }

    #[test]
    fn parse_no_arg_commands() {
        assert_eq!(parse_intent("/generate").action, "generate");
        assert_eq!(parse_intent("/draft").action, "draft");
        assert_eq!(parse_intent("/original").action, "show_original");
        assert_eq!(parse_intent("/result").action, "show_result");
        assert_eq!(parse_intent("/enhance").action, "set_enhance_auto");
        assert_eq!(parse_intent("/HELP").action, "help");
    }

    #[test]
    fn parse_plain_text_and_blank_lines() {
        let intent = parse_intent("  add a red scarf  ");
        assert_eq!(intent.action, "instruct");
        assert_eq!(intent.text.as_deref(), Some("add a red scarf"));
        assert_eq!(parse_intent("   ").action, "noop");
    }

    #[test]
    fn parse_unknown_command() {
        let intent = parse_intent("/magic foo bar");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("magic"));
        assert_eq!(intent.command_args["arg"], json!("foo bar"));
    }
}
