use super::command_registry::{is_registered, CommandSpec, NO_ARG_COMMANDS, SINGLE_PATH_COMMANDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    Model,
    Product,
    Gallery,
}

/// One line of input to the interactive studio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioCommand {
    Noop,
    SetModelImage(String),
    SetProductImage(String),
    Clear(ClearTarget),
    ListPresets(Option<String>),
    GeneratePreset(String),
    GenerateStyle(String),
    ShowGallery,
    Remove(String),
    Export(Option<String>),
    SelectKey,
    Help,
    Quit,
    Invalid(String),
    Unknown { command: String, arg: String },
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

fn usage_for(command: &str, specs: &[CommandSpec]) -> String {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| format!("Usage: {}", spec.usage))
        .unwrap_or_else(|| format!("Usage: /{command}"))
}

fn optional_arg(arg: &str) -> Option<String> {
    let value = parse_single_path_arg(arg);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn parse_command(text: &str) -> StudioCommand {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return StudioCommand::Noop;
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return StudioCommand::GenerateStyle(raw_trimmed.to_string());
    };
    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return StudioCommand::GenerateStyle(raw_trimmed.to_string());
    }
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    if is_registered(&command, SINGLE_PATH_COMMANDS) {
        let path = parse_single_path_arg(arg);
        if path.is_empty() {
            return StudioCommand::Invalid(usage_for(&command, SINGLE_PATH_COMMANDS));
        }
        return if command == "model" {
            StudioCommand::SetModelImage(path)
        } else {
            StudioCommand::SetProductImage(path)
        };
    }

    if is_registered(&command, NO_ARG_COMMANDS) {
        return match command.as_str() {
            "gallery" => StudioCommand::ShowGallery,
            "key" => StudioCommand::SelectKey,
            "help" => StudioCommand::Help,
            _ => StudioCommand::Quit,
        };
    }

    match command.as_str() {
        "clear" => match arg.to_ascii_lowercase().as_str() {
            "model" => StudioCommand::Clear(ClearTarget::Model),
            "product" => StudioCommand::Clear(ClearTarget::Product),
            "gallery" | "all" => StudioCommand::Clear(ClearTarget::Gallery),
            _ => StudioCommand::Invalid("Usage: /clear model|product|gallery".to_string()),
        },
        "presets" => StudioCommand::ListPresets(optional_arg(arg)),
        "use" | "preset" => match optional_arg(arg) {
            Some(id) => StudioCommand::GeneratePreset(id),
            None => StudioCommand::Invalid("Usage: /use <preset-id>".to_string()),
        },
        "style" => {
            if arg.is_empty() {
                StudioCommand::Invalid("Usage: /style <scene description>".to_string())
            } else {
                StudioCommand::GenerateStyle(arg.to_string())
            }
        }
        "remove" => match optional_arg(arg) {
            Some(target) => StudioCommand::Remove(target),
            None => StudioCommand::Invalid("Usage: /remove <slot|id>".to_string()),
        },
        "export" => StudioCommand::Export(optional_arg(arg)),
        _ => StudioCommand::Unknown {
            command,
            arg: arg.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, ClearTarget, StudioCommand};

    #[test]
    fn parse_image_paths_with_quotes() {
        assert_eq!(
            parse_command("/model \"/tmp/my model.jpg\""),
            StudioCommand::SetModelImage("/tmp/my model.jpg".to_string())
        );
        assert_eq!(
            parse_command("  /product   shoes.png  "),
            StudioCommand::SetProductImage("shoes.png".to_string())
        );
        assert_eq!(
            parse_command("/model"),
            StudioCommand::Invalid("Usage: /model <path>".to_string())
        );
    }

    #[test]
    fn plain_text_is_a_style_generation() {
        assert_eq!(
            parse_command("Standing on a rooftop at dusk"),
            StudioCommand::GenerateStyle("Standing on a rooftop at dusk".to_string())
        );
        assert_eq!(
            parse_command("/style Side view, walking"),
            StudioCommand::GenerateStyle("Side view, walking".to_string())
        );
        assert_eq!(parse_command("   "), StudioCommand::Noop);
    }

    #[test]
    fn parse_preset_and_gallery_commands() {
        assert_eq!(
            parse_command("/use 5"),
            StudioCommand::GeneratePreset("5".to_string())
        );
        assert_eq!(
            parse_command("/presets close-up"),
            StudioCommand::ListPresets(Some("close-up".to_string()))
        );
        assert_eq!(parse_command("/presets"), StudioCommand::ListPresets(None));
        assert_eq!(parse_command("/gallery"), StudioCommand::ShowGallery);
        assert_eq!(
            parse_command("/remove 2"),
            StudioCommand::Remove("2".to_string())
        );
        assert_eq!(
            parse_command("/clear product"),
            StudioCommand::Clear(ClearTarget::Product)
        );
        assert!(matches!(
            parse_command("/clear everything"),
            StudioCommand::Invalid(_)
        ));
    }

    #[test]
    fn parse_session_commands() {
        assert_eq!(parse_command("/KEY"), StudioCommand::SelectKey);
        assert_eq!(parse_command("/quit"), StudioCommand::Quit);
        assert_eq!(parse_command("/exit"), StudioCommand::Quit);
        assert_eq!(parse_command("/export"), StudioCommand::Export(None));
        assert_eq!(
            parse_command("/export \"out dir\""),
            StudioCommand::Export(Some("out dir".to_string()))
        );
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            parse_command("/magic foo bar"),
            StudioCommand::Unknown {
                command: "magic".to_string(),
                arg: "foo bar".to_string(),
            }
        );
    }
}
