//! Hook installation for supported AI coding tools.
//!
//! Each tool gets the same four behaviors where its hook surface allows:
//! work music on prompt submit, the done cue when the tool finishes,
//! a full stop when the session ends, and the notification cue on
//! permission prompts. Only the player's own hook keys are replaced;
//! everything else in the settings file is preserved.

use std::path::PathBuf;

use serde_json::{json, Map, Value};

/// One supported AI tool.
pub trait ToolIntegration {
    /// Returns the tool id and display name.
    fn tool_info(&self) -> (&'static str, &'static str);

    /// Returns the path of the tool's settings file.
    fn settings_path(&self) -> PathBuf;

    /// Installs the player's hook commands into the parsed settings.
    fn install_hooks(&self, settings: &mut Map<String, Value>);
}

/// All registered integrations, in menu order.
pub fn all_integrations() -> Vec<Box<dyn ToolIntegration>> {
    vec![
        Box::new(ClaudeCode),
        Box::new(IFlow),
        Box::new(GeminiCli),
        Box::new(CursorAgent),
    ]
}

fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the mutable `hooks` table, creating or repairing it.
fn hooks_table(settings: &mut Map<String, Value>) -> &mut Map<String, Value> {
    let hooks = settings
        .entry("hooks".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !hooks.is_object() {
        *hooks = Value::Object(Map::new());
    }
    match hooks {
        Value::Object(map) => map,
        _ => unreachable!("hooks was just made an object"),
    }
}

/// Hook entry in the nested `{"hooks": [{"type": "command", ...}]}` shape
/// shared by Claude Code and iFlow.
fn nested_command(command: &str) -> Value {
    json!([{ "hooks": [{ "type": "command", "command": command }] }])
}

/// Integration for Claude Code.
pub struct ClaudeCode;

impl ToolIntegration for ClaudeCode {
    fn tool_info(&self) -> (&'static str, &'static str) {
        ("claude", "Claude Code")
    }

    fn settings_path(&self) -> PathBuf {
        home_dir().join(".claude").join("settings.json")
    }

    fn install_hooks(&self, settings: &mut Map<String, Value>) {
        let hooks = hooks_table(settings);
        hooks.insert(
            "UserPromptSubmit".to_string(),
            nested_command("ai-bgm play work 0"),
        );
        hooks.insert("Stop".to_string(), nested_command("ai-bgm play done"));
        hooks.insert("SessionEnd".to_string(), nested_command("ai-bgm stop"));
        hooks.insert(
            "Notification".to_string(),
            nested_command("ai-bgm play notification 0"),
        );
    }
}

/// Integration for iFlow CLI.
pub struct IFlow;

impl ToolIntegration for IFlow {
    fn tool_info(&self) -> (&'static str, &'static str) {
        ("iflow", "iFlow CLI")
    }

    fn settings_path(&self) -> PathBuf {
        home_dir().join(".iflow").join("settings.json")
    }

    fn install_hooks(&self, settings: &mut Map<String, Value>) {
        let hooks = hooks_table(settings);
        hooks.insert(
            "UserPromptSubmit".to_string(),
            nested_command("ai-bgm play work 0"),
        );
        hooks.insert("Stop".to_string(), nested_command("ai-bgm play done"));
        hooks.insert("SessionEnd".to_string(), nested_command("ai-bgm stop"));
        hooks.insert(
            "Notification".to_string(),
            nested_command("ai-bgm play notification 0"),
        );
    }
}

/// Integration for Gemini CLI, which takes flat command entries.
pub struct GeminiCli;

impl ToolIntegration for GeminiCli {
    fn tool_info(&self) -> (&'static str, &'static str) {
        ("gemini", "Gemini CLI")
    }

    fn settings_path(&self) -> PathBuf {
        home_dir().join(".gemini").join("settings.json")
    }

    fn install_hooks(&self, settings: &mut Map<String, Value>) {
        let hooks = hooks_table(settings);
        hooks.insert(
            "BeforeAgent".to_string(),
            json!([{ "type": "command", "command": "ai-bgm play work 0" }]),
        );
        hooks.insert(
            "AfterAgent".to_string(),
            json!([{ "type": "command", "command": "ai-bgm play done" }]),
        );
        hooks.insert(
            "SessionEnd".to_string(),
            json!([{ "type": "command", "command": "ai-bgm stop" }]),
        );
    }
}

/// Integration for Cursor, whose hooks.json carries a version field and
/// bare command entries.
pub struct CursorAgent;

impl ToolIntegration for CursorAgent {
    fn tool_info(&self) -> (&'static str, &'static str) {
        ("cursor", "Cursor Agent")
    }

    fn settings_path(&self) -> PathBuf {
        home_dir().join(".cursor").join("hooks.json")
    }

    fn install_hooks(&self, settings: &mut Map<String, Value>) {
        if !settings.contains_key("version") {
            settings.insert("version".to_string(), json!(1));
        }
        let hooks = hooks_table(settings);
        hooks.insert(
            "beforeSubmitPrompt".to_string(),
            json!([{ "command": "ai-bgm play work 0" }]),
        );
        hooks.insert(
            "stop".to_string(),
            json!([{ "command": "ai-bgm play done" }]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude_installs_all_four_hooks() {
        let mut settings = Map::new();
        ClaudeCode.install_hooks(&mut settings);

        let hooks = settings["hooks"].as_object().unwrap();
        assert_eq!(
            hooks["UserPromptSubmit"][0]["hooks"][0]["command"],
            "ai-bgm play work 0"
        );
        assert_eq!(hooks["Stop"][0]["hooks"][0]["command"], "ai-bgm play done");
        assert_eq!(hooks["SessionEnd"][0]["hooks"][0]["command"], "ai-bgm stop");
        assert_eq!(
            hooks["Notification"][0]["hooks"][0]["command"],
            "ai-bgm play notification 0"
        );
    }

    #[test]
    fn unrelated_settings_survive() {
        let mut settings = Map::new();
        settings.insert("model".to_string(), json!("opus"));
        let mut hooks = Map::new();
        hooks.insert("PreToolUse".to_string(), json!([{ "custom": true }]));
        settings.insert("hooks".to_string(), Value::Object(hooks));

        ClaudeCode.install_hooks(&mut settings);

        assert_eq!(settings["model"], "opus");
        assert_eq!(settings["hooks"]["PreToolUse"][0]["custom"], true);
        assert!(settings["hooks"]["Stop"].is_array());
    }

    #[test]
    fn malformed_hooks_value_is_repaired() {
        let mut settings = Map::new();
        settings.insert("hooks".to_string(), json!("oops"));
        IFlow.install_hooks(&mut settings);
        assert!(settings["hooks"].is_object());
    }

    #[test]
    fn cursor_adds_version_once() {
        let mut settings = Map::new();
        settings.insert("version".to_string(), json!(3));
        CursorAgent.install_hooks(&mut settings);
        assert_eq!(settings["version"], 3);
        assert_eq!(
            settings["hooks"]["beforeSubmitPrompt"][0]["command"],
            "ai-bgm play work 0"
        );
    }

    #[test]
    fn registry_lists_unique_tool_ids() {
        let integrations = all_integrations();
        let mut ids: Vec<&str> = integrations.iter().map(|i| i.tool_info().0).collect();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert!(ids.contains(&"claude"));
    }
}
