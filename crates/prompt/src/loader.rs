//! Prompt loader for YAML prompt definitions.
//!
//! Built-in definitions ship inside the crate. A file named `<id>.yml` in the
//! workspace's `.paddock/prompts/` directory replaces the built-in one.

use crate::types::PromptDefinition;
use paddock_core::{AppError, AppResult};
use std::path::Path;

const BUILTIN_PROMPTS: [(&str, &str); 3] = [
    ("facts.sql", include_str!("../prompts/facts.sql.yml")),
    ("live.ask", include_str!("../prompts/live.ask.yml")),
    ("docs.answer", include_str!("../prompts/docs.answer.yml")),
];

/// Load a prompt definition by ID, preferring a workspace override.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.paddock/`
/// * `prompt_id` - Prompt identifier (e.g., "facts.sql")
///
/// # Example
/// ```no_run
/// use paddock_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "live.ask")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".paddock/prompts")
        .join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents, &format!("{:?}", prompt_file))?;
        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    builtin_prompt(prompt_id)
}

/// Load a built-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let contents = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, yaml)| *yaml)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

/// List prompt IDs: built-ins plus any workspace overrides or additions.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let prompts_dir = workspace_path.join(".paddock/prompts");
    if prompts_dir.exists() {
        for entry in walkdir::WalkDir::new(&prompts_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    prompt_ids.dedup();
    Ok(prompt_ids)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, contents: &str) {
        let prompts_dir = dir.join(".paddock/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), contents).unwrap();
    }

    #[test]
    fn test_builtin_prompts_parse() {
        for (id, _) in BUILTIN_PROMPTS {
            let def = builtin_prompt(id).unwrap();
            assert_eq!(def.id, id);
            assert!(def.system.is_some());
        }
    }

    #[test]
    fn test_load_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let def = load_prompt(temp_dir.path(), "facts.sql").unwrap();
        assert!(def.template.contains("{{question}}"));
        assert!(def.template.contains("{{schema}}"));
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "live.ask",
            r#"
id: live.ask
title: "Terse live answer"
apiVersion: "1.1"
template: "Briefly: {{question}}"
output:
  format: text
"#,
        );

        let def = load_prompt(temp_dir.path(), "live.ask").unwrap();
        assert_eq!(def.title, "Terse live answer");
        assert!(def.system.is_none());
    }

    #[test]
    fn test_invalid_override_is_error() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "docs.answer", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "docs.answer").is_err());
    }

    #[test]
    fn test_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_list_prompts_merges_overrides() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "live.ask", "id: x");
        write_override(temp_dir.path(), "custom.extra", "id: y");

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(
            prompts,
            vec!["custom.extra", "docs.answer", "facts.sql", "live.ask"]
        );
    }
}
