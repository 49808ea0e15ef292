use chrono::{DateTime, Utc};

use crate::media::{upload, MediaError, MediaStorage, UploadFile, UploadPolicy, UploadTarget};

/// Icons shipped with the site under `/assets/tools/`. Anything else in a
/// project's `tools` list is the URL of an uploaded icon.
pub const PRESET_TOOLS: &[&str] = &[
    "adobe illustrator.png",
    "aftereffect.png",
    "aistudio.png",
    "antigravity.png",
    "blender.png",
    "canon.png",
    "canva.png",
    "capcut.png",
    "chatgpt.png",
    "cinema4d.png",
    "claude.png",
    "clickup.png",
    "figma.png",
    "framer.png",
    "gemini.png",
    "lightroom.png",
    "midjourney.png",
    "photoshop.png",
    "premiere.png",
    "vercel.png",
    "webflow.png",
    "xd.png",
];

pub fn is_preset(tool: &str) -> bool {
    PRESET_TOOLS.contains(&tool)
}

/// Adds `tool` if absent, removes it if present.
pub fn toggle(selected: &mut Vec<String>, tool: &str) {
    if let Some(pos) = selected.iter().position(|t| t == tool) {
        selected.remove(pos);
    } else {
        selected.push(tool.to_string());
    }
}

/// Selected entries that are not presets, in selection order.
pub fn custom_tools(selected: &[String]) -> Vec<&str> {
    selected
        .iter()
        .map(String::as_str)
        .filter(|t| !is_preset(t))
        .collect()
}

/// What the selector grid shows: every preset, then the custom icons.
pub fn available_tools(selected: &[String]) -> Vec<String> {
    PRESET_TOOLS
        .iter()
        .map(|t| t.to_string())
        .chain(custom_tools(selected).into_iter().map(String::from))
        .collect()
}

pub fn display_name(tool: &str) -> String {
    if tool.starts_with("http") {
        return "Custom Tool".to_string();
    }
    tool.replacen(".png", "", 1).replace(['-', '_'], " ")
}

/// Uploads a custom icon under `tools/` and selects it.
pub async fn add_custom_tool(
    storage: &dyn MediaStorage,
    selected: &mut Vec<String>,
    file: &UploadFile,
    policy: &UploadPolicy,
    now: DateTime<Utc>,
) -> Result<String, MediaError> {
    let url = upload(storage, file, UploadTarget::Tools.prefix(), policy, now).await?;
    selected.push(url.clone());
    Ok(url)
}
