//! Drive helpers exposed as tools.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tool_registry::{ToolFailure, ToolMetadata, ToolOutcome, ToolRegistrar, ToolResult};

const SERVICE: &str = "drive";
const SHARED_ROLES: [&str; 3] = ["reader", "writer", "commenter"];

#[derive(Debug, Deserialize)]
struct ImageUrlArgs {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct Permission {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicLinkArgs {
    file_name: String,
    file_id: String,
    #[serde(default)]
    permissions: Vec<Permission>,
}

/// Embeddable URL for a publicly shared Drive image.
fn image_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=view&id={file_id}")
}

fn has_public_link(permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| {
        p.kind == "anyone"
            && p.role
                .as_deref()
                .is_some_and(|role| SHARED_ROLES.contains(&role))
    })
}

async fn get_drive_image_url(args: Value) -> ToolOutcome {
    let args: ImageUrlArgs = serde_json::from_value(args)?;
    if args.file_id.trim().is_empty() {
        return Err(ToolFailure::invalid_arguments("`file_id` cannot be empty"));
    }
    Ok(image_url(&args.file_id))
}

async fn check_public_link(args: Value) -> ToolOutcome {
    let args: PublicLinkArgs = serde_json::from_value(args)?;
    if !has_public_link(&args.permissions) {
        return Err(ToolFailure::msg(format!(
            "\u{274c} Permission Error: '{}' not shared publicly. \
             Set 'Anyone with the link' \u{2192} 'Viewer' in Google Drive sharing. \
             File: https://drive.google.com/file/d/{}/view",
            args.file_name, args.file_id
        )));
    }
    Ok(format!(
        "'{}' is shared publicly: {}",
        args.file_name,
        image_url(&args.file_id)
    ))
}

pub fn register(registrar: &mut dyn ToolRegistrar) -> ToolResult<()> {
    registrar.add_tool(
        ToolMetadata::new("get_drive_image_url")?
            .with_description("Build the embeddable URL of a publicly shared Drive image")
            .with_service(SERVICE),
        Arc::new(get_drive_image_url),
    )?;
    registrar.add_tool(
        ToolMetadata::new("check_public_link")?
            .with_description("Check that a Drive file is shared with anyone holding the link")
            .with_service(SERVICE),
        Arc::new(check_public_link),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn builds_image_url() {
        let url = get_drive_image_url(json!({ "file_id": "abc123" })).await.unwrap();
        assert_eq!(url, "https://drive.google.com/uc?export=view&id=abc123");
    }

    #[tokio::test]
    async fn missing_file_id_is_invalid() {
        let err = get_drive_image_url(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolFailure::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn private_file_fails_with_presentable_message() {
        let err = check_public_link(json!({
            "file_name": "logo.png",
            "file_id": "abc123",
            "permissions": [{ "type": "user", "role": "owner" }]
        }))
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with('\u{274c}'));
    }

    #[tokio::test]
    async fn public_file_passes() {
        let text = check_public_link(json!({
            "file_name": "logo.png",
            "file_id": "abc123",
            "permissions": [{ "type": "anyone", "role": "reader" }]
        }))
        .await
        .unwrap();
        assert!(text.contains("uc?export=view&id=abc123"));
    }
}
