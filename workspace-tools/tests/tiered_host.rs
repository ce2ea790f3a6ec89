use std::sync::Arc;

use serde_json::{Value, json};
use workspace_tools::config::{self, ToolSelection, ToolTier};
use workspace_tools::{RegistrationInterceptor, ToolFailure, ToolMetadata, ToolRegistry};

const SETTINGS: &str = "
services:
  sheets:
    core: [read_sheet_values]
    extended: [modify_sheet_values]
  forms:
    core: [get_form]
boundary:
  log_hint: the host journal
";

fn register_all(interceptor: &mut RegistrationInterceptor<ToolRegistry>) {
    interceptor
        .register(
            ToolMetadata::new("read_sheet_values").unwrap().with_service("sheets"),
            |_args: Value| async move { Ok::<_, ToolFailure>("A1=1".to_owned()) },
        )
        .unwrap();
    interceptor
        .register(
            ToolMetadata::new("modify_sheet_values").unwrap().with_service("sheets"),
            |_args: Value| async move { Err::<String, _>(ToolFailure::msg("quota exhausted")) },
        )
        .unwrap();
    interceptor
        .register(
            ToolMetadata::new("get_form").unwrap().with_service("forms"),
            |_args: Value| async move { Ok::<_, ToolFailure>("form".to_owned()) },
        )
        .unwrap();
}

fn host_for(selection: &ToolSelection) -> Arc<ToolRegistry> {
    let settings = config::parse(SETTINGS).unwrap();
    let enablement = settings.resolve(selection).unwrap();
    let host = Arc::new(ToolRegistry::new());
    let mut interceptor = RegistrationInterceptor::install(Arc::clone(&host), enablement)
        .with_boundary_policy(settings.boundary_policy());
    register_all(&mut interceptor);
    interceptor.filter();
    host
}

fn names(host: &ToolRegistry) -> Vec<String> {
    host.list().iter().map(|m| m.name().to_owned()).collect()
}

#[tokio::test]
async fn core_tier_of_one_service() {
    let host = host_for(
        &ToolSelection::default()
            .with_services(["sheets"])
            .with_tier(ToolTier::Core),
    );
    assert_eq!(names(&host), ["read_sheet_values"]);
    assert_eq!(host.invoke("read_sheet_values", json!({})).await.unwrap(), "A1=1");
}

#[tokio::test]
async fn extended_tier_renders_failures_with_configured_hint() {
    let host = host_for(&ToolSelection::default().with_tier(ToolTier::Extended));
    assert_eq!(
        names(&host),
        ["get_form", "modify_sheet_values", "read_sheet_values"]
    );

    let text = host
        .invoke("modify_sheet_values", json!({}))
        .await
        .unwrap();
    assert!(text.starts_with("**Unexpected Error in modify_sheet_values**"));
    assert!(text.contains("quota exhausted"));
    assert!(text.contains("please check the host journal"));
}

#[tokio::test]
async fn empty_selection_keeps_everything() {
    let host = host_for(&ToolSelection::default());
    assert_eq!(host.len(), 3);
}
