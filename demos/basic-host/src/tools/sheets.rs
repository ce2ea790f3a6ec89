//! Sheets range helpers exposed as tools.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tool_registry::{ToolFailure, ToolMetadata, ToolOutcome, ToolRegistrar, ToolResult};

#[derive(Debug, Deserialize)]
struct RangeArgs {
    #[serde(default)]
    sheet_name: Option<String>,
    start_row: u32,
    start_column: u32,
    #[serde(default)]
    end_row: Option<u32>,
    #[serde(default)]
    end_column: Option<u32>,
}

/// Converts a 1-based column index to its letter form (1 = A, 27 = AA).
fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

async fn build_a1_range(args: Value) -> ToolOutcome {
    let args: RangeArgs = serde_json::from_value(args)?;
    if args.start_row == 0 || args.start_column == 0 {
        return Err(ToolFailure::invalid_arguments(
            "rows and columns are 1-based",
        ));
    }

    let mut range = format!("{}{}", column_letters(args.start_column), args.start_row);
    if let (Some(end_row), Some(end_column)) = (args.end_row, args.end_column) {
        if end_row < args.start_row || end_column < args.start_column {
            return Err(ToolFailure::user_facing(format!(
                "Error: range end {}{end_row} is before its start {range}",
                column_letters(end_column)
            )));
        }
        range = format!("{range}:{}{end_row}", column_letters(end_column));
    }

    Ok(match args.sheet_name.as_deref() {
        Some(sheet) => format!("'{}'!{range}", sheet.replace('\'', "''")),
        None => range,
    })
}

pub fn register(registrar: &mut dyn ToolRegistrar) -> ToolResult<()> {
    registrar.add_tool(
        ToolMetadata::new("build_a1_range")?
            .with_description("Build an A1 notation range from row and column indices")
            .with_service("sheets"),
        Arc::new(build_a1_range),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(703), "AAA");
    }

    #[tokio::test]
    async fn builds_quoted_range() {
        let range = build_a1_range(json!({
            "sheet_name": "Q1 Sales",
            "start_row": 1,
            "start_column": 1,
            "end_row": 10,
            "end_column": 3
        }))
        .await
        .unwrap();
        assert_eq!(range, "'Q1 Sales'!A1:C10");
    }

    #[tokio::test]
    async fn inverted_range_is_user_facing() {
        let err = build_a1_range(json!({
            "start_row": 5,
            "start_column": 2,
            "end_row": 1,
            "end_column": 2
        }))
        .await
        .unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "Error: range end B1 is before its start B5");
    }

    #[tokio::test]
    async fn zero_index_is_invalid() {
        let err = build_a1_range(json!({ "start_row": 0, "start_column": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolFailure::InvalidArguments { .. }));
    }
}
