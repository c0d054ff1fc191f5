//! Runs one planning request and one visibility pass, printing the wire
//! results as JSON.
//!
//! ```text
//! RUST_LOG=terrasight=debug cargo run --example plan_request -- request.json
//! ```
//!
//! The request file holds `{"position": {..}, "target": {..}, "blocks": [..]}`
//! with optional `"planner"` and `"visibility"` config objects. Without a file
//! a small built-in scene is used.

use serde::Deserialize;
use serde_json::{json, Value};
use terrasight::planner::plan_path_records;
use terrasight::visibility::{filter_visible_surface_records, CodeFilter};
use terrasight::{PlannerConfig, Position, VisibilityConfig};
use tracing::info;

#[derive(Debug, Deserialize)]
struct Request {
    position: Position,
    target: Position,
    blocks: Vec<Value>,
    #[serde(default)]
    planner: PlannerConfig,
    #[serde(default)]
    visibility: VisibilityConfig,
    /// Comma-separated keywords applied after the surface pass.
    #[serde(default)]
    filter: String,
}

fn builtin_scene() -> Request {
    let mut blocks = Vec::new();
    for x in -6..=6 {
        for z in -6i32..=6 {
            // a shallow ditch at x = 2 and a fence line with a wide gap at x = -3
            let y = if x == 2 { 63 } else { 64 };
            blocks.push(json!({"x": x, "y": y, "z": z, "code": "game:soil-medium-normal", "isSolid": true}));
            if x == -3 && z.abs() > 1 {
                blocks.push(json!({
                    "worldPos": {"x": x, "y": 65, "z": z},
                    "code": "game:woodenfence-oak-ns-free",
                    "isSolid": false
                }));
            }
        }
    }
    blocks.push(json!({"x": 4, "y": 65, "z": 1, "code": "game:looseflints-granite", "isSolid": false}));

    Request {
        position: Position::new(-5.5, 65.0, 0.5),
        target: Position::new(5.5, 65.0, 0.5),
        blocks,
        planner: PlannerConfig::default(),
        visibility: VisibilityConfig::default(),
        filter: String::new(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("terrasight=info".parse().expect("static directive")),
        )
        .init();

    let request = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).expect("Failed to read request file");
            serde_json::from_str(&text).expect("Failed to parse request")
        }
        None => builtin_scene(),
    };
    info!(
        blocks = request.blocks.len(),
        from = %request.position,
        to = %request.target,
        "planning"
    );

    let path = plan_path_records(request.position, request.target, &request.blocks, &request.planner);

    let mut visible =
        filter_visible_surface_records(request.position, &request.blocks, &request.visibility)
            .expect("Block records should decode");
    let keywords = CodeFilter::parse(&request.filter);
    visible.retain(|record| keywords.matches_record(record));

    let output = json!({
        "path": path,
        "visible_surface": visible,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).expect("JSON values always serialize")
    );
}
