use serde_json::{json, Value};
use terrasight::visibility::{
    filter_visible_records, filter_visible_surface_records, retain_matching_codes,
};
use terrasight::{
    filter_visible, filter_visible_surface, BlockSample, Position, VisibilityConfig, VisibilityFilter,
};

fn observer() -> Position {
    // eye ends up at (0.5, 101.5, 0.5)
    Position::new(0.5, 100.0, 0.5)
}

fn codes(blocks: &[BlockSample]) -> Vec<&str> {
    blocks.iter().map(|b| b.code.as_str()).collect()
}

#[test]
fn unobstructed_block_is_visible() {
    let blocks = vec![BlockSample::solid((4, 101, 0), "game:rock-granite")];
    let visible = filter_visible(observer(), &blocks, &VisibilityConfig::default());
    assert_eq!(visible, blocks);
}

#[test]
fn interposed_block_hides_target() {
    let blocks = vec![
        BlockSample::solid((2, 101, 0), "game:cobblestone"),
        BlockSample::solid((5, 101, 0), "game:ore-rich-cassiterite"),
    ];
    let visible = filter_visible(observer(), &blocks, &VisibilityConfig::default());
    assert_eq!(codes(&visible), vec!["game:cobblestone"]);
}

#[test]
fn non_solid_blocker_does_not_occlude() {
    let blocks = vec![
        BlockSample::non_solid((2, 101, 0), "game:glass-plain"),
        BlockSample::solid((5, 101, 0), "game:ore-rich-cassiterite"),
    ];
    let visible = filter_visible(observer(), &blocks, &VisibilityConfig::default());
    // the floating glass pane has no support and is dropped, the ore is seen
    assert_eq!(codes(&visible), vec!["game:ore-rich-cassiterite"]);
}

#[test]
fn buried_block_is_not_a_surface_block() {
    let mut blocks = Vec::new();
    // 3x3x3 cube centered at (4, 101, 0); the center is fully enclosed
    for x in 3..=5 {
        for y in 100..=102 {
            for z in -1..=1 {
                blocks.push(BlockSample::solid((x, y, z), "game:rock-granite"));
            }
        }
    }
    let center = (4, 101, 0);
    let config = VisibilityConfig::default();

    // put the eye inside the cube's center so line of sight trivially reaches it
    let inside = Position::new(4.5, 101.0 - config.eye_height + 0.5, 0.5);
    let visible = filter_visible(inside, &blocks, &config);
    assert!(visible.iter().any(|b| b.position() == center));

    let surface = filter_visible_surface(inside, &blocks, &config);
    assert!(!surface.iter().any(|b| b.position() == center));
}

#[test]
fn surface_filter_keeps_exposed_faces() {
    let mut blocks = Vec::new();
    for x in -3..=3 {
        for z in -3..=3 {
            blocks.push(BlockSample::solid((x, 98, z), "game:rock-granite"));
            blocks.push(BlockSample::solid((x, 99, z), "game:soil-medium-normal"));
        }
    }
    blocks.push(BlockSample::non_solid((1, 100, 1), "game:looseflints-granite"));

    let filter = VisibilityFilter::new(&blocks, VisibilityConfig::default());
    let surface = filter.visible_surface(observer());
    assert!(!surface.is_empty());
    // the soil layer hides the rock layer beneath it
    assert!(surface.iter().all(|b| b.y >= 99));
    assert!(surface.iter().any(|b| b.code.contains("looseflints")));
}

#[test]
fn records_are_returned_in_input_order() {
    let records = vec![
        json!({"x": 3, "y": 100, "z": 0, "code": "game:rock-granite", "isSolid": true}),
        json!({"worldPos": {"x": 0, "y": 99, "z": 0}, "code": "game:soil", "isSolid": true}),
        json!({"x": 0, "y": 100, "z": 3, "code": "game:water-still-7", "isSolid": false}),
        json!({"x": 0, "y": 110, "z": 0, "code": "game:looseflints-granite", "isSolid": false}),
    ];
    let visible = filter_visible_records(observer(), &records, &VisibilityConfig::default()).unwrap();
    assert_eq!(visible, records[..3].to_vec());

    let dry = VisibilityConfig::default().with_liquids(false);
    let surface = filter_visible_surface_records(observer(), &records, &dry).unwrap();
    let kept: Vec<&Value> = surface.iter().map(|r| &r["code"]).collect();
    assert_eq!(kept, vec![&json!("game:rock-granite"), &json!("game:soil")]);
}

#[test]
fn malformed_records_are_rejected() {
    let records = vec![json!("not a block")];
    assert!(filter_visible_records(observer(), &records, &VisibilityConfig::default()).is_err());
}

#[test]
fn max_distance_limits_the_scan() {
    let blocks = vec![
        BlockSample::solid((3, 101, 0), "game:rock-granite"),
        BlockSample::solid((30, 101, 0), "game:rock-granite"),
    ];
    let config = VisibilityConfig::default().with_max_distance(10.0);
    let visible = filter_visible(observer(), &blocks, &config);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].x, 3);
}

#[test]
fn out_of_world_input_is_ignored() {
    let blocks = vec![
        BlockSample::solid((3, 101, 0), "game:rock-granite"),
        BlockSample::solid((3, i32::MAX, 0), "game:rock-granite"),
        BlockSample::non_solid((i32::MIN, 101, 0), "game:looseflints-granite"),
    ];
    let config = VisibilityConfig::default();
    let surface = filter_visible_surface(observer(), &blocks, &config);
    assert_eq!(surface, vec![blocks[0].clone()]);

    let lost = Position::new(0.5, 1e12, 0.5);
    assert!(filter_visible(lost, &blocks, &config).is_empty());
}

#[test]
fn keyword_filter_after_surface_pass() {
    let mut blocks = vec![
        BlockSample::solid((2, 100, 0), "game:ore-poor-nativecopper-granite"),
        BlockSample::solid((0, 100, 2), "game:rock-granite"),
        BlockSample::solid((-2, 100, 0), "game:ore-medium-galena-granite"),
    ];
    blocks = filter_visible_surface(observer(), &blocks, &VisibilityConfig::default());
    retain_matching_codes(&mut blocks, "galena, nativecopper");
    assert_eq!(
        codes(&blocks),
        vec!["game:ore-poor-nativecopper-granite", "game:ore-medium-galena-granite"]
    );
}
