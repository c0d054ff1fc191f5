use serde_json::json;
use terrasight::classify::{ClassificationRule, KeywordFamily, Predicate};
use terrasight::{parse_blocks, parse_blocks_json, BlockSample, Classification, Classifier, TerrainModel};

#[test]
fn flat_and_nested_records_normalize_identically() {
    let flat = json!([
        {"x": 1, "y": 64, "z": -3, "code": "game:soil-medium-normal", "isSolid": true},
        {"x": 1.9, "y": 65.2, "z": -2.5, "code": "game:tallgrass-medium-free", "isSolid": false}
    ]);
    let nested = json!({
        "blocks": [
            {"worldPos": {"x": 1, "y": 64, "z": -3}, "code": "game:soil-medium-normal", "isSolid": true},
            {"worldPos": {"x": 1.2, "y": 65, "z": -3.0}, "code": "game:tallgrass-medium-free", "isSolid": false}
        ]
    });

    let a = parse_blocks(flat.as_array().unwrap()).unwrap();
    let b = parse_blocks_json(&nested.to_string()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[1].position(), (1, 65, -3));
}

#[test]
fn world_pos_wins_over_flat_fields() {
    let records = vec![json!({
        "x": 50, "y": 50, "z": 50,
        "worldPos": {"x": 1, "y": 2, "z": 3},
        "code": "game:rock-granite"
    })];
    let blocks = parse_blocks(&records).unwrap();
    assert_eq!(blocks[0].position(), (1, 2, 3));
    assert!(blocks[0].solid, "missing isSolid is inferred for non-air codes");
}

#[test]
fn solid_flag_inferred_from_code() {
    let records = vec![
        json!({"x": 0, "y": 0, "z": 0, "code": "game:air"}),
        json!({"x": 0, "y": 1, "z": 0, "code": "game:water-still-7"}),
        json!({"x": 0, "y": 2, "z": 0, "code": "game:planks-oak"}),
    ];
    let blocks = parse_blocks(&records).unwrap();
    assert!(!blocks[0].solid);
    assert!(!blocks[1].solid && blocks[1].liquid);
    assert!(blocks[2].solid);
}

#[test]
fn classification_table_order() {
    let cases = [
        (BlockSample::non_solid((0, 0, 0), "game:water-still-7"), Classification::Liquid),
        // liquid keyword wins even over a solid flag
        (BlockSample::new((0, 0, 0), "game:lava-still-7", true), Classification::Liquid),
        (BlockSample::solid((0, 0, 0), "game:leaves-grown-birch"), Classification::PassableDespiteSolid),
        (BlockSample::solid((0, 0, 0), "game:leavesbranchy-grown-oak"), Classification::Solid),
        (BlockSample::solid((0, 0, 0), "game:leaves-woody-oak"), Classification::Solid),
        (BlockSample::non_solid((0, 0, 0), "game:woodenfence-pine-ew-free"), Classification::HiddenCollision),
        (BlockSample::non_solid((0, 0, 0), "game:lantern-up"), Classification::HiddenCollision),
        (BlockSample::non_solid((0, 0, 0), "game:lantern-down"), Classification::Open),
        (BlockSample::non_solid((0, 0, 0), "game:tallgrass-tall-free"), Classification::Open),
        (BlockSample::solid((0, 0, 0), "game:rock-granite"), Classification::Solid),
    ];
    let classifier = Classifier::default();
    for (sample, expected) in cases {
        assert_eq!(classifier.classify(&sample), expected, "{}", sample);
    }
}

#[test]
fn custom_rules_extend_the_table() {
    const HAYSTACK: &[KeywordFamily] = &[KeywordFamily::new("haybale", &["hay"])];
    let classifier = Classifier::default().with_rule(ClassificationRule {
        name: "haybale",
        predicate: Predicate::AnyFamily(HAYSTACK),
        reported_solid: Some(false),
        class: Classification::HiddenCollision,
    });

    let blocks = vec![
        BlockSample::solid((0, 100, 0), "game:soil"),
        BlockSample::non_solid((0, 101, 0), "game:haybale-ud"),
    ];
    let default_model = TerrainModel::build(&blocks, None);
    assert_eq!(default_model.surface((0, 0)), Some(100));

    let custom = TerrainModel::build_with(&blocks, None, &classifier);
    assert!(custom.is_solid((0, 101, 0)));
    assert_eq!(custom.surface((0, 0)), None);
}

#[test]
fn overhang_prefers_floor_near_agent() {
    // a cave: floor at 60, ceiling slab 64..=66 above it
    let mut blocks = Vec::new();
    for x in 0..3 {
        blocks.push(BlockSample::solid((x, 60, 0), "game:rock-granite"));
        for y in 64..=66 {
            blocks.push(BlockSample::solid((x, y, 0), "game:rock-granite"));
        }
    }
    let underground = TerrainModel::build(&blocks, Some(61));
    let topside = TerrainModel::build(&blocks, Some(67));
    for x in 0..3 {
        assert_eq!(underground.surface((x, 0)), Some(60));
        assert_eq!(topside.surface((x, 0)), Some(66));
    }
}

#[test]
fn classification_counts_cover_every_sample() {
    let blocks = vec![
        BlockSample::solid((0, 100, 0), "game:soil"),
        BlockSample::solid((1, 100, 0), "game:soil"),
        BlockSample::non_solid((2, 100, 0), "game:water-still-7"),
        BlockSample::solid((0, 101, 0), "game:leaves-grown-oak"),
        BlockSample::non_solid((1, 101, 0), "game:chest-north"),
        BlockSample::non_solid((3, 101, 0), "game:flower-catmint"),
    ];
    let counts = TerrainModel::build(&blocks, None).classification_counts();
    assert_eq!(counts.solid, 2);
    assert_eq!(counts.liquid, 1);
    assert_eq!(counts.passable, 1);
    assert_eq!(counts.hidden_collision, 1);
    assert_eq!(counts.open, 1);
    assert_eq!(counts.total(), blocks.len());
}

#[test]
fn reported_solid_slab_is_walkable_ground() {
    let blocks = vec![
        BlockSample::solid((0, 100, 0), "game:soil"),
        BlockSample::solid((0, 101, 0), "game:plankslab-oak-down-free"),
        BlockSample::non_solid((1, 101, 0), "game:plankslab-oak-down-free"),
        BlockSample::solid((1, 100, 0), "game:soil"),
    ];
    let terrain = TerrainModel::build(&blocks, Some(102));
    assert_eq!(terrain.surface((0, 0)), Some(101));
    // the non-solid slab covers the soil and is no surface itself
    assert!(!terrain.has_column((1, 0)));
    assert!(terrain.is_solid((1, 101, 0)));
    assert_eq!(terrain.classification_counts().hidden_collision, 1);
}

#[test]
fn samples_outside_world_bounds_are_skipped() {
    let blocks = vec![
        BlockSample::solid((0, 100, 0), "game:soil"),
        BlockSample::solid((0, i32::MAX, 0), "game:soil"),
        BlockSample::solid((i32::MIN, 100, 0), "game:soil"),
    ];
    let terrain = TerrainModel::build(&blocks, None);
    assert_eq!(terrain.surface((0, 0)), Some(100));
    assert_eq!(terrain.column_count(), 1);
}
