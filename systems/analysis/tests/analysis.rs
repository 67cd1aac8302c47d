use roboyard_core::{Board, Color, Level, Position, Robot, Target};
use roboyard_system_analysis::{Analyzer, TrapPolicy, TrappedRobot};

fn standard_level() -> Level {
    let mut board = Board::new(12, 14).expect("board");
    board.enclose_border();
    let _ = board.enclose_center_block();
    Level::new(board)
}

fn place(level: &mut Level, robots: &[(Color, u32, u32)], target: Option<(u32, u32)>) {
    for &(color, x, y) in robots {
        level
            .push_robot(Robot {
                color,
                position: Position::new(x, y),
            })
            .expect("robot on board");
    }
    if let Some((x, y)) = target {
        level
            .set_target(Target {
                color: Color::Red,
                position: Position::new(x, y),
            })
            .expect("target on board");
    }
}

#[test]
fn clean_level_reports_nothing() {
    let mut level = standard_level();
    place(
        &mut level,
        &[
            (Color::Red, 1, 1),
            (Color::Blue, 10, 1),
            (Color::Yellow, 1, 12),
            (Color::Green, 10, 12),
        ],
        Some((3, 4)),
    );

    let report = Analyzer::default().analyze(&level);
    assert!(
        report.regions.is_empty(),
        "only the center block is unreachable and it must be filtered"
    );
    assert_eq!(report.unreachable_count, 0);
    assert_eq!(report.target_reachable, Some(true));
    assert!(!report.has_anomalies());
}

#[test]
fn boxed_robot_and_its_pocket_are_reported() {
    let artifact = "board:8,8;\nmh0,1;\nmv1,0;\nrobot_red0,0;\nrobot_blue4,4;\ntarget_green0,0;";
    let level = Level::from_artifact(artifact).expect("artifact parses");

    let report = Analyzer::default().analyze(&level);
    assert_eq!(
        report.trapped_robots,
        vec![TrappedRobot {
            position: Position::new(0, 0),
            reach: 1,
        }]
    );
    assert_eq!(report.regions.len(), 1);
    assert_eq!(report.unreachable_count, 1);
    assert_eq!(
        report.target_reachable,
        Some(false),
        "target sits in the trapped robot's pocket"
    );
    assert!(report.target_overlaps_robot);
    assert!(report.has_anomalies());
}

#[test]
fn region_touching_the_center_keeps_its_outer_cells() {
    let artifact = "board:12,14;\nmv5,6;\nmv5,7;\nmh5,6;\nmh6,6;\nmv7,6;\nmh5,8;\nmh6,8;\nmh7,7;\nmh7,8;\nmv8,7;\nrobot_red0,0;";
    let level = Level::from_artifact(artifact).expect("artifact parses");

    let report = Analyzer::default().analyze(&level);
    assert_eq!(report.regions.len(), 1);
    assert_eq!(
        report.regions[0].iter().copied().collect::<Vec<_>>(),
        vec![Position::new(7, 7)],
        "the dead-end cell opening only into the center block is an anomaly"
    );
}

#[test]
fn all_trapped_robots_still_seed_the_fill() {
    let artifact = "board:4,4;\nrobot_red0,0;\nrobot_blue3,3;";
    let level = Level::from_artifact(artifact).expect("artifact parses");
    let report = Analyzer::new(TrapPolicy { ratio: 2.0 }).analyze(&level);

    assert_eq!(report.trapped_robots.len(), 2);
    assert!(report.regions.is_empty());
    assert_eq!(report.target_reachable, None);
}

#[test]
fn duplicate_robots_are_flagged() {
    let level = Level::from_artifact("board:4,4;\nrobot_red1,1;\nrobot_blue1,1;")
        .expect("artifact parses");
    let report = Analyzer::default().analyze(&level);
    assert_eq!(report.duplicate_robots, vec![Position::new(1, 1)]);
    assert!(report.has_anomalies());
}

#[test]
fn report_serialises_to_json() {
    let level = Level::from_artifact("board:4,4;\nrobot_red1,1;").expect("artifact parses");
    let report = Analyzer::default().analyze(&level);
    let json = serde_json::to_value(&report).expect("report serialises");
    assert_eq!(json["width"], 4);
    assert_eq!(json["target_reachable"], serde_json::Value::Null);
    assert!(json["regions"].as_array().expect("array").is_empty());
}
