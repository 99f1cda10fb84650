use std::io::Write;

use battle_content::{ConfigLoader, ScenarioLoader};
use battle_core::{AgentId, ValidationLevel};

#[test]
fn loads_config_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_ticks = 120\n[execution]\nvalidation_level = \"strict\"").unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.max_ticks, 120);
    assert_eq!(config.execution.validation_level, ValidationLevel::Strict);
}

#[test]
fn scenario_name_defaults_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ambush.ron");
    std::fs::write(
        &path,
        "(agents: [(id: 4, team: Some(1), position: (x: 10.0, y: -10.0))])",
    )
    .unwrap();

    let scenario = ScenarioLoader::load(&path).unwrap();
    assert_eq!(scenario.name, "ambush");
    let field = scenario.build_battlefield().unwrap();
    assert!(field.agent(AgentId(4)).is_some());
}

#[test]
fn missing_file_reports_path() {
    let err = ScenarioLoader::load(std::path::Path::new("/nonexistent/battle.ron")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/battle.ron"));
}

#[test]
fn bundled_data_loads() {
    let data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

    let config = ConfigLoader::load(&data.join("config.toml")).unwrap();
    assert_eq!(config.max_ticks, 300);
    assert_eq!(config.execution.validation_level, ValidationLevel::Strict);

    let scenario = ScenarioLoader::load(&data.join("scenarios/skirmish.ron")).unwrap();
    let field = scenario.build_battlefield().unwrap();
    assert_eq!(field.len(), 7);
    assert_eq!(field.living_teams().len(), 2);
    assert_eq!(field.agent(AgentId(4)).unwrap().stats.max_health, 130.0);
    assert!(field.agent(AgentId(7)).unwrap().team.is_none());
}

#[test]
fn execution_records_serialize() {
    use battle_core::{
        Action, ActionExecutor, AgentState, AgentStats, Battlefield, ExecutionContext,
        ExecutionStats, TeamId, Vec2,
    };

    let mut field = Battlefield::default().with_agent(AgentState::new(
        AgentId(1),
        Some(TeamId(1)),
        Vec2::new(0.0, 0.0),
        AgentStats::default(),
    ));
    let snapshot = field.snapshot(AgentId(1)).unwrap();
    let mut executor = ActionExecutor::default();
    let result = executor.execute(ExecutionContext::new(
        Action::Defend,
        snapshot,
        &mut field,
        ValidationLevel::Standard,
    ));

    let text = ron::to_string(&result).unwrap();
    assert!(text.contains("pre_state"));
    assert!(text.contains("post_state"));
    assert!(result.post_state.is_some());
    assert!(text.contains("DamageReduction"));

    let stats = *executor.stats();
    let restored: ExecutionStats = ron::from_str(&ron::to_string(&stats).unwrap()).unwrap();
    assert_eq!(restored, stats);
}
