use chrono::{SecondsFormat, Utc};
use clap::Parser;
use player_autopilot::autopilot::{Autopilot, LifecycleHooks};
use player_autopilot::config::AutopilotConfig;
use player_autopilot::constants::paladin;
use player_autopilot::sim_world::{SimWorld, SpellEffect};
use player_autopilot::types::{
    AuraDuration, CharacterClass, ControllerEvent, MapId, PlayerId, Position, Team,
};
use player_autopilot::world::GameWorld;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const MAP: MapId = MapId(0);
const ARENA_HALF_SIZE: f32 = 45.0;
const STUCK_DEAD_MS: u64 = 60_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    players: Option<usize>,
    #[arg(long)]
    class: Option<String>,
    #[arg(long)]
    hostiles: Option<usize>,
    #[arg(long)]
    seconds: Option<u64>,
    #[arg(long)]
    tick_ms: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    players: usize,
    class: CharacterClass,
    hostiles: usize,
    seconds: u64,
    #[serde(rename = "tickMs")]
    tick_ms: u32,
    seed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    players: usize,
    class: CharacterClass,
    hostiles: usize,
    ticks: u64,
    #[serde(rename = "spellCasts")]
    spell_casts: u32,
    #[serde(rename = "movesIssued")]
    moves_issued: u32,
    #[serde(rename = "targetsAcquired")]
    targets_acquired: u32,
    #[serde(rename = "repopRequests")]
    repop_requests: u32,
    #[serde(rename = "forcedRespawns")]
    forced_respawns: u32,
    revives: u32,
    #[serde(rename = "skippedSessions")]
    skipped_sessions: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "totalRepopRequests")]
    total_repop_requests: u32,
    #[serde(rename = "totalForcedRespawns")]
    total_forced_respawns: u32,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Default)]
struct AnomalyLog {
    messages: Vec<String>,
    records: Vec<AnomalyRecord>,
    seen: HashSet<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match AutopilotConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "failed to load autopilot config");
            std::process::exit(2);
        }
    };
    let scenarios = resolve_scenarios(&cli);
    let started_at = now_rfc3339();
    let run_id = default_run_id(scenarios.first().map(|s| s.seed).unwrap_or(0));
    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        info!(
            run = %run_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            players = scenario.players,
            hostiles = scenario.hostiles,
            "scenario started"
        );
        let run = run_scenario(&scenario, &config);

        for anomaly in &run.anomaly_records {
            warn!(
                scenario = %scenario.name,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }
        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();

        info!(
            scenario = %scenario.name,
            ticks = run.result.ticks,
            repops = run.result.repop_requests,
            respawns = run.result.forced_respawns,
            anomalies = run.anomaly_records.len(),
            "scenario finished"
        );
        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => error!(%error, "failed to serialize scenario result"),
        }
        results.push(run.result);
    }

    let summary = build_run_summary(run_id, started_at, now_rfc3339(), results, total_anomalies);

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            error!(path = %path.display(), %error, "failed to write run summary");
            std::process::exit(2);
        }
        info!(path = %path.display(), "run summary written");
    }

    info!(
        scenarios = summary.scenario_count,
        anomalies = summary.anomaly_count,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, config: &AutopilotConfig) -> ScenarioRunResult {
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let mut world = build_world();
    let mut autopilot = Autopilot::new(config.clone());
    let mut result = ScenarioResultLine::new(scenario);
    let mut anomalies = AnomalyLog::default();

    let mut players = Vec::new();
    for _ in 0..scenario.players {
        let position = random_position(&mut rng);
        let (player, handles) = world.spawn_player(scenario.class, Team::Alliance, MAP, position);
        autopilot.on_login(&mut world, player, handles);
        players.push(player);
    }
    for _ in 0..scenario.hostiles {
        spawn_random_hostile(&mut world, &mut rng);
    }

    let tick_ms = scenario.tick_ms.max(1);
    let total_ticks = scenario.seconds * 1_000 / tick_ms as u64;
    let mut awaiting_release: BTreeSet<PlayerId> = BTreeSet::new();
    let mut dead_since: BTreeMap<PlayerId, u64> = BTreeMap::new();

    for tick in 1..=total_ticks {
        let now_ms = tick * tick_ms as u64;
        let report = autopilot.on_world_tick(&mut world, tick_ms);
        let registered = autopilot.registry().len();
        if report.visited != registered {
            anomalies.push(
                tick,
                format!("tick visited {} of {registered} sessions", report.visited),
            );
        }

        for message in collect_session_anomalies(&autopilot, &world) {
            anomalies.push(tick, message);
        }

        let mut repops_this_tick: BTreeMap<PlayerId, u32> = BTreeMap::new();
        for event in autopilot.drain_events() {
            match event {
                ControllerEvent::SpellCast { .. } => result.spell_casts += 1,
                ControllerEvent::MoveIssued { .. } => result.moves_issued += 1,
                ControllerEvent::TargetAcquired { .. } => result.targets_acquired += 1,
                ControllerEvent::SessionSkipped { .. } => result.skipped_sessions += 1,
                ControllerEvent::ForcedRespawn { .. } => result.forced_respawns += 1,
                ControllerEvent::RepopRequested { player_id } => {
                    result.repop_requests += 1;
                    *repops_this_tick.entry(player_id).or_insert(0) += 1;
                    if !awaiting_release.insert(player_id) {
                        anomalies.push(
                            tick,
                            format!("repeated repop request in one death for {player_id:?}"),
                        );
                    }
                }
                ControllerEvent::Revived { player_id } => {
                    result.revives += 1;
                    awaiting_release.remove(&player_id);
                }
                _ => {}
            }
        }
        for (player, count) in repops_this_tick {
            if count > 1 {
                anomalies.push(
                    tick,
                    format!("{count} repop requests in one tick for {player:?}"),
                );
            }
        }

        world.advance(tick_ms);
        for player in world.process_outbox() {
            awaiting_release.remove(&player);
            autopilot.on_ghost_released(&mut world, player);
        }
        world.move_ghosts_to_graveyards();

        while world.hostile_ids().len() < scenario.hostiles {
            spawn_random_hostile(&mut world, &mut rng);
        }

        for player in &players {
            let dead = autopilot
                .session(*player)
                .and_then(|record| world.unit(record.unit).ok())
                .is_some_and(|state| !state.alive);
            if !dead {
                dead_since.remove(player);
                continue;
            }
            let since = *dead_since.entry(*player).or_insert(now_ms);
            if now_ms - since > STUCK_DEAD_MS {
                anomalies.push(tick, format!("{player:?} stuck dead"));
            }
        }
        result.ticks = tick;
    }

    for player in players {
        LifecycleHooks::<SimWorld>::on_logout(&mut autopilot, player);
    }
    if !autopilot.registry().is_empty() {
        anomalies.push(result.ticks, "sessions left after logout".to_string());
    }

    result.anomalies = anomalies.messages;
    ScenarioRunResult {
        result,
        anomaly_records: anomalies.records,
    }
}

fn build_world() -> SimWorld {
    let mut world = SimWorld::new();
    world.define_spell(
        paladin::DEVOTION_AURA,
        SpellEffect::Aura(AuraDuration::Permanent),
    );
    world.define_spell(
        paladin::BLESSING_OF_MIGHT,
        SpellEffect::Aura(AuraDuration::RemainingMs(300_000)),
    );
    world.define_spell(
        paladin::SEAL_OF_RIGHTEOUSNESS,
        SpellEffect::Aura(AuraDuration::RemainingMs(30_000)),
    );
    world.define_spell(paladin::HOLY_LIGHT, SpellEffect::Heal(80));
    world.define_spell(paladin::JUDGEMENT, SpellEffect::Damage(15));
    world.add_graveyard(
        MAP,
        Some(Team::Alliance),
        Position::new(-ARENA_HALF_SIZE - 15.0, -ARENA_HALF_SIZE - 15.0, 0.0),
    );
    world.add_graveyard(
        MAP,
        None,
        Position::new(ARENA_HALF_SIZE + 15.0, ARENA_HALF_SIZE + 15.0, 0.0),
    );
    world
}

fn random_position(rng: &mut StdRng) -> Position {
    Position::new(
        rng.random_range(-ARENA_HALF_SIZE..=ARENA_HALF_SIZE),
        rng.random_range(-ARENA_HALF_SIZE..=ARENA_HALF_SIZE),
        0.0,
    )
}

fn spawn_random_hostile(world: &mut SimWorld, rng: &mut StdRng) {
    let position = random_position(rng);
    let health = rng.random_range(60..=140);
    world.spawn_hostile(MAP, position, health);
}

/// Checks that only hold between ticks: a dead player never keeps a target.
fn collect_session_anomalies(autopilot: &Autopilot, world: &SimWorld) -> Vec<String> {
    let mut anomalies = Vec::new();
    for player in autopilot.registry().player_ids() {
        let Some(record) = autopilot.session(player) else {
            continue;
        };
        let Ok(state) = world.unit(record.unit) else {
            continue;
        };
        if !state.alive && record.target.is_some() {
            anomalies.push(format!("dead {player:?} still has a cached target"));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    let class = cli
        .class
        .as_deref()
        .and_then(CharacterClass::parse)
        .unwrap_or(CharacterClass::Paladin);

    if cli.single
        || cli.players.is_some()
        || cli.class.is_some()
        || cli.hostiles.is_some()
        || cli.seconds.is_some()
        || cli.tick_ms.is_some()
    {
        let players = cli.players.unwrap_or(4).clamp(1, 200);
        return vec![Scenario {
            name: format!("custom-p{players}"),
            players,
            class,
            hostiles: cli.hostiles.unwrap_or(8).clamp(0, 500),
            seconds: cli.seconds.unwrap_or(120).clamp(1, 3_600),
            tick_ms: cli.tick_ms.unwrap_or(100).clamp(10, 5_000),
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-p2".to_string(),
            players: 2,
            class: CharacterClass::Paladin,
            hostiles: 4,
            seconds: 60,
            tick_ms: 100,
            seed,
        },
        Scenario {
            name: "crowd-check-p10".to_string(),
            players: 10,
            class: CharacterClass::Paladin,
            hostiles: 30,
            seconds: 300,
            tick_ms: 50,
            seed: seed.wrapping_add(1),
        },
    ]
}

impl ScenarioResultLine {
    fn new(scenario: &Scenario) -> Self {
        Self {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            players: scenario.players,
            class: scenario.class,
            hostiles: scenario.hostiles,
            ticks: 0,
            spell_casts: 0,
            moves_issued: 0,
            targets_acquired: 0,
            repop_requests: 0,
            forced_respawns: 0,
            revives: 0,
            skipped_sessions: 0,
            anomalies: Vec::new(),
        }
    }
}

impl AnomalyLog {
    /// Keeps every record but reports each distinct message once.
    fn push(&mut self, tick: u64, message: String) {
        self.records.push(AnomalyRecord {
            tick,
            message: message.clone(),
        });
        if self.seen.insert(message.clone()) {
            self.messages.push(message);
        }
    }
}

fn default_run_id(seed: u64) -> String {
    format!("sim-{seed}-{}", Utc::now().timestamp_millis())
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    RunSummary {
        run_id,
        started_at,
        finished_at,
        scenario_count: scenarios.len(),
        anomaly_count,
        total_repop_requests: scenarios.iter().map(|s| s.repop_requests).sum(),
        total_forced_respawns: scenarios.iter().map(|s| s.forced_respawns).sum(),
        scenarios,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
