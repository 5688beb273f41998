use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MovementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Alliance,
    Horde,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Paladin,
    Hunter,
    Rogue,
    Priest,
    Shaman,
    Mage,
    Warlock,
    Druid,
}

impl CharacterClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "warrior" => Some(Self::Warrior),
            "paladin" => Some(Self::Paladin),
            "hunter" => Some(Self::Hunter),
            "rogue" => Some(Self::Rogue),
            "priest" => Some(Self::Priest),
            "shaman" => Some(Self::Shaman),
            "mage" => Some(Self::Mage),
            "warlock" => Some(Self::Warlock),
            "druid" => Some(Self::Druid),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_2d(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Read-only view of a unit, resolved fresh from the world on every query.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitState {
    pub position: Position,
    pub orientation: f32,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
    pub ghost: bool,
    pub class: CharacterClass,
    pub map: MapId,
    pub team: Team,
    pub stopped: bool,
}

impl UnitState {
    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    /// Integer comparison so that exactly `pct` percent is never "below".
    pub fn health_below_pct(&self, pct: u32) -> bool {
        (self.health as u64) * 100 < (self.max_health as u64) * pct as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraDuration {
    Permanent,
    RemainingMs(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerHandles {
    pub unit: UnitId,
    pub movement: MovementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    RepopRequest,
}

impl OutboundKind {
    pub fn payload_len(self) -> usize {
        match self {
            Self::RepopRequest => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub kind: OutboundKind,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    pub fn new(kind: OutboundKind) -> Self {
        Self {
            kind,
            payload: vec![0; kind.payload_len()],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeState {
    Alive,
    DeadAwaitingGhost,
    DeadGhost,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    SessionRegistered {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    SessionRemoved {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    SessionSkipped {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    TargetAcquired {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        target: UnitId,
    },
    TargetLost {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        target: UnitId,
    },
    SpellCast {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        spell: SpellId,
        target: UnitId,
    },
    MoveIssued {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        destination: Position,
    },
    AttackStarted {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        target: UnitId,
    },
    RepopRequested {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    ForcedRespawn {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    RecoveryPointSet {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        point: Position,
    },
    Revived {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
}
