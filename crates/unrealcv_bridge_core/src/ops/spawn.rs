//! Spawning a blueprint through a list of guessed command spellings.
//!
//! The plugin's spawn grammar isn't documented, so spawning walks an ordered
//! [`SpawnStrategy`] and keeps the first candidate the server doesn't reject.
//! Swap in [`SpawnStrategy::single`] once the real command is known.

use crate::types::{CommandResult, SpawnOutcome, SpawnRequest, Triple};
use crate::{BridgeError, Result, Session, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateTier {
    Primary,
    AlternatePath,
    ConsoleCommand,
    Placeholder,
}

/// One guessed spelling of the spawn command.
pub trait CandidateCommand: Send + Sync {
    fn label(&self) -> &str;
    fn tier(&self) -> CandidateTier;
    fn render(&self, request: &SpawnRequest) -> String;
}

/// `vset <route> <class> <x> <y> <z>`
pub struct VsetSpawn {
    route: &'static str,
    tier: CandidateTier,
}

impl VsetSpawn {
    pub const fn new(route: &'static str, tier: CandidateTier) -> Self {
        Self { route, tier }
    }
}

impl CandidateCommand for VsetSpawn {
    fn label(&self) -> &str {
        self.route
    }

    fn tier(&self) -> CandidateTier {
        self.tier
    }

    fn render(&self, request: &SpawnRequest) -> String {
        format!(
            "vset {} {} {}",
            self.route,
            request.blueprint_path,
            request.location.spaced()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleSpelling {
    /// `vrun SpawnActor <class> <x> <y> <z>`
    SpawnActor,
    /// `vrun "SpawnActor <class> Location=(<x>,<y>,<z>)"`
    SpawnActorLocation,
    /// `vrun "Spawn <class> <x> <y> <z>"`
    Spawn,
}

/// Spawn through the engine console via `vrun`.
pub struct ConsoleSpawn(pub ConsoleSpelling);

impl CandidateCommand for ConsoleSpawn {
    fn label(&self) -> &str {
        match self.0 {
            ConsoleSpelling::SpawnActor => "vrun SpawnActor",
            ConsoleSpelling::SpawnActorLocation => "vrun SpawnActor Location=",
            ConsoleSpelling::Spawn => "vrun Spawn",
        }
    }

    fn tier(&self) -> CandidateTier {
        CandidateTier::ConsoleCommand
    }

    fn render(&self, request: &SpawnRequest) -> String {
        let class = &request.blueprint_path;
        let location = &request.location;
        match self.0 {
            ConsoleSpelling::SpawnActor => format!("vrun SpawnActor {class} {}", location.spaced()),
            ConsoleSpelling::SpawnActorLocation => {
                format!("vrun \"SpawnActor {class} Location=({})\"", location.comma_separated())
            }
            ConsoleSpelling::Spawn => format!("vrun \"Spawn {class} {}\"", location.spaced()),
        }
    }
}

/// Last resort: `vspawn <class> <x> <y> <z>`
pub struct PlaceholderSpawn;

impl CandidateCommand for PlaceholderSpawn {
    fn label(&self) -> &str {
        "vspawn"
    }

    fn tier(&self) -> CandidateTier {
        CandidateTier::Placeholder
    }

    fn render(&self, request: &SpawnRequest) -> String {
        format!("vspawn {} {}", request.blueprint_path, request.location.spaced())
    }
}

/// Ordered candidates tried by [`spawn`].
#[derive(Default)]
pub struct SpawnStrategy {
    candidates: Vec<Box<dyn CandidateCommand>>,
}

impl SpawnStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compatibility order: primary route, alternate routes, console commands, placeholder.
    pub fn legacy() -> Self {
        Self::new()
            .with(VsetSpawn::new("/objects/spawn", CandidateTier::Primary))
            .with(VsetSpawn::new("/object/spawn", CandidateTier::AlternatePath))
            .with(VsetSpawn::new("/actor/spawn", CandidateTier::AlternatePath))
            .with(VsetSpawn::new("/objects/create", CandidateTier::AlternatePath))
            .with(VsetSpawn::new("/scene/spawn", CandidateTier::AlternatePath))
            .with(ConsoleSpawn(ConsoleSpelling::SpawnActor))
            .with(ConsoleSpawn(ConsoleSpelling::SpawnActorLocation))
            .with(ConsoleSpawn(ConsoleSpelling::Spawn))
            .with(PlaceholderSpawn)
    }

    pub fn single(candidate: impl CandidateCommand + 'static) -> Self {
        Self::new().with(candidate)
    }

    pub fn with(mut self, candidate: impl CandidateCommand + 'static) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CandidateCommand> {
        self.candidates.iter().map(|c| &**c)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

pub fn rotation_command(object_id: &str, rotation: &Triple) -> String {
    format!("vset /object/{object_id}/rotation {}", rotation.spaced())
}

pub fn scale_command(object_id: &str, scale: &Triple) -> String {
    format!("vset /object/{object_id}/scale {}", scale.spaced())
}

/// Command templates for moving a placed object by hand.
pub fn manipulation_hints(object_id: &str) -> Vec<String> {
    vec![
        format!("vset /object/{object_id}/location X Y Z"),
        format!("vset /object/{object_id}/rotation PITCH YAW ROLL"),
        format!("vset /object/{object_id}/scale X Y Z"),
    ]
}

/// Spawns `request` with the first candidate the server accepts, then applies
/// rotation and scale when they differ from identity.
///
/// Error replies to the rotation/scale commands are reported in the outcome and
/// leave the spawned object in place.
pub async fn spawn<T: Transport>(
    session: &mut Session<T>,
    request: &SpawnRequest,
    strategy: &SpawnStrategy,
) -> Result<SpawnOutcome> {
    let mut last_response = String::new();

    for (index, candidate) in strategy.iter().enumerate() {
        let command = candidate.render(request);
        tracing::debug!("Trying spawn candidate {} ({:?}): {}", candidate.label(), candidate.tier(), command);

        match session.request(&command).await?.into_reply(&command) {
            Ok(reply) => {
                let object_id = reply.trim().to_string();
                tracing::info!("Spawned {} as {}", request.blueprint_path, object_id);

                let rotation = apply(session, request.needs_rotation(), || {
                    rotation_command(&object_id, &request.rotation)
                })
                .await?;
                let scale = apply(session, request.needs_scale(), || {
                    scale_command(&object_id, &request.scale)
                })
                .await?;

                return Ok(SpawnOutcome {
                    object_id,
                    candidate: candidate.label().to_string(),
                    command,
                    attempts: index + 1,
                    rotation,
                    scale,
                });
            }
            Err(BridgeError::Protocol { response, .. }) => last_response = response,
            Err(e) => return Err(e),
        }
    }

    Err(BridgeError::CandidatesExhausted {
        tried: strategy.len(),
        last_response,
    })
}

async fn apply<T, F>(session: &mut Session<T>, needed: bool, command: F) -> Result<Option<CommandResult>>
where
    T: Transport,
    F: FnOnce() -> String,
{
    if !needed {
        return Ok(None);
    }
    session.request(&command()).await.map(Some)
}
