use crate::ops::spawn::SpawnStrategy;
use crate::types::{CandidateProbe, CommandResult, ProbeReport, SpawnRequest};
use crate::{Session, Transport};

/// Queries plugin info and tries every spawn candidate, without stopping at the
/// first success, to find out which spellings a server understands.
///
/// Every step runs even when an earlier one failed; transport failures are
/// recorded in the report as error results.
pub async fn probe<T: Transport>(
    session: &mut Session<T>,
    request: &SpawnRequest,
    strategy: &SpawnStrategy,
) -> ProbeReport {
    let version = step(session, "vget /unrealcv/version").await;
    let status = step(session, "vget /unrealcv/status").await;
    let help = step(session, "vget /unrealcv/help").await;

    let mut candidates = Vec::with_capacity(strategy.len());
    for candidate in strategy.iter() {
        let command = candidate.render(request);
        let result = step(session, &command).await;
        candidates.push(CandidateProbe {
            label: candidate.label().to_string(),
            command,
            result,
        });
    }

    let objects = step(session, "vget /objects").await;
    let camera_location = step(session, "vget /camera/0/location").await;

    ProbeReport {
        version,
        status,
        help,
        candidates,
        objects,
        camera_location,
    }
}

async fn step<T: Transport>(session: &mut Session<T>, command: &str) -> CommandResult {
    match session.request(command).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Probe step `{}` failed: {}", command, e);
            CommandResult::transport_failure(&e)
        }
    }
}
