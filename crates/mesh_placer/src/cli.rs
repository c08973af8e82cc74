use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use unrealcv_bridge_core::editor::{DEFAULT_BLUEPRINT_NAME, DEFAULT_DESTINATION};
use unrealcv_bridge_core::types::{SpawnRequest, Triple};
use unrealcv_bridge_core::BridgeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Print the editor script that imports a mesh and builds its blueprint
    Import,
    /// Spawn an existing blueprint in a running game
    Place,
    /// Import, then optionally place the new blueprint
    Full,
    /// Report which spawn command spellings the running game accepts
    Probe,
}

/// Import a mesh into Unreal Engine and place it at runtime through UnrealCV
#[derive(Debug, Parser)]
#[command(name = "mesh-placer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Action to perform
    #[arg(long, value_enum)]
    pub action: Action,

    /// Mesh file to import (required for import and full)
    #[arg(long, value_name = "FILE")]
    pub obj_path: Option<PathBuf>,

    /// Content browser folder for the imported assets
    #[arg(long, default_value = DEFAULT_DESTINATION)]
    pub asset_path: String,

    /// Name of the generated blueprint
    #[arg(long, default_value = DEFAULT_BLUEPRINT_NAME)]
    pub blueprint_name: String,

    /// Blueprint to spawn (required for place)
    #[arg(long)]
    pub blueprint_path: Option<String>,

    /// Spawn location as X,Y,Z
    #[arg(long, default_value = "0,0,100", value_parser = parse_triple, allow_hyphen_values = true)]
    pub location: Triple,

    /// Rotation as Pitch,Yaw,Roll
    #[arg(long, default_value = "0,0,0", value_parser = parse_triple, allow_hyphen_values = true)]
    pub rotation: Triple,

    /// Scale as X,Y,Z
    #[arg(long, default_value = "1,1,1", value_parser = parse_triple, allow_hyphen_values = true)]
    pub scale: Triple,

    /// UnrealCV host (default: $UNREALCV_HOST or localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// UnrealCV port (default: $UNREALCV_PORT or 9000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds to keep retrying the connection (default: $UNREALCV_CONNECT_TIMEOUT_SECS or 30)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u32>,

    /// Write the editor script to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub script_out: Option<PathBuf>,

    /// Print spawn and probe results as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_triple(s: &str) -> Result<Triple, String> {
    s.parse::<Triple>().map_err(|e| e.to_string())
}

#[derive(Debug, Clone)]
pub struct ImportJob {
    pub obj_path: PathBuf,
    pub asset_path: String,
    pub blueprint_name: String,
    pub script_out: Option<PathBuf>,
}

impl ImportJob {
    /// Blueprint the import will produce, before the editor has run.
    pub fn expected_blueprint_path(&self) -> String {
        format!("{}/{}", self.asset_path.trim_end_matches('/'), self.blueprint_name)
    }
}

#[derive(Debug, Clone)]
pub struct PlaceJob {
    pub request: SpawnRequest,
    pub bridge: BridgeConfig,
    pub json: bool,
}

/// Everything an action needs, validated.
#[derive(Debug, Clone)]
pub enum Job {
    Import(ImportJob),
    Place(PlaceJob),
    Full { import: ImportJob, place: PlaceJob },
    Probe(PlaceJob),
}

impl Cli {
    /// Checks the flags the selected action needs. Failures are usage errors.
    pub fn into_job(self) -> Result<Job, clap::Error> {
        let bridge = self.bridge_config();

        match self.action {
            Action::Import => Ok(Job::Import(self.import_job()?)),
            Action::Place => {
                let Some(blueprint_path) = self.blueprint_path.as_deref() else {
                    return Err(missing("--blueprint-path is required for the place action"));
                };
                Ok(Job::Place(self.place_job(blueprint_path, bridge)))
            }
            Action::Full => {
                let import = self.import_job()?;
                let place = self.place_job(&import.expected_blueprint_path(), bridge);
                Ok(Job::Full { import, place })
            }
            Action::Probe => {
                let blueprint_path = self.blueprint_path.clone().unwrap_or_else(|| {
                    format!("{}/{}", self.asset_path.trim_end_matches('/'), self.blueprint_name)
                });
                Ok(Job::Probe(self.place_job(&blueprint_path, bridge)))
            }
        }
    }

    fn bridge_config(&self) -> BridgeConfig {
        let mut config = BridgeConfig::from_env();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.connect_attempts = timeout;
        }
        config
    }

    fn import_job(&self) -> Result<ImportJob, clap::Error> {
        let Some(obj_path) = self.obj_path.clone() else {
            return Err(missing("--obj-path is required for the import and full actions"));
        };
        Ok(ImportJob {
            obj_path,
            asset_path: self.asset_path.clone(),
            blueprint_name: self.blueprint_name.clone(),
            script_out: self.script_out.clone(),
        })
    }

    fn place_job(&self, blueprint_path: &str, bridge: BridgeConfig) -> PlaceJob {
        PlaceJob {
            request: SpawnRequest::new(blueprint_path, self.location, self.rotation, self.scale),
            bridge,
            json: self.json,
        }
    }
}

fn missing(message: &str) -> clap::Error {
    Cli::command().error(ErrorKind::MissingRequiredArgument, message)
}
