use crate::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix the engine appends to a blueprint's generated class name.
pub const CLASS_SUFFIX: &str = "_C";

/// Three floats parsed from `"x,y,z"`. Used for location, rotation (pitch, yaw, roll) and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triple {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// `"x y z"`, the argument layout UnrealCV `vset` commands take.
    pub fn spaced(&self) -> String {
        format!("{} {} {}", coord(self.x), coord(self.y), coord(self.z))
    }

    /// `"x,y,z"`, the layout console commands take.
    pub fn comma_separated(&self) -> String {
        format!("{},{},{}", coord(self.x), coord(self.y), coord(self.z))
    }
}

// Always keep a decimal part so `100` goes out as `100.0`. Very large and very
// small values use Rust's exponent form (`1e16`, `1e-5`), which the engine's
// float parser accepts like `1e+16` and `1e-05`.
fn coord(v: f64) -> String {
    format!("{v:?}")
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comma_separated())
    }
}

impl FromStr for Triple {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 3 {
            return Err(BridgeError::InvalidArgument(format!(
                "expected three comma-separated numbers, got `{s}`"
            )));
        }

        let mut values = [0.0f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.trim().parse::<f64>().map_err(|_| {
                BridgeError::InvalidArgument(format!("`{}` is not a number in `{s}`", part.trim()))
            })?;
        }

        Ok(Self::new(values[0], values[1], values[2]))
    }
}

/// Appends the generated-class suffix to a blueprint asset path.
///
/// `/Game/Meshes/MeshBP` becomes `/Game/Meshes/MeshBP.MeshBP_C`, an object path
/// such as `/Game/Meshes/MeshBP.MeshBP` becomes `/Game/Meshes/MeshBP.MeshBP_C`,
/// and a path that already ends in `_C` is returned unchanged.
pub fn normalize_blueprint_class(path: &str) -> String {
    if path.ends_with(CLASS_SUFFIX) {
        return path.to_string();
    }

    if path.contains('.') {
        format!("{path}{CLASS_SUFFIX}")
    } else {
        let name = path.rsplit('/').next().unwrap_or(path);
        format!("{path}.{name}{CLASS_SUFFIX}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// Class path, always carrying the `_C` suffix.
    pub blueprint_path: String,
    pub location: Triple,
    pub rotation: Triple,
    pub scale: Triple,
}

impl SpawnRequest {
    pub fn new(blueprint_path: &str, location: Triple, rotation: Triple, scale: Triple) -> Self {
        Self {
            blueprint_path: normalize_blueprint_class(blueprint_path),
            location,
            rotation,
            scale,
        }
    }

    pub fn at(blueprint_path: &str, location: Triple) -> Self {
        Self::new(blueprint_path, location, Triple::ZERO, Triple::ONE)
    }

    pub fn needs_rotation(&self) -> bool {
        self.rotation != Triple::ZERO
    }

    pub fn needs_scale(&self) -> bool {
        self.scale != Triple::ONE
    }
}
