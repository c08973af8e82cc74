//! Editor-side import of a mesh file and the blueprint that wraps it.
//!
//! The editor's asset API only exists inside the editor process, so this module
//! validates the inputs, derives the asset paths the editor will produce, and
//! renders the Python script to run in the editor's console.

use crate::{BridgeError, Result};
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["obj", "fbx"];
pub const DEFAULT_DESTINATION: &str = "/Game/Meshes";
pub const DEFAULT_BLUEPRINT_NAME: &str = "MeshBP";
pub const DEFAULT_PARENT_CLASS: &str = "Actor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    source: PathBuf,
    asset_name: String,
    destination: String,
    blueprint_name: String,
    parent_class: String,
}

impl ImportPlan {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: &str,
        blueprint_name: &str,
    ) -> Result<Self> {
        let source = source.into();

        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(BridgeError::Import(format!(
                "{} is not a supported mesh file (expected one of: {})",
                source.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let asset_name = source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BridgeError::Import(format!("{} has no file name", source.display())))?
            .to_string();

        let destination = destination.trim_end_matches('/');
        if !destination.starts_with('/') || destination.len() < 2 {
            return Err(BridgeError::Import(format!(
                "destination `{destination}` must be a content path such as {DEFAULT_DESTINATION}"
            )));
        }

        if blueprint_name.is_empty() || blueprint_name.contains(['/', '.']) {
            return Err(BridgeError::Import(format!(
                "`{blueprint_name}` is not a valid blueprint name"
            )));
        }

        if !source.exists() {
            tracing::warn!(
                "{} does not exist here; the editor must be able to read it",
                source.display()
            );
        }

        Ok(Self {
            source,
            asset_name,
            destination: destination.to_string(),
            blueprint_name: blueprint_name.to_string(),
            parent_class: DEFAULT_PARENT_CLASS.to_string(),
        })
    }

    pub fn with_parent_class(mut self, parent_class: impl Into<String>) -> Self {
        self.parent_class = parent_class.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn mesh_asset_path(&self) -> String {
        format!("{}/{}", self.destination, self.asset_name)
    }

    pub fn blueprint_path(&self) -> String {
        format!("{}/{}", self.destination, self.blueprint_name)
    }

    /// Python for the editor console: import the mesh, build a blueprint with a
    /// static mesh component pointing at it, compile and save.
    pub fn render_editor_script(&self) -> String {
        let source = py_str(&self.source.to_string_lossy());
        let destination = py_str(&self.destination);
        let asset_name = py_str(&self.asset_name);
        let blueprint_name = py_str(&self.blueprint_name);
        let mesh_path = py_str(&self.mesh_asset_path());
        let blueprint_path = py_str(&self.blueprint_path());
        let parent_class = &self.parent_class;

        format!(
            r#"import unreal

assets = unreal.EditorAssetLibrary
if not assets.does_directory_exist({destination}):
    assets.make_directory({destination})

options = unreal.FbxImportUI()
options.set_editor_property("import_mesh", True)
options.set_editor_property("import_textures", True)
options.set_editor_property("import_materials", True)
options.static_mesh_import_data.set_editor_property("combine_meshes", True)

task = unreal.AssetImportTask()
task.set_editor_property("automated", True)
task.set_editor_property("destination_path", {destination})
task.set_editor_property("destination_name", {asset_name})
task.set_editor_property("filename", {source})
task.set_editor_property("replace_existing", True)
task.set_editor_property("save", True)
task.options = options

tools = unreal.AssetToolsHelpers.get_asset_tools()
tools.import_asset_tasks([task])

mesh = assets.load_asset({mesh_path})
if mesh is None:
    raise RuntimeError("import produced no asset at " + {mesh_path})
print("Mesh imported as: " + {mesh_path})

factory = unreal.BlueprintFactory()
factory.set_editor_property("parent_class", unreal.{parent_class})
blueprint = tools.create_asset({blueprint_name}, {destination}, unreal.Blueprint, factory)
if blueprint is None:
    raise RuntimeError("could not create blueprint " + {blueprint_path})

subobjects = unreal.get_engine_subsystem(unreal.SubobjectDataSubsystem)
root = subobjects.k2_gather_subobject_data_for_blueprint(blueprint)[0]
params = unreal.AddNewSubobjectParams(parent_handle=root, new_class=unreal.StaticMeshComponent, blueprint_context=blueprint)
handle, reason = subobjects.add_new_subobject(params)
data = unreal.SubobjectDataBlueprintFunctionLibrary.get_data(handle)
component = unreal.SubobjectDataBlueprintFunctionLibrary.get_object(data)
component.set_editor_property("static_mesh", mesh)

unreal.BlueprintEditorLibrary.compile_blueprint(blueprint)
assets.save_loaded_asset(blueprint)
print("Blueprint created at: " + {blueprint_path})
"#
        )
    }
}

/// Double-quoted Python string literal.
fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_asset_paths() {
        let plan = ImportPlan::new("/tmp/gen/chair.obj", "/Game/Meshes/", "ChairBP").unwrap();
        assert_eq!(plan.mesh_asset_path(), "/Game/Meshes/chair");
        assert_eq!(plan.blueprint_path(), "/Game/Meshes/ChairBP");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(ImportPlan::new("model.FBX", DEFAULT_DESTINATION, DEFAULT_BLUEPRINT_NAME).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_source() {
        for source in ["mesh.png", "mesh", ".obj"] {
            let err = ImportPlan::new(source, DEFAULT_DESTINATION, DEFAULT_BLUEPRINT_NAME).unwrap_err();
            assert!(matches!(err, BridgeError::Import(_)), "{source} should be rejected");
        }
    }

    #[test]
    fn test_rejects_bad_destination_and_name() {
        assert!(ImportPlan::new("a.obj", "Game/Meshes", "BP").is_err());
        assert!(ImportPlan::new("a.obj", "/", "BP").is_err());
        assert!(ImportPlan::new("a.obj", DEFAULT_DESTINATION, "").is_err());
        assert!(ImportPlan::new("a.obj", DEFAULT_DESTINATION, "Sub/BP").is_err());
    }

    #[test]
    fn test_script_mentions_inputs() {
        let plan = ImportPlan::new(r#"/data/gen "v2"/mesh.obj"#, "/Game/LLMGenerated", "HunYuanMeshBP")
            .unwrap()
            .with_parent_class("Pawn");
        let script = plan.render_editor_script();

        assert!(script.starts_with("import unreal\n"));
        assert!(script.contains(r#"task.set_editor_property("filename", "/data/gen \"v2\"/mesh.obj")"#));
        assert!(script.contains(r#"assets.load_asset("/Game/LLMGenerated/mesh")"#));
        assert!(script.contains("unreal.Pawn"));
        assert!(script.contains(r#"print("Blueprint created at: " + "/Game/LLMGenerated/HunYuanMeshBP")"#));
    }

    #[test]
    fn test_py_str_escapes() {
        assert_eq!(py_str(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
