//! Behaviour-driven tests for the prebuilts pipeline.
//!
//! These scenarios cover version selection across repositories, mapping
//! filters, resource extraction and failure isolation of the destination.

use camino::{Utf8Path, Utf8PathBuf};
use gmaven_updater::config::{NameMapping, NameMappingEntry, UpdaterConfig};
use gmaven_updater::error::{Result as UpdaterResult, UpdaterError};
use gmaven_updater::manifest::ManifestGenerator;
use gmaven_updater::pipeline::{Pipeline, PipelineReport};
use gmaven_updater::test_utils::{sample_aar_entries, write_maven_artifact};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};
use std::fs;
use tempfile::TempDir;

const OLD_MANIFEST: &str = "// previous import";

/// Generator standing in for `pom2bp`.
struct FakeGenerator {
    fail: bool,
}

impl ManifestGenerator for FakeGenerator {
    fn generate(&self, _working_dir: &Utf8Path, args: &[String]) -> UpdaterResult<String> {
        if self.fail {
            return Err(UpdaterError::ExternalTool {
                tool: "pom2bp".to_owned(),
                message: "failed to resolve dependencies".to_owned(),
            });
        }
        Ok(format!("// generated with {} arguments\n", args.len()))
    }
}

// ---------------------------------------------------------------------------
// Pipeline world
// ---------------------------------------------------------------------------

struct PipelineWorld {
    root: Utf8PathBuf,
    generator_fails: Cell<bool>,
    extract_resources: Cell<bool>,
    result: RefCell<Option<UpdaterResult<PipelineReport>>>,
    // Keep the temporary tree alive for the scenario.
    _temp_dir: TempDir,
}

impl PipelineWorld {
    fn repo(&self, which: &str) -> Utf8PathBuf {
        self.root.join(format!("{which}-repo"))
    }

    fn destination(&self) -> Utf8PathBuf {
        self.root.join("gmaven")
    }

    fn config() -> UpdaterConfig {
        let mapping: NameMapping = [(
            "com.example:widget".to_owned(),
            NameMappingEntry::for_key("com.example:widget"),
        )]
        .into_iter()
        .collect();
        UpdaterConfig {
            maven_to_make: mapping,
            ..UpdaterConfig::default()
        }
    }
}

#[fixture]
fn pipeline_world() -> PipelineWorld {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("temp dir not UTF-8");
    for which in ["first", "second"] {
        fs::create_dir_all(root.join(format!("{which}-repo"))).expect("failed to create repo");
    }
    PipelineWorld {
        root,
        generator_fails: Cell::new(false),
        extract_resources: Cell::new(false),
        result: RefCell::new(None),
        _temp_dir: temp_dir,
    }
}

#[given("widget version {version} in the {which} repository")]
fn given_widget_version(pipeline_world: &PipelineWorld, version: String, which: String) {
    write_maven_artifact(
        &pipeline_world.repo(&which),
        "com.example",
        "widget",
        &version,
        Some("aar"),
        &sample_aar_entries(),
    );
}

#[given("an unmapped artifact in the first repository")]
fn given_unmapped_artifact(pipeline_world: &PipelineWorld) {
    write_maven_artifact(
        &pipeline_world.repo("first"),
        "com.example",
        "unlisted",
        "3.0.0",
        Some("jar"),
        &[("META-INF/MANIFEST.MF", b"".as_slice())],
    );
}

#[given("an existing destination")]
fn given_existing_destination(pipeline_world: &PipelineWorld) {
    let destination = pipeline_world.destination();
    fs::create_dir_all(&destination).expect("failed to create destination");
    fs::write(destination.join("Android.bp"), OLD_MANIFEST).expect("failed to write manifest");
}

#[given("the manifest generator fails")]
fn given_generator_fails(pipeline_world: &PipelineWorld) {
    pipeline_world.generator_fails.set(true);
}

#[given("resource extraction is enabled")]
fn given_resource_extraction(pipeline_world: &PipelineWorld) {
    pipeline_world.extract_resources.set(true);
}

#[when("the pipeline runs")]
fn when_pipeline_runs(pipeline_world: &PipelineWorld) {
    let config = PipelineWorld::config();
    let generator = FakeGenerator {
        fail: pipeline_world.generator_fails.get(),
    };
    let repos = [pipeline_world.repo("first"), pipeline_world.repo("second")];
    let result = Pipeline::new(&config, &generator).run(
        &repos,
        &pipeline_world.destination(),
        pipeline_world.extract_resources.get(),
    );
    pipeline_world.result.replace(Some(result));
}

#[then("the destination holds widget version {version}")]
fn then_destination_holds_version(pipeline_world: &PipelineWorld, version: String) {
    let result = pipeline_world.result.borrow();
    let report = match result.as_ref().expect("result not set") {
        Ok(report) => report,
        Err(e) => panic!("pipeline failed: {e}"),
    };
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].version, version);

    let version_dir = pipeline_world
        .destination()
        .join("com/example/widget")
        .join(&version);
    assert!(version_dir.join(format!("widget-{version}.aar")).is_file());
}

#[then("the build manifest is written")]
fn then_manifest_written(pipeline_world: &PipelineWorld) {
    let text = fs::read_to_string(pipeline_world.destination().join("Android.bp"))
        .expect("failed to read manifest");
    assert!(text.starts_with("// generated with"));
}

#[then("the run fails because no artifacts were resolved")]
fn then_no_artifacts(pipeline_world: &PipelineWorld) {
    let result = pipeline_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(UpdaterError::NoArtifactsResolved)),
        "expected NoArtifactsResolved, got {result:?}"
    );
    assert!(!pipeline_world.destination().exists());
}

#[then("the run fails with a generator error")]
fn then_generator_error(pipeline_world: &PipelineWorld) {
    let result = pipeline_world.result.borrow();
    let result = result.as_ref().expect("result not set");
    assert!(
        matches!(result, Err(UpdaterError::ExternalTool { .. })),
        "expected ExternalTool error, got {result:?}"
    );
}

#[then("the existing destination is unchanged")]
fn then_destination_unchanged(pipeline_world: &PipelineWorld) {
    let destination = pipeline_world.destination();
    let text = fs::read_to_string(destination.join("Android.bp")).expect("failed to read manifest");
    assert_eq!(text, OLD_MANIFEST);
    assert!(!destination.join("com").exists());
}

#[then("the widget resources are extracted")]
fn then_resources_extracted(pipeline_world: &PipelineWorld) {
    let target = pipeline_world.destination().join("com/example/widget");
    assert!(target.join("res/values/values.xml").is_file());
    assert!(
        pipeline_world
            .destination()
            .join("manifests/com.example_widget/AndroidManifest.xml")
            .is_file()
    );
}

#[then("classes.jar is not extracted")]
fn then_classes_jar_removed(pipeline_world: &PipelineWorld) {
    let target = pipeline_world.destination().join("com/example/widget");
    assert!(!target.join("classes.jar").exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/pipeline.feature", index = 0)]
fn scenario_newest_version_wins(pipeline_world: PipelineWorld) {
    let _ = pipeline_world;
}

#[scenario(path = "tests/features/pipeline.feature", index = 1)]
fn scenario_unmapped_artifacts_ignored(pipeline_world: PipelineWorld) {
    let _ = pipeline_world;
}

#[scenario(path = "tests/features/pipeline.feature", index = 2)]
fn scenario_generator_failure_isolated(pipeline_world: PipelineWorld) {
    let _ = pipeline_world;
}

#[scenario(path = "tests/features/pipeline.feature", index = 3)]
fn scenario_resources_extracted(pipeline_world: PipelineWorld) {
    let _ = pipeline_world;
}
