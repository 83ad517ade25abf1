use apiforge::{
    ArtifactKind, ArtifactOutcome, ClientConfig, Generators, Orchestrator, RunOutcome,
};
use std::path::PathBuf;

mod common;
use common::project::base_config;
use common::scripted::ScriptedGenerator;

fn orchestrator_with(
    root: &std::path::Path,
    config: apiforge::Config,
    spec: &ScriptedGenerator,
    routes: &ScriptedGenerator,
    client: Option<&ScriptedGenerator>,
) -> Orchestrator {
    let generators = Generators {
        spec: Box::new(spec.writer()),
        routes: Box::new(routes.writer()),
        client: client.map(|g| Box::new(g.writer()) as Box<dyn apiforge::ClientGenerator>),
    };
    Orchestrator::new(root, config, generators).unwrap()
}

#[test]
fn test_first_generate_publishes_spec_and_routes() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"{\"openapi\":\"3.1.0\"}");
    let routes_gen = ScriptedGenerator::new(b"// generated routes");
    let mut orchestrator =
        orchestrator_with(dir.path(), base_config(), &spec_gen, &routes_gen, None);

    let run = orchestrator.generate().unwrap();

    assert_eq!(run.outcome, RunOutcome::Success);
    assert_eq!(
        run.outcome_for(ArtifactKind::Spec),
        Some(ArtifactOutcome::Written)
    );
    assert_eq!(
        run.outcome_for(ArtifactKind::Routes),
        Some(ArtifactOutcome::Written)
    );
    assert_eq!(
        std::fs::read(dir.path().join("api/openapi.json")).unwrap(),
        b"{\"openapi\":\"3.1.0\"}"
    );
    assert_eq!(
        std::fs::read(dir.path().join("src/generated/routes.rs")).unwrap(),
        b"// generated routes"
    );
}

#[test]
fn test_second_generate_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"{\"openapi\":\"3.1.0\"}");
    let routes_gen = ScriptedGenerator::new(b"// routes");
    let client_gen = ScriptedGenerator::new(b"// client");
    let mut config = base_config();
    config.client = Some(ClientConfig::Path(PathBuf::from("generated/client.rs")));
    let mut orchestrator = orchestrator_with(
        dir.path(),
        config,
        &spec_gen,
        &routes_gen,
        Some(&client_gen),
    );

    orchestrator.generate().unwrap();
    let routes_mtime = std::fs::metadata(dir.path().join("src/generated/routes.rs"))
        .unwrap()
        .modified()
        .unwrap();

    // Byte-identical staged spec: the run short-circuits before routes or
    // client generation is even invoked.
    let second = orchestrator.generate().unwrap();
    assert_eq!(second.outcome, RunOutcome::Unchanged);
    assert_eq!(
        second.outcome_for(ArtifactKind::Spec),
        Some(ArtifactOutcome::Unchanged)
    );
    assert_eq!(second.outcome_for(ArtifactKind::Routes), None);
    assert_eq!(second.outcome_for(ArtifactKind::Client), None);
    assert_eq!(routes_gen.calls(), 1);
    assert_eq!(client_gen.calls(), 1);
    assert_eq!(
        std::fs::metadata(dir.path().join("src/generated/routes.rs"))
            .unwrap()
            .modified()
            .unwrap(),
        routes_mtime,
        "short-circuited run performed a filesystem write"
    );
}

#[test]
fn test_spec_change_regenerates_downstream() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"v1");
    let routes_gen = ScriptedGenerator::new(b"routes v1");
    let mut orchestrator =
        orchestrator_with(dir.path(), base_config(), &spec_gen, &routes_gen, None);

    orchestrator.generate().unwrap();

    spec_gen.set_content(b"v2");
    routes_gen.set_content(b"routes v2");
    let run = orchestrator.generate().unwrap();

    assert_eq!(run.outcome, RunOutcome::Success);
    assert_eq!(
        run.outcome_for(ArtifactKind::Spec),
        Some(ArtifactOutcome::Written)
    );
    assert_eq!(routes_gen.calls(), 2);
    assert_eq!(
        std::fs::read(dir.path().join("src/generated/routes.rs")).unwrap(),
        b"routes v2"
    );
}

#[test]
fn test_partial_failure_keeps_independent_stage() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"spec");
    let routes_gen = ScriptedGenerator::new(b"routes");
    let client_gen = ScriptedGenerator::new(b"client");
    client_gen.set_failing(true);

    let mut config = base_config();
    config.client = Some(ClientConfig::Path(PathBuf::from("generated/client.rs")));
    let mut orchestrator = orchestrator_with(
        dir.path(),
        config,
        &spec_gen,
        &routes_gen,
        Some(&client_gen),
    );

    let run = orchestrator.generate().unwrap();

    assert_eq!(run.outcome, RunOutcome::PartialFailure);
    assert_eq!(
        run.outcome_for(ArtifactKind::Routes),
        Some(ArtifactOutcome::Written)
    );
    assert_eq!(
        run.outcome_for(ArtifactKind::Client),
        Some(ArtifactOutcome::Failed)
    );
    // The failing client stage did not cancel routes publishing
    assert!(dir.path().join("src/generated/routes.rs").exists());
    assert!(!dir.path().join("generated/client.rs").exists());
}

#[test]
fn test_spec_failure_skips_downstream_and_clears_short_circuit() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"spec");
    let routes_gen = ScriptedGenerator::new(b"routes");
    let mut orchestrator =
        orchestrator_with(dir.path(), base_config(), &spec_gen, &routes_gen, None);

    orchestrator.generate().unwrap();
    assert_eq!(routes_gen.calls(), 1);

    spec_gen.set_failing(true);
    let failed = orchestrator.generate().unwrap();
    assert_eq!(failed.outcome, RunOutcome::Failed);
    assert_eq!(
        failed.outcome_for(ArtifactKind::Spec),
        Some(ArtifactOutcome::Failed)
    );
    assert_eq!(failed.outcome_for(ArtifactKind::Routes), None);
    assert_eq!(routes_gen.calls(), 1, "routes ran during a failed spec stage");

    // Recovery with byte-identical spec output: the failure cleared the
    // remembered fingerprint, so downstream must regenerate rather than
    // short-circuit against possibly stale artifacts.
    spec_gen.set_failing(false);
    let recovered = orchestrator.generate().unwrap();
    assert_eq!(recovered.outcome, RunOutcome::Success);
    assert_eq!(routes_gen.calls(), 2);
}

#[test]
fn test_missing_required_config_is_synchronous_error() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"spec");
    let routes_gen = ScriptedGenerator::new(b"routes");

    let mut config = base_config();
    config.routes = None;
    let mut orchestrator = orchestrator_with(dir.path(), config, &spec_gen, &routes_gen, None);

    let err = orchestrator.generate().unwrap_err().to_string();
    assert!(err.contains("configuration error"), "got: {err}");
    assert_eq!(spec_gen.calls(), 0, "no generation may run on bad config");
}

#[test]
fn test_extra_spec_copies_are_published() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"{\"openapi\":\"3.1.0\"}");
    let routes_gen = ScriptedGenerator::new(b"routes");

    let mut config = base_config();
    config.copy_spec_to = vec![PathBuf::from("dist/intermediate/openapi.json")];
    let mut orchestrator = orchestrator_with(dir.path(), config, &spec_gen, &routes_gen, None);

    orchestrator.generate().unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("dist/intermediate/openapi.json")).unwrap(),
        b"{\"openapi\":\"3.1.0\"}"
    );
}

#[test]
fn test_generators_write_only_into_staging() {
    let dir = tempfile::tempdir().unwrap();
    let spec_gen = ScriptedGenerator::new(b"spec");
    let routes_gen = ScriptedGenerator::new(b"routes");
    let mut orchestrator =
        orchestrator_with(dir.path(), base_config(), &spec_gen, &routes_gen, None);

    orchestrator.generate().unwrap();

    // Staged copies mirror the public layout under the hidden staging dir
    let root = dir.path().canonicalize().unwrap();
    assert!(root.join(".apiforge/api/openapi.json").exists());
    assert!(root.join(".apiforge/src/generated/routes.rs").exists());
}
