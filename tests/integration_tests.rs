//! Integration tests for the Motordesk CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a motordesk command
fn motordesk() -> Command {
    let mut cmd = Command::cargo_bin("motordesk").unwrap();
    cmd.env("MOTORDESK_AUTHOR", "tester");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    motordesk()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Extract the first word with the given prefix from command output
fn extract_id(output: &std::process::Output, prefix: &str) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .find(|w| w.starts_with(prefix))
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn create_test_cliente(tmp: &TempDir, nombre: &str) -> String {
    let output = motordesk()
        .current_dir(tmp.path())
        .args([
            "cliente",
            "new",
            "--nombre",
            nombre,
            "--email",
            "cliente@example.com",
        ])
        .output()
        .unwrap();
    extract_id(&output, "CLI-")
}

fn create_test_devolucion(tmp: &TempDir, cliente: &str) -> String {
    let output = motordesk()
        .current_dir(tmp.path())
        .args([
            "dev",
            "new",
            "--cliente",
            cliente,
            "--tipo",
            "SERVICIO",
            "--motivo",
            "Servicio incompleto",
        ])
        .output()
        .unwrap();
    extract_id(&output, "DEV-")
}

// ============================================================================
// CLI basics
// ============================================================================

#[test]
fn test_help_displays() {
    motordesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("back office"));
}

#[test]
fn test_version_displays() {
    motordesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("motordesk"));
}

#[test]
fn test_unknown_command_fails() {
    motordesk()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    motordesk()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".motordesk").is_dir());
    assert!(tmp.path().join("inventario/carros").is_dir());
    assert!(tmp.path().join("personas/clientes").is_dir());
    assert!(tmp.path().join("reparaciones").is_dir());
    assert!(tmp.path().join("devoluciones").is_dir());
    assert!(tmp.path().join("asesorias").is_dir());
}

#[test]
fn test_init_refuses_existing_project() {
    let tmp = setup_test_project();

    motordesk()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_fail_outside_project() {
    let tmp = TempDir::new().unwrap();

    motordesk()
        .current_dir(tmp.path())
        .args(["carro", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Catalog records
// ============================================================================

#[test]
fn test_carro_new_and_list() {
    let tmp = setup_test_project();

    motordesk()
        .current_dir(tmp.path())
        .args([
            "carro",
            "new",
            "--marca",
            "Toyota",
            "--modelo",
            "Corolla",
            "--anio",
            "2022",
            "--precio",
            "310000",
            "--condicion",
            "nuevo",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CAR-"));

    motordesk()
        .current_dir(tmp.path())
        .args(["carro", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Toyota Corolla"));

    motordesk()
        .current_dir(tmp.path())
        .args(["carro", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_carro_show_round_trips_yaml() {
    let tmp = setup_test_project();

    let output = motordesk()
        .current_dir(tmp.path())
        .args([
            "carro", "new", "--marca", "Mazda", "--modelo", "3", "--anio", "2021", "--precio",
            "280000",
        ])
        .output()
        .unwrap();
    let id = extract_id(&output, "CAR-");
    assert!(!id.is_empty());

    motordesk()
        .current_dir(tmp.path())
        .args(["carro", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("marca: Mazda"))
        .stdout(predicate::str::contains("anio: 2021"));
}

#[test]
fn test_list_resolves_short_id_aliases() {
    let tmp = setup_test_project();
    let id = create_test_cliente(&tmp, "Laura Pinto");
    assert!(!id.is_empty());

    // listing rebuilds the alias index, @1 points at the only record
    motordesk()
        .current_dir(tmp.path())
        .args(["cliente", "list"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args(["cliente", "show", "@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Laura Pinto"));
}

// ============================================================================
// Workflow lifecycle
// ============================================================================

#[test]
fn test_devolucion_full_lifecycle() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Marco Díaz");
    let dev = create_test_devolucion(&tmp, &cliente);
    assert!(!dev.is_empty());

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "APROBADA", "-m", "factura en regla"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APROBADA"));

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "EN_PROCESO"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "COMPLETADA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("closed"));

    // terminal record refuses further transitions
    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "PENDIENTE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("terminal"));
}

#[test]
fn test_invalid_transition_lists_legal_states() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Rosa Mena");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "COMPLETADA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("APROBADA"))
        .stderr(predicate::str::contains("RECHAZADA"));

    // the record is untouched
    motordesk()
        .current_dir(tmp.path())
        .args(["dev", "show", &dev])
        .assert()
        .success()
        .stdout(predicate::str::contains("estado: PENDIENTE"));
}

#[test]
fn test_transition_unknown_status_fails() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Nina Soto");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "FINALIZADA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid return status"));
}

#[test]
fn test_transition_dry_run_writes_nothing() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Iris Vega");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "APROBADA", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes written"));

    motordesk()
        .current_dir(tmp.path())
        .args(["dev", "show", &dev])
        .assert()
        .success()
        .stdout(predicate::str::contains("estado: PENDIENTE"));
}

#[test]
fn test_transition_refuses_catalog_records() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Hugo Páez");

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &cliente, "APROBADA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no status workflow"));
}

#[test]
fn test_history_shows_audit_trail() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Elsa Ortiz");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "APROBADA", "-m", "con garantía"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args(["history", &dev])
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDIENTE"))
        .stdout(predicate::str::contains("APROBADA"))
        .stdout(predicate::str::contains("tester"))
        .stdout(predicate::str::contains("con garantía"));
}

#[test]
fn test_history_records_actor_override() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Saúl Rey");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "RECHAZADA", "--actor", "gerente"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args(["history", &dev])
        .assert()
        .success()
        .stdout(predicate::str::contains("gerente"));
}

// ============================================================================
// Asesoria timeline
// ============================================================================

#[test]
fn test_asesoria_lifecycle_stamps_timeline() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Vera Luna");

    let output = motordesk()
        .current_dir(tmp.path())
        .args([
            "ase",
            "new",
            "--cliente",
            &cliente,
            "--tipo",
            "financiamiento",
            "--descripcion",
            "Crédito a 48 meses",
        ])
        .output()
        .unwrap();
    let ase = extract_id(&output, "ASE-");
    assert!(!ase.is_empty());

    for estado in ["PROGRAMADA", "EN_PROCESO", "COMPLETADA"] {
        motordesk()
            .current_dir(tmp.path())
            .args(["transition", &ase, estado])
            .assert()
            .success();
    }

    motordesk()
        .current_dir(tmp.path())
        .args(["ase", "show", &ase])
        .assert()
        .success()
        .stdout(predicate::str::contains("estado: COMPLETADA"))
        .stdout(predicate::str::contains("fecha_inicio:"))
        .stdout(predicate::str::contains("fecha_fin:"))
        .stdout(predicate::str::contains("duracion_real_min:"));
}

// ============================================================================
// Read-model
// ============================================================================

#[test]
fn test_api_items_returns_parseable_json() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Omar Gil");
    let dev = create_test_devolucion(&tmp, &cliente);

    let output = motordesk()
        .current_dir(tmp.path())
        .args(["api", "items"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], dev);
    assert_eq!(rows[0]["tipo"], "devolucion");
    assert_eq!(rows[0]["estado"], "PENDIENTE");
}

#[test]
fn test_api_item_detail_carries_history_and_next_states() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Tina Ríos");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "APROBADA"])
        .assert()
        .success();

    let output = motordesk()
        .current_dir(tmp.path())
        .args(["api", "item", &dev])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["estado"], "APROBADA");
    assert_eq!(doc["estados_siguientes"], serde_json::json!(["EN_PROCESO"]));
    assert_eq!(doc["terminal"], false);
    assert_eq!(doc["historial_estados"][0]["estado_nuevo"], "APROBADA");
}

#[test]
fn test_api_items_filter_by_kind() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Abel Cano");
    create_test_devolucion(&tmp, &cliente);

    let output = motordesk()
        .current_dir(tmp.path())
        .args(["api", "items", "--tipo", "rep"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(rows.as_array().unwrap().is_empty());
}

// ============================================================================
// Referential integrity
// ============================================================================

#[test]
fn test_delete_refused_while_referenced() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Gema Paz");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["delete", &cliente, "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still referenced"));

    // deleting the referrer first unblocks the customer
    motordesk()
        .current_dir(tmp.path())
        .args(["delete", &dev, "--force"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args(["delete", &cliente, "--force"])
        .assert()
        .success();
}

#[test]
fn test_new_refuses_dangling_reference() {
    let tmp = setup_test_project();

    motordesk()
        .current_dir(tmp.path())
        .args([
            "dev",
            "new",
            "--cliente",
            "CLI-01JZZZZZZZZZZZZZZZZZZZZZZZZZ",
            "--tipo",
            "PRODUCTO",
            "--motivo",
            "pieza equivocada",
        ])
        .assert()
        .failure();
}

// ============================================================================
// Team roster
// ============================================================================

#[test]
fn test_roster_enforces_workflow_roles() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Lía Mora");
    let dev = create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .args(["team", "init"])
        .assert()
        .success();

    motordesk()
        .current_dir(tmp.path())
        .args([
            "team", "add", "--nombre", "Ana Sosa", "--email", "ana@example.com", "--usuario",
            "ana", "-r", "ventas",
        ])
        .assert()
        .success();

    // ana holds ventas, so returns are fine
    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "APROBADA", "--actor", "ana"])
        .assert()
        .success();

    // unknown actors are rejected once a roster exists
    motordesk()
        .current_dir(tmp.path())
        .args(["transition", &dev, "EN_PROCESO", "--actor", "nadie"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not authorized"));
}

// ============================================================================
// Status and cache
// ============================================================================

#[test]
fn test_status_dashboard_counts_workflows() {
    let tmp = setup_test_project();
    let cliente = create_test_cliente(&tmp, "Noe Bravo");
    create_test_devolucion(&tmp, &cliente);

    motordesk()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDIENTE"));
}

#[test]
fn test_cache_sync_and_stats() {
    let tmp = setup_test_project();
    create_test_cliente(&tmp, "Leo Nieto");

    motordesk()
        .current_dir(tmp.path())
        .args(["cache", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache synced"));

    motordesk()
        .current_dir(tmp.path())
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entities:"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_generate() {
    motordesk()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("motordesk"));
}
