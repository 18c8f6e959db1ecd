#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn oficina(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("oficina").unwrap();
    cmd.current_dir(dir.path()).env("OFICINA_ROOT", dir.path());
    cmd
}

fn read(dir: &TempDir, file: &str) -> String {
    std::fs::read_to_string(dir.path().join(file)).unwrap()
}

fn seed(dir: &TempDir) {
    oficina(dir)
        .args(["client", "add", "--name", "Ana", "--phone", "111", "--address", "Rua A"])
        .assert()
        .success();
    oficina(dir)
        .args([
            "service",
            "add",
            "--description",
            "Troca de tela",
            "--price",
            "200.00",
        ])
        .assert()
        .success();
}

fn generate(dir: &TempDir) -> assert_cmd::assert::Assert {
    oficina(dir)
        .args([
            "order",
            "generate",
            "--client",
            "Ana",
            "--service",
            "Troca de tela",
            "--equipment",
            "iPhone 11",
            "--date",
            "01/01/2024",
        ])
        .assert()
}

// ---------------------------------------------------------------------------
// oficina init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_tables() {
    let dir = TempDir::new().unwrap();
    oficina(&dir).arg("init").assert().success();

    assert!(dir.path().join("oficina.yaml").exists());
    assert_eq!(read(&dir, "clientes.csv"), "nome,telefone,endereco\n");
    assert_eq!(read(&dir, "servicos.csv"), "descricao,valor\n");
    assert_eq!(read(&dir, "ordens.csv"), "cliente,servico,aparelho,data\n");
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    oficina(&dir).arg("init").assert().success();
    seed(&dir);
    oficina(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  clientes.csv"));
    assert!(read(&dir, "clientes.csv").contains("Ana,111,Rua A"));
}

// ---------------------------------------------------------------------------
// clients
// ---------------------------------------------------------------------------

#[test]
fn client_list_without_file_creates_header() {
    let dir = TempDir::new().unwrap();
    oficina(&dir)
        .args(["client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No clients registered."));
    assert_eq!(read(&dir, "clientes.csv"), "nome,telefone,endereco\n");
}

#[test]
fn client_add_and_list() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    oficina(&dir)
        .args(["client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana"))
        .stdout(predicate::str::contains("Rua A"));
    assert_eq!(read(&dir, "clientes.csv"), "nome,telefone,endereco\nAna,111,Rua A\n");
}

#[test]
fn client_add_with_empty_field_fails() {
    let dir = TempDir::new().unwrap();
    oficina(&dir)
        .args(["client", "add", "--name", "Ana", "--phone", "", "--address", "Rua A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
    assert!(!dir.path().join("clientes.csv").exists());
}

#[test]
fn client_edit_and_remove() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    oficina(&dir)
        .args(["client", "add", "--name", "Bruno", "--phone", "222", "--address", "Rua B"])
        .assert()
        .success();

    oficina(&dir)
        .args(["client", "edit", "0", "--phone", "999"])
        .assert()
        .success();
    assert_eq!(
        read(&dir, "clientes.csv"),
        "nome,telefone,endereco\nAna,999,Rua A\nBruno,222,Rua B\n"
    );

    oficina(&dir)
        .args(["client", "remove", "0"])
        .assert()
        .success();
    assert_eq!(read(&dir, "clientes.csv"), "nome,telefone,endereco\nBruno,222,Rua B\n");
}

#[test]
fn client_remove_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    oficina(&dir)
        .args(["client", "remove", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn client_list_json() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let out = oficina(&dir)
        .args(["--json", "client", "list"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value[0]["nome"], "Ana");
    assert_eq!(value[0]["telefone"], "111");
}

// ---------------------------------------------------------------------------
// services
// ---------------------------------------------------------------------------

#[test]
fn service_validation() {
    let dir = TempDir::new().unwrap();
    for price in ["0", "-5"] {
        oficina(&dir)
            .args(["service", "add", "--description", "Tela", "--price", price])
            .assert()
            .failure();
    }
    oficina(&dir)
        .args(["service", "add", "--description", "", "--price", "150"])
        .assert()
        .failure();
    assert!(!dir.path().join("servicos.csv").exists());

    oficina(&dir)
        .args(["service", "add", "--description", "Tela", "--price", "150.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 150.00"));
    assert_eq!(read(&dir, "servicos.csv"), "descricao,valor\nTela,150.0\n");
}

// ---------------------------------------------------------------------------
// orders
// ---------------------------------------------------------------------------

#[test]
fn order_generate_writes_pdf_and_row() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    generate(&dir)
        .success()
        .stdout(predicate::str::contains("ordem_Ana_01-01-2024.pdf"));

    let pdf = std::fs::read(dir.path().join("ordem_Ana_01-01-2024.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    assert_eq!(
        read(&dir, "ordens.csv"),
        "cliente,servico,aparelho,data\nAna,Troca de tela,iPhone 11,01/01/2024\n"
    );
}

#[test]
fn order_generate_without_clients_is_blocked() {
    let dir = TempDir::new().unwrap();
    oficina(&dir)
        .args(["service", "add", "--description", "Troca de tela", "--price", "200"])
        .assert()
        .success();

    generate(&dir)
        .failure()
        .code(1)
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("error:").not());

    assert!(!dir.path().join("ordens.csv").exists());
    assert!(!dir.path().join("ordem_Ana_01-01-2024.pdf").exists());
}

#[test]
fn order_generate_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    oficina(&dir)
        .args([
            "order", "generate", "--client", "Ana", "--service", "Troca de tela", "--date",
            "2024-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DD/MM/YYYY"));
}

#[test]
fn order_show_reports_orphaned_client() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    generate(&dir).success();

    oficina(&dir)
        .args(["client", "edit", "0", "--name", "Ana Maria"])
        .assert()
        .success();

    oficina(&dir)
        .args(["order", "show", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no longer registered)"));
}

#[test]
fn order_edit_list_and_remove() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    generate(&dir).success();

    oficina(&dir)
        .args(["order", "edit", "0", "--equipment", "iPhone 12"])
        .assert()
        .success();
    oficina(&dir)
        .args(["order", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iPhone 12"));

    oficina(&dir)
        .args(["order", "edit", "0", "--client", "Ninguém"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("client not found"));

    oficina(&dir)
        .args(["order", "remove", "0"])
        .assert()
        .success();
    assert_eq!(read(&dir, "ordens.csv"), "cliente,servico,aparelho,data\n");
}

#[test]
fn order_regenerate_restores_document() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    generate(&dir).success();
    let pdf = dir.path().join("ordem_Ana_01-01-2024.pdf");
    std::fs::remove_file(&pdf).unwrap();

    oficina(&dir)
        .args(["order", "regenerate", "0"])
        .assert()
        .success();
    assert!(pdf.exists());
    assert_eq!(read(&dir, "ordens.csv").lines().count(), 2);
}

// ---------------------------------------------------------------------------
// logging
// ---------------------------------------------------------------------------

#[test]
fn rust_log_level_overrides_default() {
    let dir = TempDir::new().unwrap();
    oficina(&dir)
        .env("RUST_LOG", "debug")
        .args(["client", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("initialized empty table"));

    let quiet = TempDir::new().unwrap();
    oficina(&quiet)
        .env_remove("RUST_LOG")
        .args(["client", "list"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_redirects_tables_and_documents() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("oficina.yaml"),
        "storage:\n  data_dir: dados\ndocuments:\n  output_dir: pdf\n",
    )
    .unwrap();
    seed(&dir);
    generate(&dir).success();

    assert!(dir.path().join("dados/clientes.csv").exists());
    assert!(dir.path().join("pdf/ordem_Ana_01-01-2024.pdf").exists());
}

#[test]
fn config_validate_reports_shared_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("oficina.yaml"),
        "storage:\n  orders_file: clientes.csv\n",
    )
    .unwrap();
    oficina(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}
