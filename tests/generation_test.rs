mod common;

use clap::Parser;
use common::*;
use declgen::core::substitution::{IDENTIFIER_TOKEN, ID_TOKEN, NAME_TOKEN};
use declgen::{
    CliConfig, DeclError, DeclarationEngine, DeclarationPipeline, LocalStorage, RunOutcome,
};
use std::ffi::OsString;
use std::path::Path;
use tempfile::TempDir;

fn template_body() -> String {
    [
        paragraph(&[bold_run("DECLARAÇÃO")]),
        paragraph(&[
            run("Declaramos que "),
            bold_run(NAME_TOKEN),
            run(", CPF "),
            run(IDENTIFIER_TOKEN),
            run(", matrícula "),
            run(ID_TOKEN),
            run(", é aluno regular."),
        ]),
    ]
    .concat()
}

fn config(template: &Path, roster: &Path) -> CliConfig {
    let args: Vec<OsString> = vec![
        "declgen".into(),
        "--template".into(),
        template.into(),
        "--roster".into(),
        roster.into(),
        "--no-open".into(),
    ];
    CliConfig::parse_from(args)
}

async fn run_engine(
    config: CliConfig,
    interaction: ScriptedInteraction,
) -> declgen::Result<RunOutcome> {
    let pipeline = DeclarationPipeline::new(LocalStorage::new(), interaction, config);
    DeclarationEngine::new(pipeline).run().await
}

#[tokio::test]
async fn test_end_to_end_generates_declaration() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Relação de Alunos - Turma A.docx");
    write_docx(&template, &template_body());
    write_docx(
        &roster,
        &table(&[&["Matrícula", "Nome"], &["2024001", "Ana  Silva"], &["", "Sem Matrícula"]]),
    );

    let interaction = ScriptedInteraction::with_answers(&["123.456.789-01"]);
    let outcome = run_engine(config(&template, &roster), interaction.clone())
        .await
        .unwrap();

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total, 1);

    let output_dir = temp_dir.path().join("de  -  A");
    assert_eq!(summary.output_dir, output_dir);
    assert_eq!(file_names(&output_dir), vec!["2024001 - Ana Silva.docx"]);

    let generated = output_dir.join("2024001 - Ana Silva.docx");
    assert_eq!(summary.written, vec![generated.clone()]);
    assert_eq!(
        paragraph_texts(&generated),
        vec![
            "DECLARAÇÃO".to_string(),
            "Declaramos que Ana Silva, CPF 123.456.789-01, matrícula 2024001, é aluno regular."
                .to_string(),
        ]
    );

    // Run formatting and the surrounding runs are untouched.
    let xml = read_package(&generated).document_xml().unwrap();
    assert!(xml.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Ana Silva</w:t></w:r>"#));
    assert!(xml.contains(r#"<w:r><w:t xml:space="preserve">, CPF </w:t></w:r>"#));
    assert!(xml.contains("<w:sectPr/>"));

    // The template on disk is never modified.
    assert!(paragraph_texts(&template)[1].contains(NAME_TOKEN));

    assert_eq!(interaction.prompts(), vec!["Ana Silva (2024001): "]);
    let messages = interaction.messages();
    assert!(messages.contains(&"✓ 2024001 - Ana Silva.docx".to_string()));
    assert!(messages.contains(&"\n✅ Concluído! 1/1 declarações geradas.".to_string()));
    assert!(interaction.script.lock().unwrap().opened.is_empty());
}

#[tokio::test]
async fn test_colliding_file_names_get_numbered_suffixes() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Lista 3B.docx");
    write_docx(&template, &template_body());
    write_docx(
        &roster,
        &table(&[
            &["ID", "Nome"],
            &["001", "Ana"],
            &["001", "Ana"],
            &["001", "Ana"],
        ]),
    );

    let interaction =
        ScriptedInteraction::with_answers(&["11111111111", "22222222222", "33333333333"]);
    let outcome = run_engine(config(&template, &roster), interaction).await.unwrap();

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(summary.succeeded, 3);

    let output_dir = temp_dir.path().join("3B");
    assert_eq!(
        file_names(&output_dir),
        vec!["001 - Ana.docx", "001 - Ana_1.docx", "001 - Ana_2.docx"]
    );
    assert_eq!(summary.written.last(), Some(&output_dir.join("001 - Ana_2.docx")));
    assert!(paragraph_texts(&output_dir.join("001 - Ana_2.docx"))[1].contains("333.333.333-33"));
}

#[tokio::test]
async fn test_existing_declarations_are_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Turma 7C.docx");
    write_docx(&template, &template_body());
    write_docx(&roster, &table(&[&["ID", "Nome"], &["010", "Bruno Costa"]]));

    let output_dir = temp_dir.path().join("7C");
    std::fs::create_dir_all(&output_dir).unwrap();
    std::fs::write(output_dir.join("010 - Bruno Costa.docx"), b"previous run").unwrap();

    let interaction = ScriptedInteraction::with_answers(&["98765432100"]);
    run_engine(config(&template, &roster), interaction).await.unwrap();

    assert_eq!(
        std::fs::read(output_dir.join("010 - Bruno Costa.docx")).unwrap(),
        b"previous run"
    );
    assert!(output_dir.join("010 - Bruno Costa_1.docx").exists());
}

#[tokio::test]
async fn test_empty_roster_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Turma Vazia.docx");
    write_docx(&template, &template_body());
    write_docx(
        &roster,
        &[paragraph(&[run("Sem tabela de alunos")]), table(&[&["ID", "Nome"]])].concat(),
    );

    let interaction = ScriptedInteraction::default();
    let result = run_engine(config(&template, &roster), interaction.clone()).await;

    assert!(matches!(result, Err(DeclError::EmptyRoster)));
    assert!(interaction.prompts().is_empty());
    assert!(file_names(&temp_dir.path().join("Vazia")).is_empty());
}

#[tokio::test]
async fn test_cancelled_selection_generates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let interaction = ScriptedInteraction::default();
    interaction.script.lock().unwrap().files.push_back(None);

    let config = CliConfig::parse_from(["declgen", "--no-open"]);
    let outcome = run_engine(config, interaction.clone()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Cancelled));
    assert_eq!(
        interaction.messages(),
        vec!["Operação cancelada - modelo não selecionado."]
    );
    assert!(file_names(temp_dir.path()).is_empty());
}

#[tokio::test]
async fn test_dialog_selection_and_folder_opening() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Relação Mestrado.docx");
    write_docx(&template, &template_body());
    write_docx(&roster, &table(&[&["ID", "Nome"], &["1", "Caio"]]));

    let interaction = ScriptedInteraction::with_answers(&["12345678901"]);
    interaction
        .script
        .lock()
        .unwrap()
        .files
        .extend([Some(template.clone()), Some(roster.clone())]);

    let config = CliConfig::parse_from(["declgen"]);
    run_engine(config, interaction.clone()).await.unwrap();

    let output_dir = temp_dir.path().join("Mestrado");
    assert_eq!(file_names(&output_dir), vec!["1 - Caio.docx"]);
    let opened = interaction.script.lock().unwrap().opened.clone();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].ends_with("Mestrado"));
}

#[tokio::test]
async fn test_placeholder_split_across_runs_is_left_unreplaced() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Turma B.docx");
    write_docx(
        &template,
        &paragraph(&[run("Matrícula: "), run("xxx"), bold_run("xx")]),
    );
    write_docx(&roster, &table(&[&["ID", "Nome"], &["77", "Dora"]]));

    let interaction = ScriptedInteraction::with_answers(&["12345678901"]);
    run_engine(config(&template, &roster), interaction).await.unwrap();

    let texts = paragraph_texts(&temp_dir.path().join("B").join("77 - Dora.docx"));
    assert_eq!(texts, vec!["Matrícula: xxxxx"]);
}

#[tokio::test]
async fn test_unreadable_template_is_counted_as_failure() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Turma C.docx");
    std::fs::write(&template, b"not a zip archive").unwrap();
    write_docx(&roster, &table(&[&["ID", "Nome"], &["1", "Eva"], &["2", "Fabio"]]));

    let interaction = ScriptedInteraction::with_answers(&["12345678901", "10987654321"]);
    let outcome = run_engine(config(&template, &roster), interaction.clone())
        .await
        .unwrap();

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.failures.len(), 2);
    assert!(interaction
        .messages()
        .iter()
        .any(|m| m.starts_with("✗ Erro ao gerar declaração para Fabio")));
}

#[tokio::test]
async fn test_ids_with_path_separators_stay_inside_group_folder() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("modelo.docx");
    let roster = temp_dir.path().join("Turma D.docx");
    write_docx(&template, &template_body());
    write_docx(
        &roster,
        &table(&[
            &["ID", "Nome"],
            &["../../escaped/001", "Ana"],
            &["2023/1", "Bruno"],
            &["2023\\2", "Carla"],
            &["003", "Davi"],
        ]),
    );

    let interaction = ScriptedInteraction::with_answers(&[
        "11111111111",
        "22222222222",
        "33333333333",
        "44444444444",
    ]);
    let outcome = run_engine(config(&template, &roster), interaction.clone())
        .await
        .unwrap();

    let RunOutcome::Completed(summary) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.failures.len(), 3);

    let output_dir = temp_dir.path().join("D");
    assert_eq!(file_names(&output_dir), vec!["003 - Davi.docx"]);
    assert_eq!(summary.written, vec![output_dir.join("003 - Davi.docx")]);
    assert_eq!(
        file_names(temp_dir.path()),
        vec!["D", "Turma D.docx", "modelo.docx"]
    );
    assert!(!temp_dir.path().parent().unwrap().join("escaped").exists());
    assert!(interaction
        .messages()
        .iter()
        .any(|m| m.starts_with("✗ Erro ao gerar declaração para Bruno")));
}
