use crate::adapters::docx::DocxPackage;
use crate::core::identifier::parse_identifier_csv;
use crate::core::output::{derive_group_name, output_directory, output_file_name, resolve_output_path};
use crate::core::roster::read_students;
use crate::core::substitution::{plan_edits, replacements_for};
use crate::core::{
    ConfigProvider, GenerationSummary, Identifier, Interaction, Pipeline, RunInputs, Storage,
    StudentRecord,
};
use crate::domain::ports::DOCX_FILTER;
use crate::utils::error::{DeclError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const INVALID_IDENTIFIER_MESSAGE: &str = "CPF inválido! Digite 11 dígitos numéricos.";

pub struct DeclarationPipeline<S: Storage, I: Interaction, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) interaction: I,
    pub(crate) config: C,
}

impl<S: Storage, I: Interaction, C: ConfigProvider> DeclarationPipeline<S, I, C> {
    pub fn new(storage: S, interaction: I, config: C) -> Self {
        Self {
            storage,
            interaction,
            config,
        }
    }

    fn choose_file(&self, configured: Option<&Path>, title: &str, cancelled: &str) -> Option<PathBuf> {
        if let Some(path) = configured {
            return Some(path.to_path_buf());
        }
        let selected = self.interaction.select_file(title, &DOCX_FILTER);
        if selected.is_none() {
            self.interaction.message(cancelled);
        }
        selected
    }

    async fn preset_identifiers(&self) -> Result<HashMap<String, String>> {
        let Some(path) = self.config.identifiers_path() else {
            return Ok(HashMap::new());
        };
        let data = self.storage.read_file(path).await?;
        let identifiers = parse_identifier_csv(&data)?;
        tracing::info!("Loaded {} identifiers from {}", identifiers.len(), path.display());
        Ok(identifiers)
    }

    /// Prompts until a valid identifier is typed. There is no retry limit.
    fn prompt_identifier(&self, record: &StudentRecord) -> Result<Identifier> {
        let prompt = format!("{} ({}): ", record.name, record.id);
        loop {
            let line = self.interaction.prompt_line(&prompt)?;
            if let Some(identifier) = Identifier::parse(line.trim()) {
                return Ok(identifier);
            }
            self.interaction.message(INVALID_IDENTIFIER_MESSAGE);
        }
    }

    /// Generates one declaration from a freshly loaded copy of the template.
    async fn generate_one(&self, inputs: &RunInputs, record: &StudentRecord) -> Result<PathBuf> {
        if record.identifier.is_none() {
            return Err(DeclError::MissingIdentifier {
                id: record.id.clone(),
            });
        }

        // The enrollment id goes into the file name as typed in the roster.
        let file_name = output_file_name(record);
        if file_name.contains(['/', '\\']) {
            return Err(DeclError::UnsafeFileName { name: file_name });
        }

        let template = DocxPackage::from_bytes(&self.storage.read_file(&inputs.template_path).await?)?;
        let edits = plan_edits(&template.document()?, &replacements_for(record));
        if edits.is_empty() {
            tracing::warn!("No placeholder replaced for student {}", record.id);
        }
        let declaration = template.with_run_edits(&edits)?.to_bytes()?;

        let path = resolve_output_path(&self.storage, &inputs.output_dir, &file_name).await;
        if path.parent() != Some(inputs.output_dir.as_path()) {
            return Err(DeclError::UnsafeFileName { name: file_name });
        }
        self.storage.write_file(&path, &declaration).await?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

fn roster_error(error: DeclError) -> DeclError {
    DeclError::RosterError {
        message: error.to_string(),
    }
}

#[async_trait::async_trait]
impl<S: Storage, I: Interaction, C: ConfigProvider> Pipeline for DeclarationPipeline<S, I, C> {
    async fn select_inputs(&self) -> Result<Option<RunInputs>> {
        let Some(template_path) = self.choose_file(
            self.config.template_path(),
            "Selecione o MODELO da declaração",
            "Operação cancelada - modelo não selecionado.",
        ) else {
            return Ok(None);
        };

        let Some(roster_path) = self.choose_file(
            self.config.roster_path(),
            "Selecione a RELAÇÃO de alunos",
            "Operação cancelada - relação não selecionada.",
        ) else {
            return Ok(None);
        };

        let group_name = derive_group_name(&roster_path, self.config.fallback_group_name());
        let base = match self.config.output_root() {
            Some(root) => root.to_path_buf(),
            None => template_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let output_dir = output_directory(&base, &group_name);
        self.storage.create_dir_all(&output_dir).await?;

        Ok(Some(RunInputs {
            template_path,
            roster_path,
            group_name,
            output_dir,
        }))
    }

    async fn extract(&self, inputs: &RunInputs) -> Result<Vec<StudentRecord>> {
        tracing::debug!("Reading roster {}", inputs.roster_path.display());
        let data = self
            .storage
            .read_file(&inputs.roster_path)
            .await
            .map_err(roster_error)?;
        let document = DocxPackage::from_bytes(&data)
            .and_then(|package| package.document())
            .map_err(roster_error)?;

        let students = read_students(&document);
        if students.is_empty() {
            return Err(DeclError::EmptyRoster);
        }

        self.interaction.message(&format!("\nTurma: {}", inputs.group_name));
        self.interaction
            .message(&format!("Total de alunos encontrados: {}", students.len()));
        Ok(students)
    }

    async fn transform(&self, records: Vec<StudentRecord>) -> Result<Vec<StudentRecord>> {
        let preset = self.preset_identifiers().await?;
        let mut announced = false;
        let mut identified = Vec::with_capacity(records.len());

        for record in records {
            if let Some(raw) = preset.get(&record.id) {
                match Identifier::parse(raw) {
                    Some(identifier) => {
                        identified.push(record.with_identifier(identifier));
                        continue;
                    }
                    None => tracing::warn!("Invalid preset CPF for {}: {:?}", record.id, raw),
                }
            }

            if !announced {
                self.interaction
                    .message("\nDigite os CPFs dos alunos (apenas números):");
                announced = true;
            }
            let identifier = self.prompt_identifier(&record)?;
            identified.push(record.with_identifier(identifier));
        }

        Ok(identified)
    }

    async fn load(&self, inputs: &RunInputs, records: Vec<StudentRecord>) -> Result<GenerationSummary> {
        let mut summary = GenerationSummary {
            total: records.len(),
            output_dir: inputs.output_dir.clone(),
            ..Default::default()
        };

        self.interaction.message("\nGerando declarações...");
        for record in &records {
            match self.generate_one(inputs, record).await {
                Ok(path) => {
                    summary.succeeded += 1;
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.interaction.message(&format!("✓ {}", file_name));
                    summary.written.push(path);
                }
                Err(e) => {
                    tracing::error!("Generation failed for {} ({}): {}", record.name, record.id, e);
                    self.interaction.message(&format!(
                        "✗ Erro ao gerar declaração para {}: {}",
                        record.name, e
                    ));
                    summary.failures.push((record.name.clone(), e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    async fn report(&self, summary: &GenerationSummary) -> Result<()> {
        let folder = std::path::absolute(&summary.output_dir).unwrap_or_else(|_| summary.output_dir.clone());

        self.interaction.message(&format!(
            "\n✅ Concluído! {}/{} declarações geradas.",
            summary.succeeded, summary.total
        ));
        self.interaction
            .message(&format!("Pasta de saída: {}", folder.display()));

        if self.config.open_output_folder() {
            if let Err(e) = self.interaction.open_folder(&folder) {
                tracing::warn!("Could not open {}: {}", folder.display(), e);
            }
        }
        Ok(())
    }
}
