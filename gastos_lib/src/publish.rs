//! Writes a [`Report`] to the static data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::GastosError;
use crate::report::Report;

pub const SUMMARY_FILE: &str = "deputados.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const DETAILS_DIR: &str = "detalhes";

/// Paths produced by [`write_outputs`].
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub summary: PathBuf,
    pub metadata: PathBuf,
    pub details: Vec<PathBuf>,
}

/// Writes `deputados.json`, `detalhes/<id>.json` and `metadata.json` under
/// `out_dir`, creating directories as needed. Existing files are replaced
/// whole; stale detail files from earlier runs are left alone.
pub fn write_outputs(out_dir: &Path, report: &Report) -> Result<WrittenFiles, GastosError> {
    let details_dir = out_dir.join(DETAILS_DIR);
    fs::create_dir_all(&details_dir)?;

    let mut written = WrittenFiles {
        details: Vec::with_capacity(report.details.len()),
        ..Default::default()
    };

    for detail in &report.details {
        let path = details_dir.join(format!("{}.json", detail.id));
        write_json(&path, detail)?;
        written.details.push(path);
    }

    written.summary = out_dir.join(SUMMARY_FILE);
    write_json(&written.summary, &report.summaries)?;

    written.metadata = out_dir.join(METADATA_FILE);
    write_json(&written.metadata, &report.metadata)?;

    tracing::info!(
        "Wrote {} deputies and {} detail files to {}",
        report.summaries.len(),
        written.details.len(),
        out_dir.display()
    );
    Ok(written)
}

/// Compact UTF-8 JSON, written to a sibling `.tmp` file and renamed into
/// place so readers never see a partial file.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GastosError> {
    let bytes = serde_json::to_vec(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{LedgerEntry, RunWarnings};
    use crate::report::{DeputyDetailPayload, DeputySummary, RunMetadata};
    use std::collections::BTreeMap;

    fn report() -> Report {
        Report {
            summaries: vec![DeputySummary {
                id: 7,
                nome: "João Ninguém".to_string(),
                nome_civil: String::new(),
                sigla_partido: "PSOL".to_string(),
                partido: "PSOL".to_string(),
                uf: "RJ".to_string(),
                foto: String::new(),
                gasto_ano: 12.5,
                gasto_mes: 0.0,
            }],
            details: vec![DeputyDetailPayload {
                id: 7,
                ano: 2024,
                mes_atual: "03".to_string(),
                gasto_ano: 12.5,
                gasto_mes: 0.0,
                por_mes: BTreeMap::from([("01".to_string(), 12.5)]),
                por_categoria: BTreeMap::from([("Passagem Aérea".to_string(), 12.5)]),
                por_fornecedor: BTreeMap::new(),
                lancamentos: vec![LedgerEntry {
                    data: "2024-01-02".to_string(),
                    categoria: "Passagem Aérea".to_string(),
                    fornecedor: String::new(),
                    valor: 12.5,
                    documento_url: String::new(),
                }],
            }],
            metadata: RunMetadata {
                updated_at: "2024-03-20 06:05 UTC".to_string(),
                ano: 2024,
                id_legislatura: 57,
                sources: vec![],
                avisos: RunWarnings::default(),
            },
        }
    }

    #[test]
    fn writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("docs").join("data");
        let written = write_outputs(&out, &report()).unwrap();

        assert!(written.summary.exists());
        assert!(written.metadata.exists());
        assert_eq!(written.details, vec![out.join("detalhes").join("7.json")]);

        let summary = fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
        assert!(summary.starts_with(r#"[{"id":7,"nome":"João Ninguém""#));
        assert!(!summary.contains('\n'));

        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SUMMARY_FILE), "stale content that is longer").unwrap();
        write_outputs(dir.path(), &report()).unwrap();
        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(summary[0]["gasto_ano"], 12.5);
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        assert!(matches!(write_outputs(&blocker, &report()), Err(GastosError::Io(_))));
    }
}
