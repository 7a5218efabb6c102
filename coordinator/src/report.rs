use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use common::{FinalReport, NodeId};

/// Escribe el reporte de texto en `path`. No crea directorios: si el archivo
/// no se puede crear se devuelve el error.
pub fn write_report(path: &Path, report: &FinalReport, node_ids: &[NodeId]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("error creando archivo de salida {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    render(&mut writer, report, node_ids, Local::now())?;
    writer.flush()?;
    Ok(())
}

/// Un bloque por nodo, en el orden de `node_ids`; los que no están en el
/// reporte se saltan.
pub fn render<W: Write>(
    out: &mut W,
    report: &FinalReport,
    node_ids: &[NodeId],
    generated_at: DateTime<Local>,
) -> io::Result<()> {
    writeln!(out, "=== ESTADÍSTICAS FINALES DEL SISTEMA ===")?;
    writeln!(out, "Fecha: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    for id in node_ids {
        let Some(stats) = report.get(id) else {
            continue;
        };
        writeln!(out, "NODO {}:", id)?;
        writeln!(out, "  Reputación Final: {:.2}", stats.reputation)?;
        writeln!(out, "  Sumas Correctas: {}", stats.correct_count)?;
        writeln!(out, "  Sumas Incorrectas: {}", stats.incorrect_count)?;
        writeln!(out, "  Caídas: {}", stats.crash_count)?;
        writeln!(out, "  Total de operaciones: {}", stats.total_operations())?;
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::NodeStats;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(sub: &str) -> PathBuf {
        let base = std::env::temp_dir().join("report_tests").join(sub);
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();
        base
    }

    fn sample() -> FinalReport {
        let mut report = FinalReport::new();
        report.insert(
            1,
            NodeStats {
                reputation: 1840.5,
                correct_count: 8,
                incorrect_count: 1,
                crash_count: 1,
            },
        );
        report.insert(
            3,
            NodeStats {
                reputation: 420.0,
                correct_count: 5,
                incorrect_count: 3,
                crash_count: 2,
            },
        );
        report
    }

    #[test]
    fn render_lista_nodos_en_orden_y_salta_ausentes() {
        let at = Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        let mut out = Vec::new();

        render(&mut out, &sample(), &[1, 2, 3], at).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "\
=== ESTADÍSTICAS FINALES DEL SISTEMA ===
Fecha: 2024-05-17 09:30:00

NODO 1:
  Reputación Final: 1840.50
  Sumas Correctas: 8
  Sumas Incorrectas: 1
  Caídas: 1
  Total de operaciones: 10

NODO 3:
  Reputación Final: 420.00
  Sumas Correctas: 5
  Sumas Incorrectas: 3
  Caídas: 2
  Total de operaciones: 10

";
        assert_eq!(text, expected);
    }

    #[test]
    fn write_report_crea_el_archivo() {
        let tmp = temp_dir("ok");
        let path = tmp.join("output.txt");

        write_report(&path, &sample(), &[1, 2, 3]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("=== ESTADÍSTICAS FINALES DEL SISTEMA ==="));
        assert!(content.contains("NODO 3:"));
        assert!(!content.contains("NODO 2:"));
    }

    #[test]
    fn write_report_falla_si_no_existe_el_directorio() {
        let tmp = temp_dir("missing");
        let path = tmp.join("no_existe").join("output.txt");

        assert!(write_report(&path, &sample(), &[1]).is_err());
        assert!(!path.exists());
    }
}
