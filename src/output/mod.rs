// mod.rs - Output formatters module

pub mod package;

pub use package::{package, NamedScalar, NamedSeries, NamedTable, PackagedResult, FORMAT_VERSION};

use crate::error::{BioenvError, Result};
use log::info;
use std::fmt;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Serializations of a packaged result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Msgpack,
    Tsv,
    Phylip,
    Nexus,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "msgpack" | "messagepack" | "mpk" => Ok(OutputFormat::Msgpack),
            "tsv" => Ok(OutputFormat::Tsv),
            "phylip" => Ok(OutputFormat::Phylip),
            "nexus" => Ok(OutputFormat::Nexus),
            _ => Err(format!(
                "Unsupported output format: {}. Use: json, msgpack, tsv, phylip, nexus",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Msgpack => "msgpack",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Phylip => "phylip",
            OutputFormat::Nexus => "nexus",
        };
        write!(f, "{}", name)
    }
}

impl OutputFormat {
    /// Matrix formats carry only a single distance table
    pub fn needs_matrix(&self) -> bool {
        matches!(self, OutputFormat::Phylip | OutputFormat::Nexus)
    }
}

fn generated_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn cell(value: Option<f64>, missing: &str) -> String {
    match value {
        Some(v) => v.to_string(),
        None => missing.to_string(),
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_json<W: Write>(writer: &mut W, packaged: &PackagedResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, packaged)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_msgpack<W: Write>(writer: &mut W, packaged: &PackagedResult) -> Result<()> {
    writer.write_all(&packaged.to_msgpack()?)?;
    Ok(())
}

/// Sectioned TSV: scalars, then each series, then each table
pub fn write_tsv<W: Write>(writer: &mut W, packaged: &PackagedResult, command_line: &str) -> Result<()> {
    writeln!(writer, "# Command: {}", command_line)?;
    writeln!(writer, "# Generated: {}", generated_stamp())?;
    writeln!(writer, "# bioenv v{}", packaged.engine_version)?;
    if let Some(fp) = &packaged.provenance.fingerprint {
        writeln!(writer, "# Dataset: {} ({} records)", fp, packaged.provenance.records)?;
    }

    if !packaged.scalars.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "[scalars]")?;
        writeln!(writer, "name\tvalue")?;
        for scalar in &packaged.scalars {
            writeln!(writer, "{}\t{}", scalar.name, scalar.value)?;
        }
    }

    for series in &packaged.series {
        writeln!(writer)?;
        writeln!(writer, "[series {}]", series.name)?;
        writeln!(writer, "label\tvalue")?;
        for (label, value) in series.labels.iter().zip(&series.values) {
            writeln!(writer, "{}\t{}", label, value)?;
        }
    }

    for table in &packaged.tables {
        writeln!(writer)?;
        writeln!(writer, "[table {}]", table.name)?;
        write!(writer, "label")?;
        for column in &table.columns {
            write!(writer, "\t{}", column)?;
        }
        writeln!(writer)?;
        for row in &table.rows {
            write!(writer, "{}", row.label)?;
            for value in &row.cells {
                write!(writer, "\t{}", cell(*value, "NA"))?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn matrix_table(packaged: &PackagedResult, format: OutputFormat) -> Result<&NamedTable> {
    packaged.distance_table().ok_or_else(|| {
        BioenvError::Config(format!(
            "output format '{}' needs a distance matrix; request identity, alignment, kmer-distance or row-distance",
            format
        ))
    })
}

/// Lower-triangle PHYLIP distance matrix
pub fn write_phylip<W: Write>(writer: &mut W, packaged: &PackagedResult, command_line: &str) -> Result<()> {
    let table = matrix_table(packaged, OutputFormat::Phylip)?;

    writeln!(writer, "    {}", table.rows.len())?;
    for (i, row) in table.rows.iter().enumerate() {
        write!(writer, "{:<10}", row.label)?;
        for value in row.cells.iter().take(i + 1) {
            write!(writer, "  {}", cell(*value, "NA"))?;
        }
        writeln!(writer)?;
    }

    // Trailing comments; most PHYLIP readers stop after the matrix
    writeln!(writer)?;
    writeln!(writer, "# Matrix: {}", table.name)?;
    writeln!(writer, "# Command: {}", command_line)?;
    writeln!(writer, "# Generated: {}", generated_stamp())?;
    writeln!(writer, "# bioenv v{}", packaged.engine_version)?;
    Ok(())
}

/// NEXUS DISTANCES block, lower triangle without diagonal
pub fn write_nexus<W: Write>(writer: &mut W, packaged: &PackagedResult, command_line: &str) -> Result<()> {
    let table = matrix_table(packaged, OutputFormat::Nexus)?;

    writeln!(writer, "#NEXUS")?;
    writeln!(writer, "[Matrix: {}]", table.name)?;
    writeln!(writer, "[Command: {}]", command_line)?;
    writeln!(writer, "[Generated: {}]", generated_stamp())?;
    writeln!(writer, "[bioenv v{}]", packaged.engine_version)?;
    writeln!(writer, "BEGIN DISTANCES;")?;
    writeln!(writer, "    DIMENSIONS NTAX={};", table.rows.len())?;
    writeln!(writer, "    FORMAT LABELS LOWER DIAGONAL;")?;
    writeln!(writer, "    MATRIX")?;
    for (i, row) in table.rows.iter().enumerate() {
        write!(writer, "        {}", row.label)?;
        for value in row.cells.iter().take(i) {
            write!(writer, " {}", cell(*value, "?"))?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "    ;")?;
    writeln!(writer, "END;")?;
    Ok(())
}

/// Serialize to any writer in the given format
pub fn write_to<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    packaged: &PackagedResult,
    command_line: &str,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, packaged),
        OutputFormat::Msgpack => write_msgpack(writer, packaged),
        OutputFormat::Tsv => write_tsv(writer, packaged, command_line),
        OutputFormat::Phylip => write_phylip(writer, packaged, command_line),
        OutputFormat::Nexus => write_nexus(writer, packaged, command_line),
    }
}

/// Write a packaged result to a file, creating parent directories
pub fn write_result(
    file_path: &Path,
    format: OutputFormat,
    packaged: &PackagedResult,
    command_line: &str,
) -> Result<()> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, format, packaged, command_line)?;
    writer.flush()?;
    info!("Wrote {} output to {}", format, file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AnalysisConfig;
    use crate::core::result::{AnalysisResult, LabeledRow, Provenance, ResultValue, RunConfig};

    fn packaged() -> PackagedResult {
        let result = AnalysisResult::new(
            Provenance {
                fingerprint: None,
                dataset_kind: None,
                records: 3,
                config: RunConfig::Analysis(AnalysisConfig::default()),
            },
            vec![
                ("length.mean".to_string(), ResultValue::Scalar(4.5)),
                (
                    "identity_distance".to_string(),
                    ResultValue::Matrix {
                        labels: vec!["a".into(), "b".into(), "c".into()],
                        values: vec![
                            vec![Some(0.0), Some(0.25), None],
                            vec![Some(0.25), Some(0.0), Some(0.5)],
                            vec![None, Some(0.5), Some(0.0)],
                        ],
                    },
                ),
                (
                    "column_summary".to_string(),
                    ResultValue::Table {
                        columns: vec!["count".into()],
                        rows: vec![LabeledRow::new("ph", vec![None])],
                    },
                ),
            ],
        );
        package(&result).unwrap()
    }

    fn render(format: OutputFormat, packaged: &PackagedResult) -> Result<String> {
        let mut buf = Vec::new();
        write_to(&mut buf, format, packaged, "bioenv --test")?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_tsv_sections() {
        let text = render(OutputFormat::Tsv, &packaged()).unwrap();
        assert!(text.contains("# Command: bioenv --test"));
        assert!(text.contains("[scalars]\nname\tvalue\nlength.mean\t4.5"));
        assert!(text.contains("[table identity_distance]\nlabel\ta\tb\tc\na\t0\t0.25\tNA"));
        assert!(text.contains("[table column_summary]"));
    }

    #[test]
    fn test_phylip_lower_triangle() {
        let text = render(OutputFormat::Phylip, &packaged()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim(), "3");
        assert!(lines[3].starts_with("c"));
        assert!(lines[3].ends_with("NA  0.5  0"));
    }

    #[test]
    fn test_nexus_block() {
        let text = render(OutputFormat::Nexus, &packaged()).unwrap();
        assert!(text.starts_with("#NEXUS"));
        assert!(text.contains("DIMENSIONS NTAX=3;"));
        assert!(text.contains("        c ? 0.5\n"));
        assert!(text.trim_end().ends_with("END;"));
    }

    #[test]
    fn test_matrix_format_without_matrix() {
        let mut p = packaged();
        p.tables.retain(|t| t.name != "identity_distance");
        assert!(matches!(
            render(OutputFormat::Phylip, &p),
            Err(BioenvError::Config(_))
        ));
    }

    #[test]
    fn test_json_output_parses_back() {
        let p = packaged();
        let text = render(OutputFormat::Json, &p).unwrap();
        assert_eq!(PackagedResult::from_json(&text).unwrap(), p);
    }

    #[test]
    fn test_format_names() {
        assert_eq!("NEXUS".parse::<OutputFormat>().unwrap(), OutputFormat::Nexus);
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::Phylip.needs_matrix());
    }
}
