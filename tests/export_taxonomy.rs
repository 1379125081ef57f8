//! Integration tests for taxonomy export.

use cmirr::prelude::*;
use sprs::TriMat;
use std::fs;
use std::io::{BufWriter, Write};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cmirr=debug")
        .with_test_writer()
        .try_init();
}

const RANKS: [&str; 7] = [
    "k__Bacteria",
    "p__Firmicutes",
    "c__Clostridia",
    "o__Clostridiales",
    "f__Lachnospiraceae",
    "g__Blautia",
    "s__",
];

/// Create a table whose observation IDs are deliberately unsorted.
///
/// Observation `i` carries the first `i % 7 + 1` ranks of `RANKS`.
fn create_annotated_table(n_observations: usize) -> Table {
    let n_samples = 6;
    let mut tri_mat = TriMat::new((n_observations, n_samples));
    for obs in 0..n_observations {
        for sample in 0..n_samples {
            if (obs + sample) % 3 != 0 {
                tri_mat.add_triplet(obs, sample, (obs * 10 + sample) as u64);
            }
        }
    }

    // Reverse order so that table order differs from sorted order
    let observation_ids: Vec<String> = (0..n_observations)
        .rev()
        .map(|i| format!("otu_{:03}", i))
        .collect();
    let sample_ids: Vec<String> = (0..n_samples).map(|i| format!("sample_{}", i)).collect();

    let records: Vec<MetadataRecord> = (0..n_observations)
        .map(|i| {
            MetadataRecord::from([
                (
                    "taxonomy".to_string(),
                    MetadataValue::ranks(RANKS[..i % RANKS.len() + 1].iter().copied()),
                ),
                ("confidence".to_string(), MetadataValue::Number(0.9)),
            ])
        })
        .collect();

    Table::new(tri_mat.to_csr(), observation_ids, sample_ids)
        .unwrap()
        .with_metadata(Axis::Observation, records)
        .unwrap()
}

#[test]
fn test_example_table_export() {
    init_tracing();
    let table = example_table().unwrap();

    let lines: Vec<String> = taxonomy_exporter(&table)
        .collect::<Result<Vec<_>>>()
        .unwrap();

    assert_eq!(
        lines,
        vec!["O1\tBacteria; Firmicutes\n", "O2\tBacteria; Bacteroidetes\n"]
    );
}

#[test]
fn test_missing_taxonomy_surfaces_on_consumption() {
    init_tracing();
    // Same counts and IDs, no observation metadata
    let example = example_table().unwrap();
    let table = Table::new(
        example.data().clone(),
        example.ids(Axis::Observation).to_vec(),
        example.ids(Axis::Sample).to_vec(),
    )
    .unwrap();

    // Building the exporter must not fail
    let exporter = taxonomy_exporter(&table);

    let result: Result<Vec<String>> = exporter.collect();
    match result {
        Err(e @ CmirrError::MissingTaxonomy) => {
            assert_eq!(e.to_string(), "The given table doesn't have taxonomy");
        }
        other => panic!("expected missing taxonomy, got {:?}", other),
    }
}

#[test]
fn test_no_lines_before_missing_taxonomy() {
    let table = example_table()
        .unwrap()
        .without_metadata(Axis::Observation);
    let items: Vec<_> = taxonomy_exporter(&table).collect();
    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}

#[test]
fn test_order_follows_table() {
    init_tracing();
    let table = create_annotated_table(25);

    let emitted: Vec<String> = taxonomy_exporter(&table)
        .map(|line| {
            let line = line.unwrap();
            line.split('\t').next().unwrap().to_string()
        })
        .collect();

    assert_eq!(emitted, table.ids(Axis::Observation));
    assert_eq!(emitted.first().map(String::as_str), Some("otu_024"));
}

#[test]
fn test_rank_join() {
    let table = create_annotated_table(RANKS.len());

    for (i, line) in taxonomy_exporter(&table).enumerate() {
        let line = line.unwrap();
        assert!(line.ends_with('\n'));
        let (id, taxonomy) = line.trim_end_matches('\n').split_once('\t').unwrap();
        assert_eq!(id, table.ids(Axis::Observation)[i]);

        let n_ranks = i % RANKS.len() + 1;
        assert_eq!(taxonomy, RANKS[..n_ranks].join("; "));
        assert!(!taxonomy.ends_with("; "));
        assert_eq!(taxonomy.matches("; ").count(), n_ranks - 1);
    }
}

#[test]
fn test_repeat_export_is_identical() {
    let table = create_annotated_table(12);

    let first: Vec<String> = taxonomy_exporter(&table).map(|l| l.unwrap()).collect();
    let second: Vec<String> = taxonomy_exporter(&table).map(|l| l.unwrap()).collect();

    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
}

#[test]
fn test_partial_taxonomy_policies() {
    init_tracing();
    let table = create_annotated_table(4);
    let mut records: Vec<MetadataRecord> =
        table.axis_metadata(Axis::Observation).unwrap().to_vec();
    records[2].remove("taxonomy");
    let table = table.with_metadata(Axis::Observation, records).unwrap();

    // First-observation probe: two lines, then a typed error for the gap
    let items: Vec<Result<String>> = taxonomy_exporter(&table).collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok() && items[1].is_ok());
    match &items[2] {
        Err(CmirrError::ObservationWithoutTaxonomy(id)) => {
            assert_eq!(id, &table.ids(Axis::Observation)[2]);
        }
        other => panic!("expected gap error, got {:?}", other),
    }

    // Full validation: nothing is produced
    let config = ExportConfig::new().validation(ValidationPolicy::AllObservations);
    let items: Vec<Result<String>> = TaxonomyExporter::with_config(&table, config).collect();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(CmirrError::MissingTaxonomy)));
}

#[test]
fn test_config_from_yaml() {
    let yaml = "field: taxonomy\nseparator: \"|\"\nvalidation: all_observations\n";
    let config = ExportConfig::from_yaml(yaml).unwrap();

    let table = example_table().unwrap();
    let lines: Vec<String> = TaxonomyExporter::with_config(&table, config)
        .map(|l| l.unwrap())
        .collect();
    assert_eq!(lines, vec!["O1\tBacteria|Firmicutes\n", "O2\tBacteria|Bacteroidetes\n"]);
}

#[test]
fn test_write_to_file() {
    init_tracing();
    let table = create_annotated_table(9);

    let temp_file = NamedTempFile::new().unwrap();
    let mut writer = BufWriter::new(temp_file.reopen().unwrap());
    let n_lines = taxonomy_exporter(&table).write_to(&mut writer).unwrap();
    writer.flush().unwrap();
    drop(writer);

    assert_eq!(n_lines, 9);
    let contents = fs::read_to_string(temp_file.path()).unwrap();
    let expected: String = taxonomy_exporter(&table).map(|l| l.unwrap()).collect();
    assert_eq!(contents, expected);
    assert_eq!(contents.lines().count(), 9);
    assert!(!contents.starts_with('#'));
}

#[test]
fn test_write_to_stops_at_missing_taxonomy() {
    let table = example_table()
        .unwrap()
        .without_metadata(Axis::Observation);
    let mut buf = Vec::new();
    let result = taxonomy_exporter(&table).write_to(&mut buf);
    assert!(matches!(result, Err(CmirrError::MissingTaxonomy)));
    assert!(buf.is_empty());
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_rejected_table_is_not_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let table = example_table()
            .unwrap()
            .without_metadata(Axis::Observation);
        let result: Result<Vec<String>> = taxonomy_exporter(&table).collect();
        assert!(matches!(result, Err(CmirrError::MissingTaxonomy)));
        assert_eq!(logs.contents(), "");

        let table = example_table().unwrap();
        let lines: Vec<String> = taxonomy_exporter(&table).map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);
    });

    let output = logs.contents();
    assert!(output.contains("taxonomy validation passed"));
    assert!(output.contains("taxonomy export complete"));
}
