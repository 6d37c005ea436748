use crate::domain::fields::SENTINEL;
use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::{
    CategoryTable, ClusterReport, MarketValue, OutputTable, RunManifest, StatsReport,
};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const BOM: &str = "\u{feff}";

#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    fn data_path(&self, subdir: Option<&str>, file: &str) -> PathBuf {
        match subdir {
            Some(dir) => self.data_dir.join(dir).join(file),
            None => self.data_dir.join(file),
        }
    }

    fn category_path(&self, category: &str) -> PathBuf {
        self.cache_dir
            .join(StorageKeys::SOURCES_DIR)
            .join(format!("{}.json", category.replace('/', "_")))
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Writes to a sibling temp file first so readers never see a partial
    /// file.
    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.ensure_parent(path)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, content.as_bytes())
    }

    fn read_json_file<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&content)?))
        } else {
            Ok(None)
        }
    }

    /// UTF-8 CSV with a byte-order mark, as spreadsheet tools expect.
    fn write_csv_file<I, R>(&self, path: &Path, header: &[String], rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<[u8]>,
    {
        let mut buffer = BOM.as_bytes().to_vec();
        {
            let mut writer = csv::Writer::from_writer(&mut buffer);
            writer.write_record(header)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        self.write_atomic(path, &buffer)
    }

    fn read_csv_file(&self, path: &Path) -> Result<Option<OutputTable>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let content = content.strip_prefix(BOM).unwrap_or(&content);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = OutputTable::new(columns);
        for record in reader.records() {
            let record = record?;
            table.push_row(
                record
                    .iter()
                    .map(|cell| {
                        if cell.trim().is_empty() {
                            SENTINEL.to_string()
                        } else {
                            cell.to_string()
                        }
                    })
                    .collect(),
            );
        }

        Ok(Some(table))
    }
}

impl Storage for FileSystemStore {
    fn load_category(&self, category: &str) -> Result<Option<CategoryTable>> {
        self.read_json_file(&self.category_path(category))
    }

    fn save_category(&self, table: &CategoryTable) -> Result<()> {
        self.write_json_file(&self.category_path(&table.category), table)
    }

    fn load_results(&self) -> Result<Option<OutputTable>> {
        self.read_csv_file(&self.data_path(None, StorageKeys::RESULTS))
    }

    fn save_results(&self, table: &OutputTable) -> Result<()> {
        self.write_csv_file(
            &self.data_path(None, StorageKeys::RESULTS),
            &table.columns,
            &table.rows,
        )
    }

    fn save_market_values(&self, values: &[MarketValue]) -> Result<()> {
        let header: Vec<String> = MarketValue::COLUMNS.iter().map(|c| c.to_string()).collect();
        self.write_csv_file(
            &self.data_path(None, StorageKeys::MARKET_VALUES),
            &header,
            values.iter().map(MarketValue::to_row),
        )
    }

    fn save_report(&self, report: &StatsReport) -> Result<()> {
        self.write_atomic(
            &self.data_path(Some(StorageKeys::REPORT_DIR), StorageKeys::TOP_THREE),
            report.render_rankings().as_bytes(),
        )?;
        self.write_csv_file(
            &self.data_path(Some(StorageKeys::REPORT_DIR), StorageKeys::GROUP_STATS),
            &report.group_columns(),
            report.group_rows(),
        )
    }

    fn save_clusters(&self, labelled: &OutputTable, report: &ClusterReport) -> Result<()> {
        let dir = Some(StorageKeys::CLUSTER_DIR);
        self.write_csv_file(
            &self.data_path(dir, StorageKeys::CLUSTERED_RESULTS),
            &labelled.columns,
            &labelled.rows,
        )?;
        self.write_csv_file(
            &self.data_path(dir, StorageKeys::K_SELECTION),
            &report.score_columns(),
            report.score_rows(),
        )?;
        self.write_csv_file(
            &self.data_path(dir, StorageKeys::CLUSTER_SUMMARY),
            &report.summary_columns(),
            report.summary_rows(),
        )?;
        self.write_csv_file(
            &self.data_path(dir, StorageKeys::PROJECTION),
            &report.projection_columns(),
            report.projection_rows(),
        )
    }

    fn save_manifest(&self, manifest: &RunManifest) -> Result<()> {
        self.write_json_file(&self.data_path(None, StorageKeys::MANIFEST), manifest)
    }

    fn results_location(&self) -> String {
        self.data_path(None, StorageKeys::RESULTS)
            .display()
            .to_string()
    }
}
