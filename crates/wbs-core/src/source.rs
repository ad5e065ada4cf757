//! Source loading
//!
//! Reads delimited rows `depth, id, description, start, end, owner, status`
//! into a [`Tree`]. Rows whose id starts with the inclusion marker name
//! another source, which is loaded recursively and spliced in at that row's
//! depth.
//!
//! Inclusion paths are resolved against the including file's directory.
//! The loader keeps the chain of sources being read and refuses to enter a
//! source already on it.

use crate::builder::{HierarchyError, TreeBuilder};
use crate::config::WbsConfig;
use crate::error::{InclusionError, Result, RowLocation, WbsError};
use crate::record::{DepthCode, DepthCodeError, Schedule, Status, TaskRecord};
use crate::tree::Tree;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Number of fields in a row
pub const FIELD_COUNT: usize = 7;

/// Label used for sources that are not files
pub const MEMORY_SOURCE: &str = "<memory>";

/// Load a source file and everything it includes
pub fn load_tree(path: impl AsRef<Path>, config: &WbsConfig) -> Result<Tree> {
    SourceLoader::new(config).load(path.as_ref())
}

/// Build a tree from in-memory text
///
/// Relative inclusion paths resolve against the working directory.
pub fn parse_str(text: &str, config: &WbsConfig) -> Result<Tree> {
    SourceLoader::new(config).build_from_reader(text.as_bytes(), MEMORY_SOURCE, None)
}

/// Recursive source reader
#[derive(Debug)]
pub struct SourceLoader<'a> {
    config: &'a WbsConfig,
    chain: Vec<PathBuf>,
}

impl<'a> SourceLoader<'a> {
    /// Create loader
    #[inline]
    #[must_use]
    pub fn new(config: &'a WbsConfig) -> Self {
        Self {
            config,
            chain: Vec::new(),
        }
    }

    /// Sources currently being read, outermost first
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &[PathBuf] {
        &self.chain
    }

    /// Load a source file into a tree rooted at the configured root level
    pub fn load(&mut self, path: &Path) -> Result<Tree> {
        self.load_at(path, self.config.root_level)
    }

    /// Build a tree from any reader, rooted at the configured root level
    ///
    /// `source_name` labels row errors; `base_dir` anchors relative
    /// inclusion paths.
    pub fn build_from_reader<R: Read>(
        &mut self,
        reader: R,
        source_name: &str,
        base_dir: Option<&Path>,
    ) -> Result<Tree> {
        self.build(reader, source_name, base_dir, self.config.root_level)
    }

    fn load_at(&mut self, path: &Path, root_level: usize) -> Result<Tree> {
        let canonical = std::fs::canonicalize(path).map_err(|source| self.open_error(path, source))?;

        if self.chain.contains(&canonical) {
            let mut chain = self.chain.clone();
            chain.push(canonical);
            return Err(InclusionError::Cycle { chain }.into());
        }

        let file = File::open(&canonical).map_err(|source| self.open_error(path, source))?;
        let base_dir = canonical.parent().map(Path::to_path_buf);
        let name = path.display().to_string();

        self.chain.push(canonical);
        let result = self.build(file, &name, base_dir.as_deref(), root_level);
        self.chain.pop();
        result
    }

    fn build<R: Read>(
        &mut self,
        reader: R,
        source_name: &str,
        base_dir: Option<&Path>,
        root_level: usize,
    ) -> Result<Tree> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.config.delimiter_byte())
            .quote(self.config.quote_byte())
            .from_reader(reader);

        let mut builder = TreeBuilder::with_root_level(root_level);

        for (index, row) in csv_reader.records().enumerate() {
            let row = row.map_err(|source| WbsError::Csv {
                path: PathBuf::from(source_name),
                source,
            })?;
            let line = row
                .position()
                .map_or(index as u64 + 1, csv::Position::line);
            let location = RowLocation::new(source_name, line);

            let Some(record) = self.parse_row(&row, &location)? else {
                tracing::debug!(%location, "skipping non-structural row");
                continue;
            };

            match inclusion_target(&record.id, self.config.inclusion_marker) {
                Some(target) => {
                    if target.is_empty() {
                        return Err(WbsError::malformed_row(
                            location,
                            "inclusion row names no source",
                        ));
                    }
                    let path = resolve(base_dir, target);
                    // included sources are independent trees at level 0
                    let subtree = self.load_at(&path, 0)?;
                    let nodes = subtree.len();
                    builder
                        .add_subtree(&record, subtree)
                        .map_err(|e| hierarchy_error(location.clone(), &e))?;
                    tracing::info!(
                        %location,
                        source = %path.display(),
                        nodes,
                        "resolved inclusion"
                    );
                }
                None => {
                    builder
                        .add_node(record)
                        .map_err(|e| hierarchy_error(location, &e))?;
                }
            }
        }

        Ok(builder.finish())
    }

    /// Decode one row; `None` for non-structural rows
    fn parse_row(
        &self,
        row: &csv::StringRecord,
        location: &RowLocation,
    ) -> Result<Option<TaskRecord>> {
        let field = |i: usize| row.get(i).map_or("", str::trim);

        let depth = match DepthCode::parse(field(0), self.config.nesting_marker) {
            Ok(depth) => depth,
            Err(DepthCodeError::NotStructural(_)) => return Ok(None),
            Err(e @ DepthCodeError::TrailingText(_)) => {
                return Err(WbsError::malformed_row(location.clone(), e.to_string()))
            }
        };

        if row.len() > FIELD_COUNT {
            return Err(WbsError::malformed_row(
                location.clone(),
                format!("expected at most {FIELD_COUNT} fields, found {}", row.len()),
            ));
        }

        let status = match field(6) {
            "" => Status::BACKLOG,
            raw => raw.parse::<i32>().map(Status).map_err(|_| {
                WbsError::malformed_row(
                    location.clone(),
                    format!("status '{raw}' is not an integer"),
                )
            })?,
        };

        for (name, value) in [("start", field(3)), ("end", field(4))] {
            if !value.is_empty() && !is_iso_date(value) {
                tracing::warn!(
                    %location,
                    field = name,
                    value,
                    "date is not YYYY-MM-DD, comparisons may be wrong"
                );
            }
        }

        let record = TaskRecord {
            id: field(1).to_string(),
            depth,
            description: field(2).to_string(),
            owner: field(5).to_string(),
            schedule: Schedule::new(field(3), field(4), status),
        };
        tracing::trace!(%location, %record, "decoded row");
        Ok(Some(record))
    }

    fn open_error(&self, path: &Path, source: std::io::Error) -> WbsError {
        if self.chain.is_empty() {
            WbsError::io_error(path, source)
        } else {
            InclusionError::Missing {
                path: path.to_path_buf(),
                chain: self.chain.clone(),
                source,
            }
            .into()
        }
    }
}

/// Path named by an inclusion id, if `id` is one
fn inclusion_target(id: &str, marker: char) -> Option<&str> {
    id.strip_prefix(marker).map(str::trim)
}

fn resolve(base_dir: Option<&Path>, target: &str) -> PathBuf {
    let target = Path::new(target);
    match base_dir {
        Some(dir) if target.is_relative() => dir.join(target),
        _ => target.to_path_buf(),
    }
}

fn hierarchy_error(location: RowLocation, error: &HierarchyError) -> WbsError {
    WbsError::malformed_hierarchy(location, error.to_string())
}

/// `YYYY-MM-DD` shape check; lexical ordering is only meaningful for it
#[must_use]
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
