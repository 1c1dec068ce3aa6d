//! Parser dispatch by dataset kind.
//!
//! Each stage kind has one [`DatasetParser`]. The registry maps kinds to
//! parsers so callers (the CLI, tests) never match on the kind themselves.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, bail};

use idwr_model::{DatasetKind, DiseaseNameTracker};

use crate::bullet::parse_bullet;
use crate::confirmed::parse_confirmed;
use crate::options::ParseOptions;
use crate::outcome::ParseOutcome;
use crate::sentinel::parse_sentinel;

/// Turns raw bulletin files of one kind into long records.
pub trait DatasetParser: Send + Sync {
    fn kind(&self) -> DatasetKind;

    fn description(&self) -> &'static str;

    /// Parses a file or a directory of files. Per-file failures are recorded
    /// in the outcome; only an unusable input path is an error.
    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
        tracker: &mut DiseaseNameTracker,
    ) -> Result<ParseOutcome>;
}

struct ConfirmedParser(DatasetKind);

impl DatasetParser for ConfirmedParser {
    fn kind(&self) -> DatasetKind {
        self.0
    }

    fn description(&self) -> &'static str {
        match self.0 {
            DatasetKind::Sex => "historical confirmed cases by sex (Excel)",
            _ => "historical confirmed cases by place of infection (Excel)",
        }
    }

    fn parse(
        &self,
        path: &Path,
        _options: &ParseOptions,
        tracker: &mut DiseaseNameTracker,
    ) -> Result<ParseOutcome> {
        parse_confirmed(path, self.0, tracker)
    }
}

struct BulletParser;

impl DatasetParser for BulletParser {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Bullet
    }

    fn description(&self) -> &'static str {
        "weekly all-case bulletin (CSV)"
    }

    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
        tracker: &mut DiseaseNameTracker,
    ) -> Result<ParseOutcome> {
        parse_bullet(path, options, tracker)
    }
}

struct SentinelParser;

impl DatasetParser for SentinelParser {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Sentinel
    }

    fn description(&self) -> &'static str {
        "weekly sentinel bulletin (CSV)"
    }

    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
        tracker: &mut DiseaseNameTracker,
    ) -> Result<ParseOutcome> {
        parse_sentinel(path, options, tracker)
    }
}

/// Parsers indexed by kind.
pub struct ParserRegistry {
    parsers: HashMap<DatasetKind, Box<dyn DatasetParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ConfirmedParser(DatasetKind::Sex)));
        registry.register(Box::new(ConfirmedParser(DatasetKind::Place)));
        registry.register(Box::new(BulletParser));
        registry.register(Box::new(SentinelParser));
        registry
    }
}

impl ParserRegistry {
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registers a parser, replacing any previous one for its kind.
    pub fn register(&mut self, parser: Box<dyn DatasetParser>) {
        self.parsers.insert(parser.kind(), parser);
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&dyn DatasetParser> {
        self.parsers.get(&kind).map(|parser| parser.as_ref())
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<DatasetKind> {
        DatasetKind::ALL
            .into_iter()
            .filter(|kind| self.parsers.contains_key(kind))
            .collect()
    }

    pub fn parse(
        &self,
        kind: DatasetKind,
        path: &Path,
        options: &ParseOptions,
        tracker: &mut DiseaseNameTracker,
    ) -> Result<ParseOutcome> {
        let Some(parser) = self.get(kind) else {
            bail!("no parser for {kind} tables; the unified table is produced by a build");
        };
        parser.parse(path, options, tracker)
    }
}

/// Parses with the default registry.
pub fn parse_dataset(
    kind: DatasetKind,
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
) -> Result<ParseOutcome> {
    ParserRegistry::default().parse(kind, path, options, tracker)
}
