//! Author resolution pipeline
//!
//! Runs Pass 1 → 6 over a finite batch. Each pass completes for every record
//! before the next starts; the folder cache is warmed single-threaded before
//! Pass 1, and the Pass 6 surname index is built only after Pass 5 has
//! finished for the whole batch.

use crate::abbreviations::{AbbreviationExpander, SurnameIndex};
use crate::config::ResolverConfig;
use crate::consensus::ConsensusResolver;
use crate::conversions::{CanonicalizationMapper, SurnameConversions};
use crate::error::ResolverResult;
use crate::folder_cache::{FolderAttributionCache, FolderNameParser};
use crate::layout::{LayoutKind, LayoutLibrary};
use crate::names::NameDictionary;
use crate::normalizer::FormatNormalizer;
use crate::pattern_extractor::{PatternExtractor, SiblingMetadata};
use crate::source_resolver::{ancestor_dirs, SourceResolver};
use crate::types::{AuthorSource, ItemInput, ItemRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    SourceResolution,
    PatternExtraction,
    FormatNormalization,
    Consensus,
    Canonicalization,
    AbbreviationExpansion,
}

impl Pass {
    pub fn number(&self) -> u8 {
        match self {
            Pass::SourceResolution => 1,
            Pass::PatternExtraction => 2,
            Pass::FormatNormalization => 3,
            Pass::Consensus => 4,
            Pass::Canonicalization => 5,
            Pass::AbbreviationExpansion => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::SourceResolution => "source_resolution",
            Pass::PatternExtraction => "pattern_extraction",
            Pass::FormatNormalization => "format_normalization",
            Pass::Consensus => "consensus",
            Pass::Canonicalization => "canonicalization",
            Pass::AbbreviationExpansion => "abbreviation_expansion",
        }
    }
}

/// Records touched by one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassStatistics {
    pub pass: Pass,
    pub changed: usize,
}

/// Summary of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub items: usize,
    pub folders_examined: usize,
    pub folders_attributed: usize,
    pub passes: Vec<PassStatistics>,
    /// Final record count per author source
    pub sources: BTreeMap<AuthorSource, usize>,
    pub collections: usize,
}

impl RunReport {
    pub fn changed_by(&self, pass: Pass) -> Option<usize> {
        self.passes.iter().find(|s| s.pass == pass).map(|s| s.changed)
    }
}

/// Compiled, reusable pipeline
#[derive(Debug)]
pub struct AuthorPipeline {
    config: ResolverConfig,
    dictionary: NameDictionary,
    folder_layouts: LayoutLibrary,
    file_layouts: LayoutLibrary,
}

impl AuthorPipeline {
    /// Compile dictionaries and layouts; fails only on invalid layout patterns
    pub fn new(config: ResolverConfig) -> ResolverResult<Self> {
        let folder_layouts = LayoutLibrary::compile(LayoutKind::Folder, &config.folder_layouts)?;
        let file_layouts = LayoutLibrary::compile(LayoutKind::File, &config.file_layouts)?;
        Ok(Self {
            dictionary: NameDictionary::from_config(&config),
            config,
            folder_layouts,
            file_layouts,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &NameDictionary {
        &self.dictionary
    }

    /// Resolve a batch; never fails
    pub fn run(&self, items: Vec<ItemInput>) -> Vec<ItemRecord> {
        self.run_with_report(items).0
    }

    pub fn run_with_report(&self, items: Vec<ItemInput>) -> (Vec<ItemRecord>, RunReport) {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut records: Vec<ItemRecord> = items.into_iter().map(ItemRecord::from).collect();
        let mut passes = Vec::with_capacity(6);
        info!(%run_id, items = records.len(), "Author resolution started");

        // Folder cache lives for this run only
        let parser = FolderNameParser::new(&self.folder_layouts, &self.dictionary);
        let mut folders = FolderAttributionCache::new();
        for record in &records {
            folders.warm(ancestor_dirs(record.path(), self.config.depth_limit), &parser);
        }

        // Pass 1 + 2
        let siblings = SiblingMetadata::build(&records);
        let extractor = PatternExtractor::new(&self.file_layouts, &self.dictionary);
        let resolver = SourceResolver::new(
            self.config.depth_limit,
            self.config.max_metadata_authors,
            &self.dictionary,
            &folders,
            &extractor,
            &siblings,
            SurnameConversions::new(&self.config.surname_conversions),
        );
        let attributed = resolver.run(&mut records);
        record_pass(&mut passes, Pass::SourceResolution, attributed);
        let from_file_names = records
            .iter()
            .filter(|r| r.author_source() == Some(AuthorSource::Filename))
            .count();
        record_pass(&mut passes, Pass::PatternExtraction, from_file_names);

        // Pass 3
        let normalizer = FormatNormalizer::new(&self.dictionary);
        let normalized = normalizer.run(&mut records);
        record_pass(&mut passes, Pass::FormatNormalization, normalized);

        // Pass 4: barrier
        let agreed = ConsensusResolver::default().run(&mut records);
        record_pass(&mut passes, Pass::Consensus, agreed);

        // Pass 5
        let mapper = CanonicalizationMapper::new(&self.config.surname_conversions, &normalizer);
        let converted = mapper.run(&mut records);
        record_pass(&mut passes, Pass::Canonicalization, converted);

        // Pass 6: index over the finished batch, then expand
        let index = SurnameIndex::build(&records, &self.dictionary);
        let expanded = match AbbreviationExpander::new(&index, &self.dictionary) {
            Ok(expander) => expander.run(&mut records),
            Err(e) => {
                tracing::warn!(error = %e, "Abbreviation expansion skipped");
                0
            }
        };
        record_pass(&mut passes, Pass::AbbreviationExpansion, expanded);

        let mut sources = BTreeMap::new();
        for record in &records {
            if let Some(source) = record.author_source() {
                *sources.entry(source).or_insert(0) += 1;
            }
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            items: records.len(),
            folders_examined: folders.len(),
            folders_attributed: folders.attributed_count(),
            passes,
            sources,
            collections: records.iter().filter(|r| r.is_collection()).count(),
        };
        info!(
            %run_id,
            items = report.items,
            collections = report.collections,
            "Author resolution finished"
        );
        (records, report)
    }
}

fn record_pass(passes: &mut Vec<PassStatistics>, pass: Pass, changed: usize) {
    info!(pass = pass.number(), name = pass.as_str(), changed, "Pass complete");
    passes.push(PassStatistics { pass, changed });
}
