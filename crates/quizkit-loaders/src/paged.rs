//! Paged on-disk question bank.
//!
//! A bank is a directory with a `manifest.json` naming the page files and
//! the page size. Each page file holds a JSON array of questions. Pages are
//! read lazily with `tokio::fs`, so a large bank never loads whole.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quizkit_core::model::Question;
use quizkit_core::traits::QuestionLoader;

use crate::error::LoaderError;

/// `manifest.json` at the root of a question bank directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankManifest {
    /// Total questions across all pages. May overstate the final page.
    pub total_questions: usize,
    /// Questions per page file (the final page may be short).
    pub page_size: usize,
    /// Page file names relative to the bank directory, in order.
    pub pages: Vec<String>,
}

/// A loader reading question pages from a bank directory on demand.
pub struct PagedFileLoader {
    dir: PathBuf,
    manifest: BankManifest,
}

impl PagedFileLoader {
    /// Open a bank directory by reading its manifest.
    pub fn open(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join("manifest.json");
        if !manifest_path.exists() {
            anyhow::bail!(LoaderError::FileNotFound(manifest_path));
        }
        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: BankManifest = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        if manifest.page_size == 0 {
            anyhow::bail!("manifest page size must be nonzero");
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
        })
    }

    pub fn manifest(&self) -> &BankManifest {
        &self.manifest
    }

    async fn read_page(&self, page: usize) -> Result<Vec<Question>> {
        let name = self.manifest.pages.get(page).ok_or_else(|| {
            anyhow::anyhow!("manifest lists no page {page} of {}", self.manifest.pages.len())
        })?;
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            LoaderError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let questions: Vec<Question> =
            serde_json::from_slice(&bytes).map_err(|source| LoaderError::MalformedPage {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(page, path = %path.display(), count = questions.len(), "page read");
        Ok(questions)
    }
}

#[async_trait]
impl QuestionLoader for PagedFileLoader {
    fn total_questions(&self) -> usize {
        self.manifest.total_questions
    }

    async fn load_questions(&self, start_index: usize, count: usize) -> Result<Vec<Question>> {
        if start_index >= self.manifest.total_questions {
            anyhow::bail!(LoaderError::OutOfRange {
                start: start_index,
                count,
                total: self.manifest.total_questions,
            });
        }

        let end = (start_index + count).min(self.manifest.total_questions);
        let page_size = self.manifest.page_size;
        let first_page = start_index / page_size;
        let last_page = (end - 1) / page_size;

        let mut out = Vec::with_capacity(count);
        for page in first_page..=last_page {
            let questions = self.read_page(page).await?;
            let page_base = page * page_size;
            for (offset, question) in questions.into_iter().enumerate() {
                let global = page_base + offset;
                if global >= start_index && global < end {
                    out.push(question);
                }
            }
        }
        Ok(out)
    }
}

/// Write a question list out as a bank directory. The inverse of
/// [`PagedFileLoader::open`], used by tooling that prepares banks.
pub fn write_bank(dir: &Path, questions: &[Question], page_size: usize) -> Result<()> {
    anyhow::ensure!(page_size > 0, "page size must be nonzero");
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create bank directory {}", dir.display()))?;

    let mut pages = Vec::new();
    for (i, chunk) in questions.chunks(page_size).enumerate() {
        let name = format!("page-{i:04}.json");
        let path = dir.join(&name);
        let json = serde_json::to_string_pretty(chunk)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        pages.push(name);
    }

    let manifest = BankManifest {
        total_questions: questions.len(),
        page_size,
        pages,
    };
    let manifest_path = dir.join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;
    Ok(())
}
