//! In-memory source and mock renderers for testing.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::chart::{ChartImage, ChartSpec};
use crate::document::ReportDocument;
use crate::model::{InsightRecord, QuestionRecord, StudentRecords};
use crate::traits::{ChartRenderer, DocumentRenderer, StudentSource};

/// A [`StudentSource`] backed by maps, for driving the engine without files.
#[derive(Default)]
pub struct InMemorySource {
    records: BTreeMap<String, Vec<QuestionRecord>>,
    insights: BTreeMap<String, Vec<InsightRecord>>,
    /// Students whose record load fails.
    broken: HashSet<String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(mut self, student_id: &str, records: Vec<QuestionRecord>) -> Self {
        self.records.insert(student_id.to_string(), records);
        self
    }

    pub fn with_insights(mut self, student_id: &str, insights: Vec<InsightRecord>) -> Self {
        self.insights.insert(student_id.to_string(), insights);
        self
    }

    /// Register a student whose records exist but cannot be read.
    pub fn with_broken_student(mut self, student_id: &str) -> Self {
        self.records.insert(student_id.to_string(), Vec::new());
        self.broken.insert(student_id.to_string());
        self
    }
}

#[async_trait]
impl StudentSource for InMemorySource {
    async fn student_ids(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }

    async fn load_records(&self, student_id: &str) -> anyhow::Result<Option<StudentRecords>> {
        if self.broken.contains(student_id) {
            anyhow::bail!("corrupt record file for {student_id}");
        }
        Ok(self.records.get(student_id).map(|records| StudentRecords {
            student_id: student_id.to_string(),
            total_records: records.len(),
            records: records.clone(),
        }))
    }

    async fn load_insights(&self) -> anyhow::Result<BTreeMap<String, Vec<InsightRecord>>> {
        Ok(self.insights.clone())
    }
}

/// A chart renderer that records calls and can be told to fail or stall.
#[derive(Default)]
pub struct MockChartRenderer {
    failing_tests: HashSet<String>,
    delay: Option<Duration>,
    call_count: AtomicU32,
    rendered: Mutex<Vec<String>>,
    discarded: Mutex<Vec<PathBuf>>,
}

impl MockChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every chart whose test name is `test_name`.
    pub fn failing_for(mut self, test_name: &str) -> Self {
        self.failing_tests.insert(test_name.to_string());
        self
    }

    /// Sleep before every render.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Artifact stems rendered so far.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    /// Image paths discarded so far.
    pub fn discarded(&self) -> Vec<PathBuf> {
        self.discarded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartRenderer for MockChartRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render_chart(
        &self,
        spec: &ChartSpec,
        artifact_stem: &str,
    ) -> anyhow::Result<ChartImage> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_tests.contains(&spec.test_name) {
            anyhow::bail!("mock chart failure for {}", spec.test_name);
        }
        self.rendered.lock().unwrap().push(artifact_stem.to_string());
        Ok(ChartImage {
            path: PathBuf::from(format!("{artifact_stem}.svg")),
        })
    }

    async fn discard_chart(&self, image: &ChartImage) -> anyhow::Result<()> {
        self.discarded.lock().unwrap().push(image.path.clone());
        Ok(())
    }
}

/// A document renderer that keeps every document it was handed.
#[derive(Default)]
pub struct MockDocumentRenderer {
    failing_students: HashSet<String>,
    delay: Option<Duration>,
    documents: Mutex<Vec<ReportDocument>>,
}

impl MockDocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the document for `student_id`.
    pub fn failing_for(mut self, student_id: &str) -> Self {
        self.failing_students.insert(student_id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Documents rendered so far.
    pub fn documents(&self) -> Vec<ReportDocument> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentRenderer for MockDocumentRenderer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn render_document(
        &self,
        document: &ReportDocument,
        artifact_stem: &str,
    ) -> anyhow::Result<PathBuf> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_students.contains(&document.header.student_id) {
            anyhow::bail!("mock document failure for {}", document.header.student_id);
        }
        self.documents.lock().unwrap().push(document.clone());
        Ok(PathBuf::from(format!("{artifact_stem}.html")))
    }
}
