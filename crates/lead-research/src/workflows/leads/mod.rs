//! Lead research: ICP qualification, enrichment planning, and concurrent
//! batch scoring with checkpointed progress.

pub mod batch;
pub mod domain;
pub mod enrichment;
pub mod import;
pub mod qualification;
pub mod report;
pub mod router;

pub use batch::{
    load_checkpoint, run_batch, BatchError, BatchResult, CheckpointError, CheckpointStore,
    JsonFileCheckpoint, LeadBatchProcessor, LeadError, LeadStatus, MemoryCheckpoint,
    PlaceholderSignals, SignalProvider, StaticSignals,
};
pub use domain::{Lead, LeadId, LeadInput, ValidationError};
pub use enrichment::{
    CompanyLookup, ContactLookup, DataSource, EnrichmentPlan, EnrichmentPlanner, LookupTool,
    PeopleSearchParams, PlanPriority,
};
pub use import::{
    accept_records, import_csv, import_csv_path, validate_leads, DataQualityReport, IngestError,
    LeadImport, LeadImporter,
};
pub use qualification::{
    score, CategoryKind, ConfigurationError, CriteriaError, IcpCriteria, QualificationEngine,
    ScoreBreakdown, SignalError, SignalRecord, Tier,
};
pub use report::{summarize, summarize_top, BatchMetadata, BatchReport, Summary, TopLead};
pub use router::{lead_router, LeadWorkflow};
