use crate::infra::{parse_worker_count, truncate, write_json, OutputFormat};
use chrono::{DateTime, Utc};
use clap::Args;
use lead_research::config::AppConfig;
use lead_research::error::AppError;
use lead_research::telemetry;
use lead_research::workflows::leads::{
    enrichment, import_csv_path, load_checkpoint, BatchReport, CategoryKind, DataQualityReport,
    EnrichmentPlan, IcpCriteria, JsonFileCheckpoint, Lead, LeadBatchProcessor, LeadId,
    QualificationEngine, ScoreBreakdown, SignalRecord, Summary, Tier,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const RULE: &str = "======================================================================";

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with one lead per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the JSON batch report
    #[arg(long, required_unless_present = "validate_only")]
    pub(crate) output: Option<PathBuf>,
    /// JSON document with custom ICP criteria
    #[arg(long)]
    pub(crate) icp_config: Option<PathBuf>,
    /// Concurrent workers (1-10). Defaults to LEADS_PARALLEL or 3.
    #[arg(long, value_parser = parse_worker_count)]
    pub(crate) parallel: Option<usize>,
    /// Only report data quality; do not score anything
    #[arg(long)]
    pub(crate) validate_only: bool,
    /// Checkpoint file rewritten as the batch progresses
    #[arg(long)]
    pub(crate) progress_file: Option<PathBuf>,
    /// Skip leads that already succeeded in the progress file
    #[arg(long, requires = "progress_file")]
    pub(crate) resume: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// CSV file with one lead per row
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct QualifyArgs {
    /// JSON signal record describing the company
    #[arg(long)]
    pub(crate) company_data: PathBuf,
    /// JSON document with custom ICP criteria
    #[arg(long)]
    pub(crate) icp_criteria: Option<PathBuf>,
    /// Write the qualification as JSON to this file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct EnrichArgs {
    #[arg(long)]
    pub(crate) company_name: String,
    #[arg(long)]
    pub(crate) website: Option<String>,
    #[arg(long)]
    pub(crate) linkedin_url: Option<String>,
    #[arg(long)]
    pub(crate) industry: Option<String>,
    #[arg(long)]
    pub(crate) contact_name: Option<String>,
    #[arg(long)]
    pub(crate) contact_title: Option<String>,
    #[arg(long)]
    pub(crate) contact_linkedin: Option<String>,
    /// Write the plan as JSON to this file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub(crate) struct QualificationReport {
    pub(crate) company_name: Option<String>,
    pub(crate) qualification_date: DateTime<Utc>,
    pub(crate) scores: ScoreBreakdown,
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    println!("Loading leads from {}...", args.input.display());
    let import = import_csv_path(&args.input)?;
    println!("Loaded {} leads", import.leads.len());
    render_quality(&import.quality);

    if args.validate_only {
        println!("\nValidation complete (no processing performed)");
        return Ok(());
    }
    let Some(output) = args.output else {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "--output is required unless --validate-only is set",
        )));
    };

    let criteria = load_criteria(args.icp_config.as_deref())?;
    let workers = args.parallel.unwrap_or(config.batch.workers);
    let mut processor = LeadBatchProcessor::new(criteria)
        .with_workers(workers)
        .with_checkpoint_every(config.batch.checkpoint_every);

    if let Some(progress_file) = &args.progress_file {
        if args.resume && progress_file.exists() {
            let prior = load_checkpoint(progress_file)?;
            info!(
                path = %progress_file.display(),
                prior = prior.len(),
                "resuming from checkpoint"
            );
            processor = processor.resume_from(prior);
        }
        processor = processor.with_checkpoint(Arc::new(JsonFileCheckpoint::new(progress_file)));
    }

    println!(
        "\nProcessing {} leads with {} parallel workers...",
        import.leads.len(),
        workers
    );
    let results = processor.run(import.leads).await?;

    let report = BatchReport::new(results, Some(args.input.display().to_string()), workers);
    write_json(&output, &report)?;

    render_batch_summary(&report.summary);
    println!("\nResults saved to {}", output.display());
    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let import = import_csv_path(&args.input)?;
    render_quality(&import.quality);
    Ok(())
}

pub(crate) fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.company_data)?;
    let signals: SignalRecord = serde_json::from_str(&raw)?;
    signals.validate()?;

    let criteria = load_criteria(args.icp_criteria.as_deref())?;
    let scores = QualificationEngine::new(criteria).score(&signals)?;
    let report = QualificationReport {
        company_name: signals.company_name.clone(),
        qualification_date: Utc::now(),
        scores,
    };

    if let Some(path) = &args.output {
        write_json(path, &report)?;
        println!("Qualification scores saved to {}", path.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Summary => render_qualification(&report),
    }
    Ok(())
}

pub(crate) fn run_enrich(args: EnrichArgs) -> Result<(), AppError> {
    let lead = lead_from_args(&args)?;
    let plan = enrichment::plan(&lead);

    if let Some(path) = &args.output {
        write_json(path, &plan)?;
        println!("Enrichment plan saved to {}", path.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Summary => render_plan(lead.company_name(), &plan),
    }
    Ok(())
}

fn load_criteria(path: Option<&Path>) -> Result<IcpCriteria, AppError> {
    match path {
        Some(path) => {
            let criteria = IcpCriteria::from_path(path)?;
            info!(path = %path.display(), "loaded custom ICP criteria");
            Ok(criteria)
        }
        None => Ok(IcpCriteria::standard()),
    }
}

fn lead_from_args(args: &EnrichArgs) -> Result<Lead, AppError> {
    let mut lead = Lead::new(LeadId::positional(0), args.company_name.as_str())?;
    if let Some(website) = &args.website {
        lead = lead.with_website(website.as_str());
    }
    if let Some(linkedin_url) = &args.linkedin_url {
        lead = lead.with_linkedin_url(linkedin_url.as_str());
    }
    if let Some(industry) = &args.industry {
        lead = lead.with_industry(industry.as_str());
    }
    if let Some(contact_name) = &args.contact_name {
        lead = lead.with_contact_name(contact_name.as_str());
    }
    if let Some(contact_title) = &args.contact_title {
        lead = lead.with_contact_title(contact_title.as_str());
    }
    if let Some(contact_linkedin) = &args.contact_linkedin {
        lead = lead.with_contact_linkedin(contact_linkedin.as_str());
    }
    Ok(lead)
}

fn render_quality(report: &DataQualityReport) {
    println!("\nData Quality Report:");
    println!("   Total leads: {}", report.total_leads);
    println!("   Valid leads: {}", report.valid_leads);
    println!("   Has website: {}", report.data_quality.has_website);
    println!("   Has LinkedIn: {}", report.data_quality.has_linkedin);
    println!("   Has industry: {}", report.data_quality.has_industry);
    println!("   Has contact info: {}", report.data_quality.has_contact_info);

    if !report.issues.is_empty() {
        println!("\nFound {} validation issues:", report.issues.len());
        for issue in report.issues.iter().take(5) {
            println!("   - {issue}");
        }
        if report.issues.len() > 5 {
            println!("   ... and {} more", report.issues.len() - 5);
        }
    }
}

fn render_batch_summary(summary: &Summary) {
    println!("\nProcessing Summary:");
    println!(
        "   Successful: {}/{}",
        summary.successful, summary.total_processed
    );
    println!("   Errors: {}", summary.errors);
    println!("   Average score: {:.1}", summary.avg_score);
    println!("\n   Tier Distribution:");
    for tier in Tier::ordered() {
        println!("      {tier}-tier: {} leads", summary.tier_count(tier));
    }

    if !summary.top_leads.is_empty() {
        println!("\n   Top {} Leads:", summary.top_leads.len());
        for (rank, lead) in summary.top_leads.iter().enumerate() {
            println!(
                "      {}. {} - Tier {} ({:.1})",
                rank + 1,
                truncate(&lead.company_name, 40),
                lead.tier,
                lead.score
            );
        }
    }
}

fn render_qualification(report: &QualificationReport) {
    let scores = &report.scores;
    println!("\n{RULE}");
    println!("LEAD QUALIFICATION REPORT");
    println!("{RULE}");
    println!(
        "\nCompany: {}",
        report.company_name.as_deref().unwrap_or("Unknown")
    );
    println!("Overall Score: {}/100", scores.weighted_total);
    println!("Tier: {}", scores.tier);
    println!("\nRecommendation: {}", scores.recommendation);
    println!("\n--- Score Breakdown ---");
    for kind in CategoryKind::ordered() {
        let category = scores.category(kind);
        println!(
            "{:<15} {:.1} (weighted: {:.1})",
            format!("{}:", kind.label()),
            category.total,
            category.weighted
        );
    }
    println!("\n{RULE}\n");
}

fn render_plan(company_name: &str, plan: &EnrichmentPlan) {
    println!("\n{RULE}");
    println!("LEAD ENRICHMENT PLAN");
    println!("{RULE}");
    println!("\nLead: {company_name}");
    println!("Priority: {}", plan.priority.label().to_uppercase());
    println!("Estimated lookups: {}", plan.estimated_lookups);

    let company = &plan.company;
    println!("\n--- Company Enrichment ---");
    println!("Confidence: {}%", company.confidence);
    println!("Primary tool: {}", company.primary_tool.name());
    if let Some(query) = &company.search_query {
        println!("Search query: {query}");
    }
    if !company.secondary_tools.is_empty() {
        let tools: Vec<&str> = company.secondary_tools.iter().map(|t| t.name()).collect();
        println!("Secondary tools: {}", tools.join(", "));
    }

    if let Some(contact) = &plan.contact {
        println!("\n--- Contact Enrichment ---");
        println!("Confidence: {}%", contact.confidence);
        println!("Primary tool: {}", contact.primary_tool.name());
        if let Some(query) = &contact.search_query {
            println!("Search query: {query}");
        }
        if let Some(params) = &contact.search_params {
            println!(
                "Search params: first_name={} last_name={} company={}",
                params.first_name, params.last_name, params.company
            );
        }
    }
    println!("\n{RULE}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrich_args(company: &str) -> EnrichArgs {
        EnrichArgs {
            company_name: company.to_string(),
            website: None,
            linkedin_url: None,
            industry: Some("SaaS".to_string()),
            contact_name: Some("Jo Doe".to_string()),
            contact_title: None,
            contact_linkedin: None,
            output: None,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn lead_from_args_applies_optional_fields() {
        let lead = lead_from_args(&enrich_args("Acme")).expect("lead builds");
        assert_eq!(lead.id().0, "lead_1");
        assert_eq!(lead.industry(), Some("SaaS"));
        assert_eq!(lead.contact_name(), Some("Jo Doe"));
        assert!(lead.website().is_none());
    }

    #[test]
    fn lead_from_args_rejects_blank_company_names() {
        let error = lead_from_args(&enrich_args("  ")).expect_err("blank company");
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[test]
    fn enrich_writes_the_plan_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plan.json");
        let mut args = enrich_args("Acme");
        args.output = Some(path.clone());

        run_enrich(args).expect("plan written");
        let plan: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(plan["contact"]["confidence"], 70);
        assert_eq!(plan["priority"], "standard");
    }

    #[test]
    fn qualify_writes_scores_for_a_signal_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let company_data = dir.path().join("company.json");
        let output = dir.path().join("scores.json");
        std::fs::write(
            &company_data,
            r#"{"company_name": "Acme", "employee_count": 1000, "industry": "Technology"}"#,
        )
        .expect("write company data");

        run_qualify(QualifyArgs {
            company_data,
            icp_criteria: None,
            output: Some(output.clone()),
            format: OutputFormat::Summary,
        })
        .expect("qualification written");

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).expect("read")).expect("json");
        assert_eq!(report["company_name"], "Acme");
        assert_eq!(report["scores"]["tier"], "D");
        assert_eq!(
            report["scores"]["firmographic"]["scores"]["company_size"],
            100.0
        );
    }

    #[test]
    fn qualify_rejects_malformed_signal_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let company_data = dir.path().join("company.json");
        std::fs::write(&company_data, "{not json").expect("write company data");

        let error = run_qualify(QualifyArgs {
            company_data,
            icp_criteria: None,
            output: None,
            format: OutputFormat::Json,
        })
        .expect_err("invalid json");
        assert!(matches!(error, AppError::Json(_)));
    }
}
