//! Submit a work-log entry

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use worklog_api::{ApiClient, WorkRecord};

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Date of the entry (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Product work done
    #[arg(long, default_value = "")]
    pub product: String,

    /// Project work done
    #[arg(long)]
    pub project: String,

    /// Anything that fits neither bucket
    #[arg(long, default_value = "")]
    pub others: String,

    /// Risks and blockers
    #[arg(long, default_value = "")]
    pub risks: String,

    /// Plan for tomorrow
    #[arg(long)]
    pub tomorrow: String,
}

pub async fn run(client: &ApiClient, args: RecordArgs) -> Result<()> {
    let record = WorkRecord {
        record_date: args.date,
        product: args.product,
        project: args.project,
        others: args.others,
        risks: args.risks,
        tomorrow: args.tomorrow,
    };

    let receipt = client.create_record(&record).await?;
    println!(
        "saved entry for {} (created {})",
        receipt.record_date, receipt.created_at
    );
    Ok(())
}
